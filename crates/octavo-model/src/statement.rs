//! Statements: (subject, predicate, object) triples with tagged values
//!
//! The object side of a statement is exactly one of: a literal string, a
//! controlled-vocabulary entity (id plus optional label), or a nested
//! blank-node group of statements. Raw store rows are duck-typed
//! (`object_id` / `object_literal` columns); [`StatementRow`] converts
//! them into the tagged form.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::record::Record;

/// The object of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementValue {
    /// Plain literal ("Some title", "true", "1992")
    Literal(String),
    /// Entity reference, optionally labeled ("mediatypes:n" / "unmediated")
    Entity {
        id: String,
        label: Option<String>,
        /// Identifier statements sometimes carry the identifier type here
        /// instead of packing it into the id as a urn prefix.
        value_type: Option<String>,
    },
    /// Nested statement group (structured notes, check-in boxes,
    /// entity-encoded identifiers)
    BlankNode(Record),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub subject_id: String,
    pub predicate: String,
    /// Explicit statement index, preserved for positional reconstruction
    /// of parallel fields.
    pub position: Option<i64>,
    pub value: StatementValue,
}

impl Statement {
    pub fn literal(
        subject_id: impl Into<String>,
        predicate: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            predicate: predicate.into(),
            position: None,
            value: StatementValue::Literal(value.into()),
        }
    }

    pub fn entity(
        subject_id: impl Into<String>,
        predicate: impl Into<String>,
        id: impl Into<String>,
        label: Option<&str>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            predicate: predicate.into(),
            position: None,
            value: StatementValue::Entity {
                id: id.into(),
                label: label.map(str::to_string),
                value_type: None,
            },
        }
    }

    pub fn blank_node(
        subject_id: impl Into<String>,
        predicate: impl Into<String>,
        statements: Vec<Statement>,
    ) -> Self {
        let subject_id = subject_id.into();
        let node_uri = statements
            .first()
            .map(|s| s.subject_id.clone())
            .unwrap_or_default();
        Self {
            subject_id,
            predicate: predicate.into(),
            position: None,
            value: StatementValue::BlankNode(Record::new(node_uri, statements)),
        }
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        if let StatementValue::Entity {
            value_type: ref mut vt,
            ..
        } = self.value
        {
            *vt = Some(value_type.into());
        }
        self
    }

    pub fn literal_value(&self) -> Option<&str> {
        match &self.value {
            StatementValue::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match &self.value {
            StatementValue::Entity { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn entity_label(&self) -> Option<&str> {
        match &self.value {
            StatementValue::Entity { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    pub fn value_type(&self) -> Option<&str> {
        match &self.value {
            StatementValue::Entity { value_type, .. } => value_type.as_deref(),
            _ => None,
        }
    }

    pub fn as_blank_node(&self) -> Option<&Record> {
        match &self.value {
            StatementValue::BlankNode(rec) => Some(rec),
            _ => None,
        }
    }
}

/// Canonical statement order: entity statements by id, literal statements
/// by literal. Mixed pairs keep their relative order (stable sort).
pub fn canonical_cmp(a: &Statement, b: &Statement) -> Ordering {
    match (&a.value, &b.value) {
        (StatementValue::Entity { id: a_id, .. }, StatementValue::Entity { id: b_id, .. }) => {
            a_id.cmp(b_id)
        }
        (StatementValue::Literal(a_lit), StatementValue::Literal(b_lit)) => a_lit.cmp(b_lit),
        _ => Ordering::Equal,
    }
}

/// Raw statement row as stored in the triple store (and in ndjson
/// fixtures): one column populated for the entity id, one for the
/// literal, plus label/type companions.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementRow {
    pub subject_id: String,
    pub predicate: String,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub object_literal: Option<String>,
    #[serde(default)]
    pub object_label: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub blank_nodes: Option<Vec<StatementRow>>,
}

impl StatementRow {
    /// Convert the duck-typed row into the tagged form. Rows with neither
    /// an object id, a literal, nor blank nodes are dropped.
    pub fn into_statement(self) -> Option<Statement> {
        let value = if let Some(rows) = self.blank_nodes {
            let statements: Vec<Statement> =
                rows.into_iter().filter_map(StatementRow::into_statement).collect();
            let node_uri = statements
                .first()
                .map(|s| s.subject_id.clone())
                .or(self.object_id)
                .unwrap_or_default();
            StatementValue::BlankNode(Record::new(node_uri, statements))
        } else if let Some(id) = self.object_id {
            StatementValue::Entity {
                id,
                label: self.object_label,
                value_type: self.object_type,
            }
        } else if let Some(lit) = self.object_literal {
            StatementValue::Literal(lit)
        } else {
            return None;
        };

        Some(Statement {
            subject_id: self.subject_id,
            predicate: self.predicate,
            position: self.index,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_accessors() {
        let s = Statement::literal("b1", "dcterms:title", "A title");
        assert_eq!(s.literal_value(), Some("A title"));
        assert_eq!(s.entity_id(), None);
        assert!(s.as_blank_node().is_none());
    }

    #[test]
    fn entity_accessors() {
        let s = Statement::entity("b1", "bf:media", "mediatypes:n", Some("unmediated"));
        assert_eq!(s.entity_id(), Some("mediatypes:n"));
        assert_eq!(s.entity_label(), Some("unmediated"));
        assert_eq!(s.literal_value(), None);
    }

    #[test]
    fn canonical_cmp_orders_entities_by_id() {
        let a = Statement::entity("b1", "p", "a:1", None);
        let b = Statement::entity("b1", "p", "a:2", None);
        assert_eq!(canonical_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn canonical_cmp_mixed_is_equal() {
        let a = Statement::entity("b1", "p", "a:1", None);
        let b = Statement::literal("b1", "p", "zzz");
        assert_eq!(canonical_cmp(&a, &b), Ordering::Equal);
    }

    #[test]
    fn row_with_literal() {
        let row: StatementRow = serde_json::from_str(
            r#"{"subject_id":"b1","predicate":"dcterms:title","object_literal":"T"}"#,
        )
        .unwrap();
        let s = row.into_statement().unwrap();
        assert_eq!(s.literal_value(), Some("T"));
    }

    #[test]
    fn row_with_entity_prefers_id() {
        let row: StatementRow = serde_json::from_str(
            r#"{"subject_id":"b1","predicate":"bf:media","object_id":"mediatypes:n","object_label":"unmediated"}"#,
        )
        .unwrap();
        let s = row.into_statement().unwrap();
        assert_eq!(s.entity_id(), Some("mediatypes:n"));
        assert_eq!(s.entity_label(), Some("unmediated"));
    }

    #[test]
    fn row_with_blank_nodes() {
        let row: StatementRow = serde_json::from_str(
            r#"{"subject_id":"b1","predicate":"dcterms:identifier","blank_nodes":[
                {"subject_id":"b1#1.0001","predicate":"rdf:type","object_id":"bf:Isbn"},
                {"subject_id":"b1#1.0001","predicate":"rdf:value","object_literal":"12345"}
            ]}"#,
        )
        .unwrap();
        let s = row.into_statement().unwrap();
        let node = s.as_blank_node().unwrap();
        assert_eq!(node.uri, "b1#1.0001");
        assert_eq!(node.statements.len(), 2);
    }

    #[test]
    fn empty_row_is_dropped() {
        let row: StatementRow =
            serde_json::from_str(r#"{"subject_id":"b1","predicate":"dcterms:title"}"#).unwrap();
        assert!(row.into_statement().is_none());
    }
}
