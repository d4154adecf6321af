//! Records: a subject's statements plus its identifying uri
//!
//! A bib owns its item and holding children; children are built alongside
//! the bib from grouped query rows and discarded with it. Everything is
//! immutable after construction; the accessors are pure reads.

use rustc_hash::FxHashMap;

use crate::statement::{canonical_cmp, Statement, StatementRow};

/// Read access over a group of statements. Blank nodes return sub-records
/// supporting the same contract recursively.
pub trait StatementAccess {
    fn all_statements(&self) -> &[Statement];

    /// All statements for a predicate, in stored order.
    fn statements(&self, predicate: &str) -> Vec<&Statement> {
        self.all_statements()
            .iter()
            .filter(|s| s.predicate == predicate)
            .collect()
    }

    /// First statement for a predicate.
    fn statement(&self, predicate: &str) -> Option<&Statement> {
        self.all_statements()
            .iter()
            .find(|s| s.predicate == predicate)
    }

    fn has(&self, predicate: &str) -> bool {
        self.statement(predicate).is_some()
    }

    /// All literal values for a predicate, in stored order.
    fn literals(&self, predicate: &str) -> Vec<&str> {
        self.all_statements()
            .iter()
            .filter(|s| s.predicate == predicate)
            .filter_map(Statement::literal_value)
            .collect()
    }

    fn literal(&self, predicate: &str) -> Option<&str> {
        self.literals(predicate).first().copied()
    }

    /// True when the first literal is the string "true".
    fn boolean_literal(&self, predicate: &str) -> bool {
        self.literal(predicate) == Some("true")
    }

    fn entity_ids(&self, predicate: &str) -> Vec<&str> {
        self.all_statements()
            .iter()
            .filter(|s| s.predicate == predicate)
            .filter_map(Statement::entity_id)
            .collect()
    }

    fn entity_id(&self, predicate: &str) -> Option<&str> {
        self.entity_ids(predicate).first().copied()
    }

    fn label(&self) -> Option<&str> {
        self.literal(crate::predicates::PREF_LABEL)
    }

    /// Map `f` over the predicate's statements in canonical order
    /// (entities by id, literals by value; see `canonical_cmp`).
    fn each<T>(&self, predicate: &str, mut f: impl FnMut(&Statement) -> T) -> Vec<T> {
        let mut stmts = self.statements(predicate);
        stmts.sort_by(|a, b| canonical_cmp(a, b));
        stmts.into_iter().map(|s| f(s)).collect()
    }

    /// Nested statement groups for a predicate.
    fn blank_nodes(&self, predicate: &str) -> Vec<&Record> {
        self.all_statements()
            .iter()
            .filter(|s| s.predicate == predicate)
            .filter_map(Statement::as_blank_node)
            .collect()
    }
}

/// A subject's statements plus its identifying uri.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub uri: String,
    pub statements: Vec<Statement>,
}

impl Record {
    pub fn new(uri: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            uri: uri.into(),
            statements,
        }
    }

    /// Build from raw store rows; the uri comes from the first row's
    /// subject. Returns `None` for an empty row set.
    pub fn from_rows(rows: Vec<StatementRow>) -> Option<Self> {
        let uri = rows.first()?.subject_id.clone();
        let statements = rows
            .into_iter()
            .filter_map(StatementRow::into_statement)
            .collect();
        Some(Self { uri, statements })
    }
}

impl StatementAccess for Record {
    fn all_statements(&self) -> &[Statement] {
        &self.statements
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub record: Record,
}

impl Item {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn from_rows(rows: Vec<StatementRow>) -> Option<Self> {
        Record::from_rows(rows).map(Self::new)
    }

    pub fn uri(&self) -> &str {
        &self.record.uri
    }
}

impl StatementAccess for Item {
    fn all_statements(&self) -> &[Statement] {
        &self.record.statements
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub record: Record,
}

impl Holding {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn from_rows(rows: Vec<StatementRow>) -> Option<Self> {
        Record::from_rows(rows).map(Self::new)
    }

    pub fn uri(&self) -> &str {
        &self.record.uri
    }
}

impl StatementAccess for Holding {
    fn all_statements(&self) -> &[Statement] {
        &self.record.statements
    }
}

/// A bib and the item/holding children it exclusively owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Bib {
    pub record: Record,
    pub items: Vec<Item>,
    pub holdings: Vec<Holding>,
}

impl Bib {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            items: Vec::new(),
            holdings: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn with_holdings(mut self, holdings: Vec<Holding>) -> Self {
        self.holdings = holdings;
        self
    }

    /// Build a bib and its children from grouped query rows. Item and
    /// holding rows are grouped by subject in first-seen order, mirroring
    /// the store's join result.
    pub fn from_rows(
        bib_rows: Vec<StatementRow>,
        item_rows: Vec<StatementRow>,
        holding_rows: Vec<StatementRow>,
    ) -> Option<Self> {
        let record = Record::from_rows(bib_rows)?;
        let items = group_by_subject(item_rows)
            .into_iter()
            .filter_map(Item::from_rows)
            .collect();
        let holdings = group_by_subject(holding_rows)
            .into_iter()
            .filter_map(Holding::from_rows)
            .collect();
        Some(Self {
            record,
            items,
            holdings,
        })
    }

    pub fn uri(&self) -> &str {
        &self.record.uri
    }
}

impl StatementAccess for Bib {
    fn all_statements(&self) -> &[Statement] {
        &self.record.statements
    }
}

/// Group rows by subject id, preserving first-seen subject order.
fn group_by_subject(rows: Vec<StatementRow>) -> Vec<Vec<StatementRow>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: FxHashMap<String, Vec<StatementRow>> = FxHashMap::default();
    for row in rows {
        let group = groups.entry(row.subject_id.clone()).or_insert_with(|| {
            order.push(row.subject_id.clone());
            Vec::new()
        });
        group.push(row);
    }
    order
        .into_iter()
        .map(|subject| groups.remove(&subject).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates;

    fn sample_record() -> Record {
        Record::new(
            "b10001",
            vec![
                Statement::literal("b10001", "dcterms:title", "Middle title"),
                Statement::literal("b10001", "dcterms:title", "A title"),
                Statement::entity("b10001", "bf:media", "mediatypes:n", Some("unmediated")),
                Statement::literal("b10001", predicates::SUPPRESSED, "true"),
            ],
        )
    }

    #[test]
    fn literal_returns_first_in_stored_order() {
        let rec = sample_record();
        assert_eq!(rec.literal("dcterms:title"), Some("Middle title"));
        assert_eq!(rec.literals("dcterms:title").len(), 2);
    }

    #[test]
    fn each_sorts_literals() {
        let rec = sample_record();
        let titles = rec.each("dcterms:title", |s| s.literal_value().unwrap().to_string());
        assert_eq!(titles, vec!["A title", "Middle title"]);
    }

    #[test]
    fn boolean_literal_checks_true_string() {
        let rec = sample_record();
        assert!(rec.boolean_literal(predicates::SUPPRESSED));
        assert!(!rec.boolean_literal("dcterms:title"));
    }

    #[test]
    fn entity_id_skips_literals() {
        let rec = sample_record();
        assert_eq!(rec.entity_id("bf:media"), Some("mediatypes:n"));
        assert_eq!(rec.entity_id("dcterms:title"), None);
    }

    #[test]
    fn has_missing_predicate() {
        let rec = sample_record();
        assert!(!rec.has("nypl:nothing"));
    }

    #[test]
    fn label_reads_pref_label() {
        let rec = Record::new(
            "status:a",
            vec![Statement::literal("status:a", predicates::PREF_LABEL, "Available")],
        );
        assert_eq!(rec.label(), Some("Available"));
        assert_eq!(sample_record().label(), None);
    }

    #[test]
    fn blank_nodes_expose_sub_records() {
        let rec = Record::new(
            "b1",
            vec![Statement::blank_node(
                "b1",
                "skos:note",
                vec![
                    Statement::literal("b1#1.0001", predicates::NOTE_TYPE, "General Note"),
                    Statement::literal("b1#1.0001", predicates::RDFS_LABEL, "In two parts"),
                ],
            )],
        );
        let nodes = rec.blank_nodes("skos:note");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].literal(predicates::NOTE_TYPE), Some("General Note"));
        assert_eq!(nodes[0].literal(predicates::RDFS_LABEL), Some("In two parts"));
    }

    #[test]
    fn bib_from_rows_groups_children() {
        let bib_rows = vec![StatementRow {
            subject_id: "b1".into(),
            predicate: "dcterms:title".into(),
            object_id: None,
            object_literal: Some("T".into()),
            object_label: None,
            object_type: None,
            index: None,
            blank_nodes: None,
        }];
        let item_rows = ["i1", "i2", "i1"]
            .iter()
            .map(|s| StatementRow {
                subject_id: (*s).into(),
                predicate: "nypl:shelfMark".into(),
                object_id: None,
                object_literal: Some(format!("Box {s}")),
                object_label: None,
                object_type: None,
                index: None,
                blank_nodes: None,
            })
            .collect();
        let bib = Bib::from_rows(bib_rows, item_rows, vec![]).unwrap();
        assert_eq!(bib.uri(), "b1");
        assert_eq!(bib.items.len(), 2);
        assert_eq!(bib.items[0].uri(), "i1");
        assert_eq!(bib.items[0].record.statements.len(), 2);
        assert_eq!(bib.items[1].uri(), "i2");
    }

    #[test]
    fn bib_from_rows_empty_is_none() {
        assert!(Bib::from_rows(vec![], vec![], vec![]).is_none());
    }
}
