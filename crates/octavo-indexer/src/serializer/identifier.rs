//! Identifier reconciliation
//!
//! Identifiers arrive in two encodings: flat statements whose entity id
//! packs the type as a urn prefix ("urn:isbn:12345", sometimes with an
//! explicit object type instead), and blank nodes carrying rdf:type /
//! rdf:value / bf:identifierStatus statements. Both parse into a
//! canonical form feeding the legacy `identifier` urn strings and the
//! structured `identifierV2` entries. Unparseable types degrade to the
//! urn-style string only, never an error.

use octavo_model::{predicates, Record, Statement, StatementAccess};

const URN_PREFIXES: &[(&str, &str)] = &[
    ("barcode", "bf:Barcode"),
    ("bnum", "nypl:Bnumber"),
    ("isbn", "bf:Isbn"),
    ("issn", "bf:Issn"),
    ("lccn", "bf:Lccn"),
    ("oclc", "nypl:Oclc"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierEntity {
    pub id_type: String,
    pub value: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIdentifier {
    /// Legacy "urn:<prefix>:<value>" form (or the raw id when the type
    /// cannot be determined).
    pub urn_style: String,
    /// Structured form for identifierV2; absent when the type is unknown.
    pub entity: Option<IdentifierEntity>,
}

fn type_for_prefix(prefix: &str) -> Option<&'static str> {
    URN_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, t)| *t)
}

fn prefix_for_type(id_type: &str) -> Option<&'static str> {
    URN_PREFIXES
        .iter()
        .find(|(_, t)| *t == id_type)
        .map(|(p, _)| *p)
}

/// Split "urn:<token>:<rest>" into (token, rest).
fn urn_parts(id: &str) -> Option<(&str, &str)> {
    let rest = id.strip_prefix("urn:")?;
    let (token, value) = rest.split_once(':')?;
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((token, value))
}

/// Parse a flat identifier statement. Returns `None` for statements with
/// no entity id (nothing to identify).
pub fn parse_statement(statement: &Statement) -> Option<ParsedIdentifier> {
    let id = statement.entity_id()?;

    let (id_type, value) = match urn_parts(id) {
        Some((token, value)) => {
            let id_type = statement
                .value_type()
                .map(str::to_string)
                .or_else(|| type_for_prefix(token).map(str::to_string));
            (id_type, value.to_string())
        }
        None => (
            statement.value_type().map(str::to_string),
            id.to_string(),
        ),
    };

    let urn_style = if urn_parts(id).is_some() {
        id.to_string()
    } else {
        match id_type.as_deref().and_then(prefix_for_type) {
            Some(prefix) => format!("urn:{prefix}:{value}"),
            None => id.to_string(),
        }
    };

    Some(ParsedIdentifier {
        urn_style,
        entity: id_type.map(|id_type| IdentifierEntity {
            id_type,
            value,
            status: None,
        }),
    })
}

/// Parse a blank-node identifier (rdf:type / rdf:value / optional
/// bf:identifierStatus). Returns `None` when the node has no value.
pub fn parse_blank_node(node: &Record) -> Option<ParsedIdentifier> {
    let value = node.literal(predicates::RDF_VALUE)?.to_string();
    let id_type = node.entity_id(predicates::RDF_TYPE).map(str::to_string);
    let status = node
        .literal(predicates::IDENTIFIER_STATUS)
        .map(str::to_string);

    let urn_style = match id_type.as_deref().and_then(prefix_for_type) {
        Some(prefix) => format!("urn:{prefix}:{value}"),
        None => value.clone(),
    };

    Some(ParsedIdentifier {
        urn_style,
        entity: id_type.map(|id_type| IdentifierEntity {
            id_type,
            value,
            status,
        }),
    })
}
