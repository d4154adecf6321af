//! Record → search document serialization
//!
//! One serializer function per record type over a shared document
//! builder. The bib serializer aggregates its item/holding children
//! (dropping suppressed ones) and derives the nested sort keys and
//! summary counts.

pub mod bib;
pub mod holding;
pub mod identifier;
pub mod item;

pub use bib::serialize_bib;
pub use holding::serialize_holding;
pub use item::serialize_item;

use serde_json::{Map, Value};

use octavo_model::{RecordType, Statement, StatementAccess};

use crate::document::Document;
use identifier::ParsedIdentifier;

/// Electronic locators and supplementary content index as `{url, label}`
/// objects. The url is the statement's literal (or entity id when the
/// source labeled it); the label rides along when present.
pub(crate) fn url_object(statement: &Statement) -> Option<Value> {
    let url = statement
        .literal_value()
        .or_else(|| statement.entity_id())?;
    let mut obj = Map::new();
    obj.insert("url".to_string(), Value::String(url.to_string()));
    if let Some(label) = statement.entity_label() {
        obj.insert("label".to_string(), Value::String(label.to_string()));
    }
    Some(Value::Object(obj))
}

/// Every identifier on a record, flat and blank-node encoded.
pub(crate) fn collect_identifiers<R: StatementAccess>(
    record: &R,
    predicate: &str,
) -> Vec<ParsedIdentifier> {
    let mut parsed: Vec<ParsedIdentifier> = record
        .statements(predicate)
        .into_iter()
        .filter_map(identifier::parse_statement)
        .collect();
    parsed.extend(
        record
            .blank_nodes(predicate)
            .into_iter()
            .filter_map(identifier::parse_blank_node),
    );
    parsed
}

/// Index one parsed identifier: the legacy urn string, the structured
/// identifierV2 entry, and the type-specific singleton fields. The
/// latter only when no disqualifying identifierStatus (e.g. "canceled")
/// is present.
pub(crate) fn add_identifier(doc: &mut Document, ident: ParsedIdentifier, record_type: RecordType) {
    doc.add("identifier", ident.urn_style);

    let Some(entity) = ident.entity else {
        return;
    };

    let mut v2 = Map::new();
    v2.insert("type".to_string(), Value::String(entity.id_type.clone()));
    v2.insert("value".to_string(), Value::String(entity.value.clone()));
    if let Some(status) = &entity.status {
        v2.insert(
            "identifierStatus".to_string(),
            Value::String(status.clone()),
        );
    }
    doc.add("identifierV2", Value::Object(v2));

    if entity.status.is_some() {
        return;
    }
    match (record_type, entity.id_type.as_str()) {
        (RecordType::Bib, "nypl:Oclc") => {
            doc.add("idOclc", entity.value);
        }
        (RecordType::Bib, "bf:Lccn") => {
            doc.add("idLccn", entity.value);
        }
        (RecordType::Bib, "bf:Issn") => {
            doc.add("idIssn", entity.value);
        }
        (RecordType::Bib, "bf:Isbn") => {
            // Some records are catalogued with a stray trailing colon
            let without_colon = entity.value.strip_suffix(':').unwrap_or(&entity.value);
            doc.add("idIsbn", without_colon);
            let clean: String = entity
                .value
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == 'x' || *c == 'X')
                .collect();
            doc.add("idIsbn_clean", clean);
        }
        (RecordType::Item, "bf:Barcode") => {
            doc.add("idBarcode", entity.value);
        }
        _ => {}
    }
}
