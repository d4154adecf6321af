//! Holding document serialization
//!
//! Holdings nest inside their bib's document. Suppressed (or deleted)
//! holdings produce no document. Check-in boxes arrive as blank nodes;
//! the bib serializer later attaches the holding's shelfmark to each box
//! and sorts them by position.

use serde_json::{json, Map, Value};

use octavo_model::{predicates, Holding, MappingCache, RecordType, StatementAccess};

use crate::document::Document;
use crate::error::Error;

const LITERAL_FIELDS: &[&str] = &["Format", "Note", "Physical Location", "Holding Statement"];

pub fn serialize_holding(
    holding: &Holding,
    mappings: &MappingCache,
) -> Result<Option<Document>, Error> {
    let mapping = mappings.for_type(RecordType::Holding)?;

    if holding.literal(mapping.predicate_for("Suppressed")?) == Some("true") {
        log::info!("Refusing to serialize suppressed {}", holding.uri());
        return Ok(None);
    }

    let mut doc = Document::new(holding.uri());

    for field in LITERAL_FIELDS {
        let spec = mapping.spec_for(field)?;
        holding.each(&spec.pred, |s| {
            if let Some(lit) = s.literal_value() {
                doc.add(spec.json_ld_key(), lit);
            }
        });
    }

    // The lowercase type tag is a legacy quirk the index schema expects.
    let call_number_spec = mapping.spec_for("Call Number")?;
    holding.each(&call_number_spec.pred, |s| {
        if let Some(lit) = s.literal_value() {
            doc.add(call_number_spec.json_ld_key(), lit);
            doc.add("identifierV2", json!({ "value": lit, "type": "bf:shelfMark" }));
        }
    });

    let location_spec = mapping.spec_for("Location")?;
    holding.each(&location_spec.pred, |s| {
        if let Some(code) = s.entity_id() {
            let mut entry = Map::new();
            entry.insert("code".to_string(), Value::String(code.to_string()));
            if let Some(label) = s.entity_label() {
                entry.insert("label".to_string(), Value::String(label.to_string()));
            }
            doc.add(location_spec.json_ld_key(), Value::Object(entry));
        }
    });

    let box_spec = mapping.spec_for("Check In Box")?;
    for node in holding.blank_nodes(&box_spec.pred) {
        let mut entry = Map::new();
        entry.insert(
            "type".to_string(),
            Value::String("nypl:CheckInBox".to_string()),
        );
        for (key, pred) in [
            ("coverage", predicates::BOX_COVERAGE),
            ("status", predicates::BOX_STATUS),
            ("copies", predicates::BOX_COPIES),
            ("position", predicates::BOX_POSITION),
        ] {
            if let Some(lit) = node.literal(pred) {
                entry.insert(key.to_string(), Value::String(lit.to_string()));
            }
        }
        doc.add(box_spec.json_ld_key(), Value::Object(entry));
    }

    Ok(Some(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use octavo_model::{Record, Statement};

    fn mappings() -> MappingCache {
        MappingCache::builtin()
    }

    fn holding_with(statements: Vec<Statement>) -> Holding {
        Holding::new(Record::new("h10001", statements))
    }

    #[test]
    fn suppressed_holding_produces_no_document() {
        let holding = holding_with(vec![Statement::literal(
            "h10001",
            predicates::SUPPRESSED,
            "true",
        )]);
        assert!(serialize_holding(&holding, &mappings()).unwrap().is_none());
    }

    #[test]
    fn literals_and_call_number() {
        let holding = holding_with(vec![
            Statement::literal("h10001", "dcterms:format", "PRINT"),
            Statement::literal("h10001", "nypl:holdingStatement", "v. 1-20 (1900-1920)"),
            Statement::literal("h10001", predicates::SHELF_MARK, "JFE 86-123"),
        ]);
        let doc = serialize_holding(&holding, &mappings()).unwrap().unwrap();
        assert_eq!(doc.first("format").unwrap(), &json!("PRINT"));
        assert_eq!(
            doc.first("holdingStatement").unwrap(),
            &json!("v. 1-20 (1900-1920)")
        );
        assert_eq!(
            doc.first("identifierV2").unwrap(),
            &json!({"value": "JFE 86-123", "type": "bf:shelfMark"})
        );
    }

    #[test]
    fn location_as_code_label_pair() {
        let holding = holding_with(vec![Statement::entity(
            "h10001",
            "nypl:holdingLocation",
            "loc:mal",
            Some("Schwarzman Building - Main Reading Room"),
        )]);
        let doc = serialize_holding(&holding, &mappings()).unwrap().unwrap();
        assert_eq!(
            doc.first("location").unwrap(),
            &json!({"code": "loc:mal", "label": "Schwarzman Building - Main Reading Room"})
        );
    }

    #[test]
    fn check_in_boxes_from_blank_nodes() {
        let holding = holding_with(vec![Statement::blank_node(
            "h10001",
            "nypl:checkInBox",
            vec![
                Statement::literal("h10001#1.0001", predicates::BOX_COVERAGE, "Jan. 2024"),
                Statement::literal("h10001#1.0001", predicates::BOX_STATUS, "Arrived"),
                Statement::literal("h10001#1.0001", predicates::BOX_COPIES, "1"),
                Statement::literal("h10001#1.0001", predicates::BOX_POSITION, "1"),
            ],
        )]);
        let doc = serialize_holding(&holding, &mappings()).unwrap().unwrap();
        assert_eq!(
            doc.first("checkInBoxes").unwrap(),
            &json!({
                "type": "nypl:CheckInBox",
                "coverage": "Jan. 2024",
                "status": "Arrived",
                "copies": "1",
                "position": "1"
            })
        );
    }
}
