//! Item document serialization
//!
//! Items nest inside their bib's document. A suppressed item produces no
//! document at all; the bib serializer drops it from the nested array.

use serde_json::json;

use octavo_model::{predicates, Item, MappingCache, RecordType, StatementAccess};

use crate::document::Document;
use crate::error::Error;
use crate::serializer::{add_identifier, collect_identifiers, url_object};

/// Entity fields copied straight through with their labels.
const ENTITY_FIELDS: &[&str] = &[
    "Availability",
    "Content owner",
    "Catalog item type",
    "Holding location",
];

const LITERAL_FIELDS: &[&str] = &["Physical Location", "Enumeration Chronology"];

pub fn serialize_item(item: &Item, mappings: &MappingCache) -> Result<Option<Document>, Error> {
    let mapping = mappings.for_type(RecordType::Item)?;

    if item.literal(mapping.predicate_for("Suppressed")?) == Some("true") {
        log::info!("Refusing to serialize suppressed {}", item.uri());
        return Ok(None);
    }

    let mut doc = Document::new(item.uri());

    for field in ENTITY_FIELDS {
        let spec = mapping.spec_for(field)?;
        item.each(&spec.pred, |s| {
            if let Some(id) = s.entity_id() {
                doc.add_entity(spec.json_ld_key(), id, s.entity_label());
            }
        });
    }

    let call_number_spec = mapping.spec_for("Call number")?;
    item.each(&call_number_spec.pred, |s| {
        if let Some(lit) = s.literal_value() {
            doc.add(call_number_spec.json_ld_key(), lit);
            doc.add("identifierV2", json!({ "value": lit, "type": "bf:ShelfMark" }));
        }
    });

    for field in LITERAL_FIELDS {
        let spec = mapping.spec_for(field)?;
        item.each(&spec.pred, |s| {
            if let Some(lit) = s.literal_value() {
                doc.add(spec.json_ld_key(), lit);
            }
        });
    }

    let identifier_pred = mapping.predicate_for("Identifier")?;
    for ident in collect_identifiers(item, identifier_pred) {
        add_identifier(&mut doc, ident, RecordType::Item);
    }

    // Electronic locations are declared in the bib mapping; most stored
    // items still carry the legacy predicate as well.
    let bib_mapping = mappings.for_type(RecordType::Bib)?;
    let locator_spec = bib_mapping.spec_for("Electronic location")?;
    item.each(&locator_spec.pred, |s| {
        if let Some(obj) = url_object(s) {
            doc.add(locator_spec.json_ld_key(), obj);
        }
    });
    item.each(predicates::ELECTRONIC_LOCATOR, |s| {
        if let Some(obj) = url_object(s) {
            doc.add(locator_spec.json_ld_key(), obj);
        }
    });

    let requestable_spec = mapping.spec_for("Requestable")?;
    item.each(&requestable_spec.pred, |s| {
        if let Some(lit) = s.literal_value() {
            doc.add(requestable_spec.json_ld_key(), lit == "true");
        }
    });

    let access_spec = mapping.spec_for("Access message")?;
    item.each(&access_spec.pred, |s| {
        if let Some(id) = s.entity_id() {
            doc.add_entity(access_spec.json_ld_key(), id, s.entity_label());
        }
    });

    Ok(Some(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use octavo_model::{Record, Statement};
    use serde_json::json;

    fn mappings() -> MappingCache {
        MappingCache::builtin()
    }

    fn item_with(statements: Vec<Statement>) -> Item {
        Item::new(Record::new("i10001", statements))
    }

    #[test]
    fn suppressed_item_produces_no_document() {
        let item = item_with(vec![Statement::literal(
            "i10001",
            predicates::SUPPRESSED,
            "true",
        )]);
        assert!(serialize_item(&item, &mappings()).unwrap().is_none());
    }

    #[test]
    fn entities_pack_with_labels() {
        let item = item_with(vec![
            Statement::entity("i10001", "bf:status", "status:a", Some("Available")),
            Statement::entity("i10001", "nypl:owner", "orgs:1000", Some("Research Library")),
        ]);
        let doc = serialize_item(&item, &mappings()).unwrap().unwrap();
        assert_eq!(
            doc.first("status").unwrap(),
            &json!({"id": "status:a", "label": "Available"})
        );
        assert_eq!(
            doc.first("status_packed").unwrap(),
            &json!("status:a||Available")
        );
        assert_eq!(
            doc.first("owner_packed").unwrap(),
            &json!("orgs:1000||Research Library")
        );
    }

    #[test]
    fn call_number_feeds_identifier_v2() {
        let item = item_with(vec![Statement::literal(
            "i10001",
            predicates::SHELF_MARK,
            "JFE 86-123 Box 2",
        )]);
        let doc = serialize_item(&item, &mappings()).unwrap().unwrap();
        assert_eq!(doc.first("shelfMark").unwrap(), &json!("JFE 86-123 Box 2"));
        assert_eq!(
            doc.first("identifierV2").unwrap(),
            &json!({"value": "JFE 86-123 Box 2", "type": "bf:ShelfMark"})
        );
    }

    #[test]
    fn barcode_identifier_fans_out() {
        let item = item_with(vec![Statement::entity(
            "i10001",
            "dcterms:identifier",
            "urn:barcode:33433012345678",
            None,
        )]);
        let doc = serialize_item(&item, &mappings()).unwrap().unwrap();
        assert_eq!(
            doc.first("identifier").unwrap(),
            &json!("urn:barcode:33433012345678")
        );
        assert_eq!(doc.first("idBarcode").unwrap(), &json!("33433012345678"));
        assert_eq!(
            doc.first("identifierV2").unwrap(),
            &json!({"type": "bf:Barcode", "value": "33433012345678"})
        );
    }

    #[test]
    fn legacy_electronic_locator_predicate_still_indexes() {
        let item = item_with(vec![Statement::entity(
            "i10001",
            predicates::ELECTRONIC_LOCATOR,
            "http://example.org/full-text",
            Some("Full text"),
        )]);
        let doc = serialize_item(&item, &mappings()).unwrap().unwrap();
        assert_eq!(
            doc.first("electronicLocator").unwrap(),
            &json!({"url": "http://example.org/full-text", "label": "Full text"})
        );
    }

    #[test]
    fn requestable_becomes_boolean() {
        let item = item_with(vec![Statement::literal(
            "i10001",
            "nypl:requestable",
            "true",
        )]);
        let doc = serialize_item(&item, &mappings()).unwrap().unwrap();
        assert_eq!(doc.first("requestable").unwrap(), &json!(true));
    }

    #[test]
    fn access_message_entity() {
        let item = item_with(vec![Statement::entity(
            "i10001",
            "nypl:accessMessage",
            "accessMessage:1",
            Some("Use in library"),
        )]);
        let doc = serialize_item(&item, &mappings()).unwrap().unwrap();
        assert_eq!(
            doc.first("accessMessage").unwrap(),
            &json!({"id": "accessMessage:1", "label": "Use in library"})
        );
    }
}
