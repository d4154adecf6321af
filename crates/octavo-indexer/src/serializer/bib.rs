//! Bib document serialization
//!
//! Produces the top-level search document: mapped fields, derived sort
//! keys, reconciled identifiers, exploded subjects, and the nested
//! item/holding arrays with their shelfmark sort keys and summary
//! counts.

use serde_json::{json, Map, Value};

use octavo_model::{predicates, MappingCache, RecordSource, RecordType, Statement};
use octavo_model::{Bib, StatementAccess};

use crate::document::Document;
use crate::error::Error;
use crate::serializer::{add_identifier, collect_identifiers, holding, item, url_object};
use crate::shelfmark::shelf_mark_sort_key;
use crate::text;

/// Item status id counting as available for `numAvailable`.
const STATUS_AVAILABLE: &str = "status:a";

/// Fields indexed as plain literals in canonical order.
const LITERAL_FIELDS: &[&str] = &[
    "Alternative title",
    "Dates of serial publication",
    "Description",
    "Dimensions",
    "Donor/Sponsor",
    "Extent",
    "Former title",
    "Genre/Form literal",
    "LCC classification",
    "Part of",
    "Place of publication",
    "Publication statement",
    "Publisher literal",
    "Series statement",
    "Subject literal",
    "Title",
    "Title display",
    "Uniform title",
];

/// Fields indexed as plain literals preserving stored order.
const ORDERED_LITERAL_FIELDS: &[&str] = &["Contents", "Contents title"];

pub fn serialize_bib(bib: &Bib, mappings: &MappingCache) -> Result<Document, Error> {
    let mapping = mappings.for_type(RecordType::Bib)?;
    let mut doc = Document::new(bib.uri());

    // A suppressed bib keeps a minimal stub in the index: the uri exists
    // but carries nothing beyond the suppression marker.
    if bib.literal(mapping.predicate_for("Suppressed")?) == Some("true") {
        doc.set("suppressed", true);
        return Ok(doc);
    }

    doc.add("nyplSource", RecordSource::from_uri(bib.uri()).as_str());
    doc.add("uris", bib.uri());
    doc.add("type", "nypl:Item");

    let title_spec = mapping.spec_for("Title")?;
    if let Some(title) = bib
        .statement(&title_spec.pred)
        .and_then(Statement::literal_value)
    {
        doc.add("title_sort", text::title_sort_transform(title));
    }

    // Contributor/creator get a sort key off the first literal,
    // deliberately less normalized than title_sort.
    for (field, sort_key) in [
        ("Contributor literal", "contributor_sort"),
        ("Creator literal", "creator_sort"),
    ] {
        let spec = mapping.spec_for(field)?;
        if !bib.has(&spec.pred) {
            continue;
        }
        bib.each(&spec.pred, |s| {
            if let Some(lit) = s.literal_value() {
                doc.add(spec.json_ld_key(), lit);
            }
        });
        if let Some(first) = bib.statement(&spec.pred).and_then(Statement::literal_value) {
            doc.add(sort_key, text::name_sort_transform(first));
        }
    }

    for (field, year_key, string_key) in [
        ("Date start", "dateStartYear", "dateString"),
        ("Date end", "dateEndYear", "dateEndString"),
        ("Date created", "createdYear", "createdString"),
    ] {
        let spec = mapping.spec_for(field)?;
        bib.each(&spec.pred, |s| {
            if let Some(lit) = s.literal_value() {
                if let Some(year) = text::leading_year(lit) {
                    doc.add(year_key, year);
                }
                doc.add(string_key, lit);
            }
        });
    }

    // Entities that must carry a label; unlabeled ones would index as
    // bare literals where an object is expected, so they are dropped.
    for field in ["Media type", "Carrier type", "Issuance", "Language"] {
        let spec = mapping.spec_for(field)?;
        bib.each(&spec.pred, |s| {
            if let (Some(id), Some(label)) = (s.entity_id(), s.entity_label()) {
                doc.add_entity(spec.json_ld_key(), id, Some(label));
            }
        });
    }

    let call_number_spec = mapping.spec_for("Call number")?;
    bib.each(&call_number_spec.pred, |s| {
        if let Some(lit) = s.literal_value() {
            doc.add(call_number_spec.json_ld_key(), lit);
            doc.add("identifierV2", json!({ "value": lit, "type": "bf:ShelfMark" }));
        }
    });

    let material_spec = mapping.spec_for("Resource type")?;
    bib.each(&material_spec.pred, |s| {
        if let Some(id) = s.entity_id() {
            doc.add_entity("materialType", id, s.entity_label());
        }
    });

    let identifier_pred = mapping.predicate_for("Identifier")?;
    for ident in collect_identifiers(bib, identifier_pred) {
        add_identifier(&mut doc, ident, RecordType::Bib);
    }

    for field in ORDERED_LITERAL_FIELDS {
        let spec = mapping.spec_for(field)?;
        for lit in bib.literals(&spec.pred) {
            doc.add(spec.json_ld_key(), lit);
        }
    }

    // Parallel fields: standard ones index as plain literals; display
    // variants keep their statement index for positional alignment with
    // the field they mirror.
    let mut parallel_standard: Vec<String> = Vec::new();
    let mut parallel_display: Vec<String> = Vec::new();
    for (name, spec) in mapping.entries() {
        if !name.contains("Parallel") {
            continue;
        }
        if spec.elastic_search_key.as_deref() == Some("parallelDisplayField") {
            parallel_display.push(name.to_string());
        } else {
            parallel_standard.push(name.to_string());
        }
    }
    parallel_standard.sort();
    parallel_display.sort();

    for field in LITERAL_FIELDS
        .iter()
        .map(|s| s.to_string())
        .chain(parallel_standard)
    {
        let spec = mapping.spec_for(&field)?;
        bib.each(&spec.pred, |s| {
            if let Some(lit) = s.literal_value() {
                doc.add(spec.json_ld_key(), lit);
            }
        });
    }

    for field in parallel_display {
        let spec = mapping.spec_for(&field)?;
        let out_key = spec
            .elastic_search_key
            .as_deref()
            .unwrap_or_else(|| spec.json_ld_key());
        bib.each(&spec.pred, |s| {
            if let Some(lit) = s.literal_value() {
                let mut entry = Map::new();
                if let Some(name) = &spec.parallel_field_name {
                    entry.insert("fieldName".to_string(), Value::String(name.clone()));
                }
                if let Some(index) = s.position {
                    entry.insert("index".to_string(), Value::from(index));
                }
                entry.insert("value".to_string(), Value::String(lit.to_string()));
                doc.add(out_key, Value::Object(entry));
            }
        });
    }

    // Disaggregated subjects for hierarchical browsing
    let subject_spec = mapping.spec_for("Subject literal")?;
    bib.each(&subject_spec.pred, |s| {
        if let Some(lit) = s.literal_value() {
            for prefix in text::exploded_subject_literals(lit) {
                doc.add("subjectLiteral_exploded", prefix);
            }
        }
    });

    let supplementary_spec = mapping.spec_for("Supplementary content")?;
    bib.each(&supplementary_spec.pred, |s| {
        if let Some(obj) = url_object(s) {
            doc.add(supplementary_spec.json_ld_key(), obj);
        }
    });

    let note_spec = mapping.spec_for("Note")?;
    for node in bib.blank_nodes(&note_spec.pred) {
        let mut note = Map::new();
        note.insert("type".to_string(), Value::String("bf:Note".to_string()));
        if let Some(note_type) = node.literal(predicates::NOTE_TYPE) {
            note.insert("noteType".to_string(), Value::String(note_type.to_string()));
        }
        if let Some(label) = node.literal(predicates::RDFS_LABEL) {
            note.insert("label".to_string(), Value::String(label.to_string()));
        }
        doc.add(note_spec.index_key(), Value::Object(note));
    }

    // Non-electronic children lacking a shelfmark inherit the bib's.
    let default_shelf_mark: Vec<Value> = bib
        .literals(predicates::SHELF_MARK)
        .into_iter()
        .map(Value::from)
        .collect();

    if !bib.items.is_empty() {
        // Every child contributes a composite id so the bib is
        // retrievable by any of its children.
        for child in &bib.items {
            doc.add("uris", format!("{}-{}", bib.uri(), child.uri()));
        }

        let num_electronic = bib
            .items
            .iter()
            .filter(|i| {
                i.has(predicates::ELECTRONIC_LOCATOR) || i.has(predicates::BF_ELECTRONIC_LOCATOR)
            })
            .count();

        let mut item_docs: Vec<Document> = Vec::new();
        for child in &bib.items {
            // Suppressed items serialize to nothing and vanish from the
            // nested array entirely.
            if let Some(mut item_doc) = item::serialize_item(child, mappings)? {
                apply_default_shelf_mark(&mut item_doc, &default_shelf_mark);
                apply_sort_key(&mut item_doc);
                item_docs.push(item_doc);
            }
        }

        let num_available = item_docs
            .iter()
            .filter(|d| {
                d.first("status").and_then(|v| v.get("id")).and_then(Value::as_str)
                    == Some(STATUS_AVAILABLE)
            })
            .count();

        item_docs.sort_by(|a, b| sort_key_of(a).cmp(sort_key_of(b)));

        doc.add(
            "numItems",
            item_docs.len().saturating_sub(num_electronic) as u64,
        );
        doc.add("numElectronicResources", num_electronic as u64);
        doc.add("numAvailable", num_available as u64);
        doc.set(
            "items",
            Value::Array(item_docs.into_iter().map(Value::from).collect()),
        );
    }

    if !bib.holdings.is_empty() {
        for child in &bib.holdings {
            doc.add("uris", format!("{}-{}", bib.uri(), child.uri()));
        }

        let mut holding_docs: Vec<Document> = Vec::new();
        for child in &bib.holdings {
            if let Some(mut holding_doc) = holding::serialize_holding(child, mappings)? {
                if !holding_doc.contains_key("shelfMark") && !default_shelf_mark.is_empty() {
                    holding_doc.set("shelfMark", Value::Array(default_shelf_mark.clone()));
                }
                attach_box_shelf_marks(&mut holding_doc);
                holding_docs.push(holding_doc);
            }
        }
        doc.set(
            "holdings",
            Value::Array(holding_docs.into_iter().map(Value::from).collect()),
        );
    }

    Ok(doc)
}

fn sort_key_of(doc: &Document) -> &str {
    doc.get("shelfMark_sort")
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Inherit the bib's shelfmark onto a serialized child that has neither
/// its own shelfmark nor an electronic locator.
fn apply_default_shelf_mark(doc: &mut Document, default_shelf_mark: &[Value]) {
    if doc.contains_key("shelfMark") || doc.contains_key("electronicLocator") {
        return;
    }
    if !default_shelf_mark.is_empty() {
        doc.set("shelfMark", Value::Array(default_shelf_mark.to_vec()));
    }
}

/// Attach the three-tier shelfmark sort key to a serialized child.
fn apply_sort_key(doc: &mut Document) {
    let shelf_mark = doc
        .first("shelfMark")
        .and_then(Value::as_str)
        .map(str::to_string);
    let uri = match doc.uri() {
        "" => None,
        uri => Some(uri.to_string()),
    };
    let key = shelf_mark_sort_key(shelf_mark.as_deref(), uri.as_deref());
    doc.set("shelfMark_sort", key);
}

/// Check-in boxes inherit their holding's shelfmark and sort by their
/// numeric position.
fn attach_box_shelf_marks(doc: &mut Document) {
    let Some(Value::Array(mut boxes)) = doc.remove("checkInBoxes") else {
        return;
    };
    let shelf_mark = doc.get("shelfMark").cloned();
    for b in boxes.iter_mut() {
        if let (Value::Object(entry), Some(shelf_mark)) = (b, &shelf_mark) {
            entry.insert("shelfMark".to_string(), shelf_mark.clone());
        }
    }
    boxes.sort_by_key(|b| {
        b.get("position")
            .and_then(Value::as_str)
            .and_then(|p| p.parse::<i64>().ok())
            .unwrap_or(0)
    });
    doc.set("checkInBoxes", Value::Array(boxes));
}
