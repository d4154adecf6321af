//! Octavo Model - Statement-based record model and declarative field mapping
//!
//! Records live in the triple store as (subject, predicate, object)
//! statements. This crate provides the in-memory statement model (with
//! literal, entity, and blank-node values), the bib/item/holding record
//! types built from query rows, the declarative field-mapping registry,
//! the uri-prefix source table, and the item-type taxonomy backing the
//! research classification.

pub mod mapping;
pub mod record;
pub mod source;
pub mod statement;
pub mod taxonomy;

pub use mapping::{FieldMapping, FieldSpec, MappingCache, MappingError, MappingSource, RecordType};
pub use record::{Bib, Holding, Item, Record, StatementAccess};
pub use source::RecordSource;
pub use statement::{Statement, StatementRow, StatementValue};
pub use taxonomy::{StaticTaxonomy, Taxonomy};

/// Well-known predicates shared across record types.
pub mod predicates {
    pub const SUPPRESSED: &str = "nypl:suppressed";
    pub const SHELF_MARK: &str = "nypl:shelfMark";
    pub const ELECTRONIC_LOCATOR: &str = "nypl:electronicLocator";
    pub const BF_ELECTRONIC_LOCATOR: &str = "bf:electronicLocator";
    pub const CATALOG_ITEM_TYPE: &str = "nypl:catalogItemType";
    pub const RDF_TYPE: &str = "rdf:type";
    pub const RDF_VALUE: &str = "rdf:value";
    pub const RDFS_LABEL: &str = "rdfs:label";
    pub const PREF_LABEL: &str = "skos:prefLabel";
    pub const IDENTIFIER_STATUS: &str = "bf:identifierStatus";
    pub const NOTE_TYPE: &str = "bf:noteType";
    pub const BOX_COVERAGE: &str = "dcterms:coverage";
    pub const BOX_STATUS: &str = "bf:status";
    pub const BOX_COPIES: &str = "bf:count";
    pub const BOX_POSITION: &str = "bf:part";
}
