//! Item-type taxonomy: catalog item type to collection types
//!
//! The research classification hangs off this: an item whose catalog
//! item type maps to a collection type containing "Research" counts as a
//! research item. The table is externally supplied and cached for the
//! process lifetime.

use rustc_hash::FxHashMap;

/// Lookup from a catalog item type id (the numeric part of
/// `catalogItemType:NN`) to its collection types.
pub trait Taxonomy: Send + Sync {
    fn collection_types(&self, catalog_item_type_id: &str) -> Option<&[String]>;

    /// Whether any collection type for the id names the Research collection.
    fn is_research_type(&self, catalog_item_type_id: &str) -> bool {
        self.collection_types(catalog_item_type_id)
            .is_some_and(|types| types.iter().any(|t| t.contains("Research")))
    }
}

/// Taxonomy backed by a static JSON table (`{"55": ["Research"], ...}`).
#[derive(Debug, Clone)]
pub struct StaticTaxonomy {
    types: FxHashMap<String, Vec<String>>,
}

impl StaticTaxonomy {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            types: serde_json::from_str(json)?,
        })
    }

    /// Table compiled into the binary (Sierra types 1-100 are Research).
    pub fn builtin() -> Self {
        Self::from_json(include_str!("../data/catalog-item-types.json"))
            .expect("builtin catalog item type table is valid")
    }

    pub fn from_file(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(std::io::Error::other)
    }
}

impl Taxonomy for StaticTaxonomy {
    fn collection_types(&self, catalog_item_type_id: &str) -> Option<&[String]> {
        self.types.get(catalog_item_type_id).map(Vec::as_slice)
    }
}
