//! Suppression and research-eligibility rules
//!
//! A bib stays out of the index when it is explicitly suppressed or when
//! it fails the research test. A bib with no items is presumed research
//! (fail open); otherwise at least one child item must be research. An
//! item is research when its uri carries a partner prefix or its catalog
//! item type maps to a Research collection.

use std::fmt;

use octavo_model::{predicates, Bib, Item, StatementAccess, Taxonomy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionReason {
    /// The record's own suppression flag is set.
    Suppressed,
    /// No child item qualifies as research.
    NonResearch,
}

impl fmt::Display for SuppressionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppressed => f.write_str("because suppressed"),
            Self::NonResearch => f.write_str("because non-research"),
        }
    }
}

/// Decide whether a bib must be withheld from (and retracted from) the
/// index.
pub fn evaluate(bib: &Bib, taxonomy: &dyn Taxonomy) -> Option<SuppressionReason> {
    if bib.boolean_literal(predicates::SUPPRESSED) {
        return Some(SuppressionReason::Suppressed);
    }
    if !is_research_bib(bib, taxonomy) {
        return Some(SuppressionReason::NonResearch);
    }
    None
}

/// A bib is research when it has no items (assume research when
/// ambiguous) or at least one research item.
pub fn is_research_bib(bib: &Bib, taxonomy: &dyn Taxonomy) -> bool {
    bib.items.is_empty() || bib.items.iter().any(|item| is_research_item(item, taxonomy))
}

/// Partner items (p/c uri prefixes) are always research; others qualify
/// through their catalog item type's collection types.
pub fn is_research_item(item: &Item, taxonomy: &dyn Taxonomy) -> bool {
    if item.uri().starts_with(['p', 'c']) {
        return true;
    }
    item.entity_id(predicates::CATALOG_ITEM_TYPE)
        .and_then(|id| id.rsplit(':').next())
        .is_some_and(|type_id| taxonomy.is_research_type(type_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use octavo_model::{Record, Statement, StaticTaxonomy};

    fn taxonomy() -> StaticTaxonomy {
        StaticTaxonomy::builtin()
    }

    fn item(uri: &str, catalog_item_type: Option<&str>) -> Item {
        let mut statements = Vec::new();
        if let Some(t) = catalog_item_type {
            statements.push(Statement::entity(
                uri,
                predicates::CATALOG_ITEM_TYPE,
                format!("catalogItemType:{t}"),
                None,
            ));
        }
        Item::new(Record::new(uri, statements))
    }

    fn bib(uri: &str, statements: Vec<Statement>, items: Vec<Item>) -> Bib {
        Bib::new(Record::new(uri, statements)).with_items(items)
    }

    #[test]
    fn suppression_flag_wins() {
        let b = bib(
            "b1",
            vec![Statement::literal("b1", predicates::SUPPRESSED, "true")],
            vec![item("i1", Some("55"))],
        );
        assert_eq!(evaluate(&b, &taxonomy()), Some(SuppressionReason::Suppressed));
    }

    #[test]
    fn itemless_bib_is_presumed_research() {
        let b = bib("b1", vec![], vec![]);
        assert_eq!(evaluate(&b, &taxonomy()), None);
    }

    #[test]
    fn research_item_type_keeps_bib() {
        let b = bib("b1", vec![], vec![item("i1", Some("55"))]);
        assert_eq!(evaluate(&b, &taxonomy()), None);
    }

    #[test]
    fn circulating_only_bib_is_suppressed() {
        let b = bib("b1", vec![], vec![item("i1", Some("101"))]);
        assert_eq!(evaluate(&b, &taxonomy()), Some(SuppressionReason::NonResearch));
    }

    #[test]
    fn partner_item_is_research_regardless_of_type() {
        assert!(is_research_item(&item("pi123", None), &taxonomy()));
        assert!(is_research_item(&item("ci123", Some("101")), &taxonomy()));
        assert!(!is_research_item(&item("i123", Some("101")), &taxonomy()));
    }

    #[test]
    fn one_research_item_among_circulating_suffices() {
        let b = bib(
            "b1",
            vec![],
            vec![item("i1", Some("101")), item("i2", Some("2"))],
        );
        assert_eq!(evaluate(&b, &taxonomy()), None);
    }

    #[test]
    fn item_without_type_is_not_research() {
        let b = bib("b1", vec![], vec![item("i1", None)]);
        assert_eq!(evaluate(&b, &taxonomy()), Some(SuppressionReason::NonResearch));
    }
}
