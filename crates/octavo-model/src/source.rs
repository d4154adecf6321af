//! Record sources: uri prefix to owning catalog
//!
//! Record uris carry their source as a letter prefix ahead of the numeric
//! id: `b...`/`i...` for Sierra, `cb`/`hb`/`pb` (and `ci`/`hi`/`pi`) for
//! the partner catalogs.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSource {
    SierraNypl,
    RecapCul,
    RecapHl,
    RecapPul,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SierraNypl => "sierra-nypl",
            Self::RecapCul => "recap-cul",
            Self::RecapHl => "recap-hl",
            Self::RecapPul => "recap-pul",
        }
    }

    /// Source for a uri, defaulting to Sierra when the prefix is not a
    /// partner prefix.
    pub fn from_uri(uri: &str) -> Self {
        split_identifier(uri)
            .map(|split| split.source)
            .unwrap_or(Self::SierraNypl)
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A uri split into its source prefix and numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitIdentifier<'a> {
    pub source: RecordSource,
    pub prefix: &'a str,
    pub id: &'a str,
}

// Longest prefixes first so `cb` wins over `b`.
const PREFIXES: &[(&str, RecordSource)] = &[
    ("cb", RecordSource::RecapCul),
    ("ci", RecordSource::RecapCul),
    ("hb", RecordSource::RecapHl),
    ("hi", RecordSource::RecapHl),
    ("pb", RecordSource::RecapPul),
    ("pi", RecordSource::RecapPul),
    ("b", RecordSource::SierraNypl),
    ("i", RecordSource::SierraNypl),
];

/// Split a record uri on its source prefix. Returns `None` when the uri
/// does not start with a known prefix followed by an id.
pub fn split_identifier(uri: &str) -> Option<SplitIdentifier<'_>> {
    PREFIXES.iter().find_map(|(prefix, source)| {
        let id = uri.strip_prefix(prefix)?;
        if id.is_empty() || !id.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        Some(SplitIdentifier {
            source: *source,
            prefix,
            id,
        })
    })
}

/// The uri with its letter prefix stripped (stream notification id).
pub fn numeric_id(uri: &str) -> &str {
    uri.trim_start_matches(|c: char| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sierra_bib() {
        let split = split_identifier("b10681848").unwrap();
        assert_eq!(split.source, RecordSource::SierraNypl);
        assert_eq!(split.prefix, "b");
        assert_eq!(split.id, "10681848");
    }

    #[test]
    fn partner_prefixes() {
        assert_eq!(
            split_identifier("cb1234").unwrap().source,
            RecordSource::RecapCul
        );
        assert_eq!(
            split_identifier("hb1234").unwrap().source,
            RecordSource::RecapHl
        );
        assert_eq!(
            split_identifier("pb1234").unwrap().source,
            RecordSource::RecapPul
        );
        assert_eq!(
            split_identifier("pi1234").unwrap().source,
            RecordSource::RecapPul
        );
    }

    #[test]
    fn unknown_prefix_is_none() {
        assert!(split_identifier("x1234").is_none());
        assert!(split_identifier("b").is_none());
        assert!(split_identifier("balloon").is_none());
    }

    #[test]
    fn from_uri_defaults_to_sierra() {
        assert_eq!(RecordSource::from_uri("x999"), RecordSource::SierraNypl);
        assert_eq!(RecordSource::from_uri("cb999"), RecordSource::RecapCul);
    }

    #[test]
    fn numeric_id_strips_letters() {
        assert_eq!(numeric_id("b10681848"), "10681848");
        assert_eq!(numeric_id("cb1234"), "1234");
        assert_eq!(numeric_id("1234"), "1234");
    }

    #[test]
    fn source_strings() {
        assert_eq!(RecordSource::SierraNypl.to_string(), "sierra-nypl");
        assert_eq!(RecordSource::RecapPul.to_string(), "recap-pul");
    }
}
