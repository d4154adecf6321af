//! Shelfmark sort keys
//!
//! Call numbers like "Box 9" and "Box 25" must order numerically, so the
//! sortable transform zero-pads the number terminating a shelfmark, or
//! the number following a known label token (box, tube, v., no., r.),
//! lowercasing the label. Items then sort by a three-tier key: shelfmark
//! bearers first, uri-ordered items without one next, unknowns last.

use std::sync::LazyLock;

use regex::Regex;

const PAD_LEN: usize = 6;

// Either a number terminating the string, or a label token (preceded by
// start-of-string or whitespace) followed by a number.
static NUMBER_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+$|((^|\s)(box|v\.|no\.|r\.|tube) )(\d+))").expect("valid shelfmark regex")
});

static EXTRA_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));

/// Left-pad a numeric run with zeros to six digits.
pub fn zero_pad(s: &str) -> String {
    if s.len() >= PAD_LEN {
        return s.to_string();
    }
    let mut out = "0".repeat(PAD_LEN - s.len());
    out.push_str(s);
    out
}

/// Sortable form of a shelfmark: the first matching number span is
/// zero-padded in place (with its label, if any, lowercased) and
/// redundant whitespace collapsed.
///
/// "*T-Mss 1991-010   Box 27" => "*T-Mss 1991-010 box 000027"
/// "T-Mss 1991-010 27"        => "T-Mss 1991-010 000027"
pub fn sortable_shelf_mark(shelf_mark: &str) -> String {
    let replaced = match NUMBER_SPAN.captures(shelf_mark) {
        Some(caps) => {
            let span = caps.get(1).expect("whole match");
            let padded = match (caps.get(2), caps.get(5)) {
                // Label form: lowercase the label (with its leading
                // whitespace and trailing space) and pad the number
                (Some(label), Some(number)) => {
                    format!("{}{}", label.as_str().to_lowercase(), zero_pad(number.as_str()))
                }
                // Terminating-number form: pad the whole span
                _ => zero_pad(span.as_str()),
            };
            format!(
                "{}{}{}",
                &shelf_mark[..span.start()],
                padded,
                &shelf_mark[span.end()..]
            )
        }
        None => shelf_mark.to_string(),
    };
    EXTRA_WHITESPACE.replace_all(&replaced, " ").into_owned()
}

/// Three-tier sort key for a serialized item/holding: 'a' + sortable
/// shelfmark when one exists, 'b' + uri when only a uri exists, bare 'c'
/// otherwise. Sorting by this key puts shelfmark bearers first in sane
/// numeric order and unknowns last.
pub fn shelf_mark_sort_key(shelf_mark: Option<&str>, uri: Option<&str>) -> String {
    match shelf_mark {
        Some(sm) => format!("a{}", sortable_shelf_mark(sm)),
        None => match uri {
            Some(uri) => format!("b{uri}"),
            None => "c".to_string(),
        },
    }
}
