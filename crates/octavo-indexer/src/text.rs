//! Text transforms for derived sort and browse fields

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Number of leading characters considered for sort fields.
pub const SORT_FIELD_LENGTH: usize = 80;

/// Sortable form of a title: truncate to 80 chars, fold accents, strip
/// everything that is not a word or space character, collapse
/// whitespace, drop leading non-word characters, lowercase.
pub fn title_sort_transform(title: &str) -> String {
    let truncated: String = title.chars().take(SORT_FIELD_LENGTH).collect();
    let folded: String = truncated
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let stripped: String = folded
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();
    collapse_whitespace(&stripped)
        .trim_start_matches(|c: char| !is_word_char(c))
        .to_string()
}

/// Sortable form of a contributor/creator: truncated and lowercased only
/// (deliberately less normalized than `title_sort_transform`).
pub fn name_sort_transform(name: &str) -> String {
    name.chars()
        .take(SORT_FIELD_LENGTH)
        .collect::<String>()
        .to_lowercase()
}

/// Explode a subject literal into every prefix of its ` -- ` hierarchy:
/// "A -- B -- C." yields ["A", "A -- B", "A -- B -- C"]. The trailing
/// period is stripped first.
pub fn exploded_subject_literals(subject: &str) -> Vec<String> {
    let trimmed = subject.strip_suffix('.').unwrap_or(subject);
    let parts: Vec<&str> = trimmed.split(" -- ").collect();
    (1..=parts.len())
        .map(|n| parts[..n].join(" -- "))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Leading integer of a literal ("1992" or "1992?" → 1992), the way the
/// original date fields were parsed.
pub fn leading_year(literal: &str) -> Option<i64> {
    let trimmed = literal.trim_start();
    let (sign, digits_from) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed),
    };
    let digits: String = digits_from.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_sort_strips_punctuation_and_lowercases() {
        assert_eq!(title_sort_transform("HeLlO, wOrLd!"), "hello world");
    }

    #[test]
    fn title_sort_folds_accents() {
        assert_eq!(title_sort_transform("Débuts de l'été"), "debuts de lete");
    }

    #[test]
    fn title_sort_strips_leading_punctuation() {
        assert_eq!(title_sort_transform("\"The\" quoted title"), "the quoted title");
        assert_eq!(title_sort_transform("...ellipsis first"), "ellipsis first");
    }

    #[test]
    fn title_sort_collapses_whitespace() {
        assert_eq!(title_sort_transform("a  b\t\tc"), "a b c");
    }

    #[test]
    fn title_sort_truncates_to_eighty() {
        let long = "x".repeat(200);
        assert_eq!(title_sort_transform(&long).len(), 80);
    }

    #[test]
    fn name_sort_keeps_punctuation() {
        assert_eq!(name_sort_transform("Tolkien, J. R. R."), "tolkien, j. r. r.");
    }

    #[test]
    fn exploded_subjects_emit_every_prefix() {
        assert_eq!(
            exploded_subject_literals("Arabian Peninsula -- Religion -- Ancient History."),
            vec![
                "Arabian Peninsula",
                "Arabian Peninsula -- Religion",
                "Arabian Peninsula -- Religion -- Ancient History",
            ]
        );
    }

    #[test]
    fn exploded_subjects_single_level() {
        assert_eq!(
            exploded_subject_literals("Arabian Peninsula."),
            vec!["Arabian Peninsula"]
        );
    }

    #[test]
    fn exploded_subjects_strip_one_trailing_period_only() {
        assert_eq!(exploded_subject_literals("Etc.."), vec!["Etc."]);
    }

    #[test]
    fn leading_year_parses_prefixes() {
        assert_eq!(leading_year("1992"), Some(1992));
        assert_eq!(leading_year("1992?"), Some(1992));
        assert_eq!(leading_year("-500"), Some(-500));
        assert_eq!(leading_year("uuuu"), None);
        assert_eq!(leading_year(""), None);
    }
}
