//! Menu label shortening

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Label display rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelRules {
    /// Longest label shown without cutting, in characters
    pub max_len: usize,
    /// Appended to a cut label
    pub ellipsis: String,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            max_len: 30,
            ellipsis: "...".into(),
        }
    }
}

impl LabelRules {
    pub fn apply<'a>(&self, label: &'a str) -> Cow<'a, str> {
        truncate(label, self.max_len, &self.ellipsis)
    }
}

/// Cut `label` to `max_len` characters and append `ellipsis` when it was longer.
///
/// Counts Unicode scalar values, not bytes, and ignores word boundaries.
/// Labels that fit (the empty label included) are borrowed unchanged.
pub fn truncate<'a>(label: &'a str, max_len: usize, ellipsis: &str) -> Cow<'a, str> {
    match label.char_indices().nth(max_len) {
        None => Cow::Borrowed(label),
        Some((cut, _)) => {
            let mut short = String::with_capacity(cut + ellipsis.len());
            short.push_str(&label[..cut]);
            short.push_str(ellipsis);
            Cow::Owned(short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("About", "About")]
    #[case("exactly thirty characters long", "exactly thirty characters long")]
    #[case(
        "A very very very long project title",
        "A very very very long project ..."
    )]
    fn given_label_when_truncating_then_matches(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(truncate(input, 30, "..."), expected);
    }

    #[test]
    fn given_long_label_when_truncating_then_length_is_max_plus_ellipsis() {
        let long = "x".repeat(31);
        let short = truncate(&long, 30, "...");
        assert_eq!(short.chars().count(), 33);
        assert!(short.starts_with(&long[..30]));
    }

    #[test]
    fn given_fitting_label_when_truncating_then_borrowed() {
        assert!(matches!(truncate("short", 30, "..."), Cow::Borrowed("short")));
    }

    #[test]
    fn given_multibyte_label_when_truncating_then_cuts_on_char_boundary() {
        let label = "é".repeat(35);
        let short = truncate(&label, 30, "...");
        assert_eq!(short.chars().count(), 33);
        assert_eq!(&short[short.len() - 3..], "...");
    }
}
