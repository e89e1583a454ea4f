use std::{borrow::Cow, sync::OnceLock};

use regex::{Regex, RegexBuilder};

use super::Error;

/// Collapses whitespace runs (including `&nbsp;`) into a single space and trims.
pub fn collapse_whitespace(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    // a run of two or more, or any single whitespace char that isn't a plain space
    let re = RE.get_or_init(|| Regex::new(r"\s{2,}|[^\S ]").expect("regex should be valid"));
    match re.replace_all(s.trim(), " ") {
        Cow::Borrowed(x) => Cow::Borrowed(x.trim()),
        Cow::Owned(x) => Cow::Owned(x.trim().to_string()),
    }
}

/// Case-insensitive alternation of literal markers. `None` when `markers` is empty.
pub fn marker_regex(markers: &[String]) -> Result<Option<Regex>, Error> {
    if markers.is_empty() {
        return Ok(None);
    }
    let pattern = markers
        .iter()
        .map(|x| regex::escape(x))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| Error::Internal(format!("invalid marker pattern {pattern:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Idli"), "Idli");
        assert_eq!(collapse_whitespace("  Veg \n  Pulao\t"), "Veg Pulao");
        assert_eq!(collapse_whitespace("Aloo\u{a0}Paratha"), "Aloo Paratha");
        assert_eq!(collapse_whitespace("\u{a0}"), "");
        assert!(matches!(collapse_whitespace("Dal Makhani"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_marker_regex() {
        let re = marker_regex(&["OUR SITEMAP".into(), "Menu is subject".into()])
            .unwrap()
            .unwrap();
        assert!(re.is_match("... our sitemap ..."));
        assert!(re.is_match("MENU IS SUBJECT to change"));
        assert!(!re.is_match("Menu from 1st to 5th"));
        assert!(marker_regex(&[]).unwrap().is_none());
        // metacharacters are literal
        let re = marker_regex(&["(c)".into()]).unwrap().unwrap();
        assert!(re.is_match("(C) 2024"));
        assert!(!re.is_match("c"));
    }
}
