//! Step template tokenizer.
//!
//! Placeholders are `<name>`, `'string'`, `"string"` and `[literal]`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker every placeholder normalizes to.
pub const WILDCARD: &str = "{*}";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([^<>]*)>|'([^']*)'|"([^"]*)"|\[([^\[\]]*)\]"#)
        .expect("placeholder pattern is valid")
});

/// A placeholder token found in step text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    /// `<name>`: looked up in the example row.
    Named(String),
    /// `'x'` or `"x"`: a string literal.
    Str(String),
    /// `[x]`: a boolean, null or numeric literal.
    Literal(String),
}

/// Literal text or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Placeholder(Placeholder),
}

/// Replace every placeholder with [`WILDCARD`].
pub fn normalize(text: &str) -> String {
    PLACEHOLDER.replace_all(text, WILDCARD).into_owned()
}

/// Split step text into literal segments and placeholders.
pub fn parse(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Text(text[last..whole.start()].to_string()));
        }
        let placeholder = if let Some(m) = caps.get(1) {
            Placeholder::Named(m.as_str().to_string())
        } else if let Some(m) = caps.get(2).or_else(|| caps.get(3)) {
            Placeholder::Str(m.as_str().to_string())
        } else {
            let raw = caps.get(4).map(|m| m.as_str()).unwrap_or_default();
            Placeholder::Literal(raw.to_string())
        };
        segments.push(Segment::Placeholder(placeholder));
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}

/// Number of placeholders in parsed segments.
pub(crate) fn placeholder_count(segments: &[Segment]) -> usize {
    segments
        .iter()
        .filter(|s| matches!(s, Segment::Placeholder(_)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_all_placeholder_kinds() {
        assert_eq!(normalize("I have <count> apples"), "I have {*} apples");
        assert_eq!(normalize("I say 'hi'"), "I say {*}");
        assert_eq!(normalize("I say \"hi\""), "I say {*}");
        assert_eq!(normalize("it is [true]"), "it is {*}");
        assert_eq!(normalize("no placeholders"), "no placeholders");
    }

    #[test]
    fn test_normalize_names_do_not_matter() {
        assert_eq!(normalize("add <a> to <b>"), normalize("add <x> to 'y'"));
    }

    #[test]
    fn test_normalize_literal_text_matters() {
        assert_ne!(normalize("add <a> to <b>"), normalize("remove <a> from <b>"));
    }

    #[test]
    fn test_parse_segments() {
        let segments = parse("I add <count> \"items\" at [3]");
        assert_eq!(
            segments,
            vec![
                Segment::Text("I add ".to_string()),
                Segment::Placeholder(Placeholder::Named("count".to_string())),
                Segment::Text(" ".to_string()),
                Segment::Placeholder(Placeholder::Str("items".to_string())),
                Segment::Text(" at ".to_string()),
                Segment::Placeholder(Placeholder::Literal("3".to_string())),
            ]
        );
        assert_eq!(placeholder_count(&segments), 3);
    }

    #[test]
    fn test_parse_empty_string_literal() {
        let segments = parse("I type ''");
        assert_eq!(
            segments[1],
            Segment::Placeholder(Placeholder::Str(String::new()))
        );
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse("plain"), vec![Segment::Text("plain".to_string())]);
        assert!(parse("").is_empty());
    }
}
