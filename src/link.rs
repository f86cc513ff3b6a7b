//! Link references inside property values
//!
//! Relation properties hold a wikilink as a string, e.g.
//! `supersedes: "[[Plan A]]"`. Only the first `[[...]]` span is read.

use crate::document::PropertyValue;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());

/// Link text found between double brackets, trimmed.
///
/// Alias (`|...`) and heading/block (`#...`) suffixes are kept; what they
/// mean is up to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkReference(String);

impl LinkReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the first wikilink target from a property value.
///
/// Returns `None` for non-string values, strings without a `[[...]]` span,
/// and spans that are blank once trimmed.
pub fn parse_link_reference(value: &PropertyValue) -> Option<LinkReference> {
    let text = value.as_str()?;
    let captures = WIKILINK_RE.captures(text)?;
    let inner = captures.get(1)?.as_str().trim();
    (!inner.is_empty()).then(|| LinkReference(inner.to_string()))
}

/// Serialized frontmatter value for a link to `name`: a double-quoted
/// wikilink, so YAML reads it back as a string.
pub fn wikilink_value(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"[[{}]]\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Option<String> {
        parse_link_reference(&PropertyValue::from(s)).map(|l| l.as_str().to_string())
    }

    #[test]
    fn extracts_simple_link() {
        assert_eq!(parse("[[Plan A]]").as_deref(), Some("Plan A"));
    }

    #[test]
    fn trims_whitespace_inside_brackets() {
        assert_eq!(parse("[[  Plan A ]]").as_deref(), Some("Plan A"));
    }

    #[test]
    fn only_first_span_is_honored() {
        assert_eq!(parse("[[One]] and [[Two]]").as_deref(), Some("One"));
    }

    #[test]
    fn surrounding_text_is_ignored() {
        assert_eq!(parse("see [[Target]] instead").as_deref(), Some("Target"));
    }

    #[test]
    fn alias_and_heading_pass_through() {
        assert_eq!(parse("[[Note#Section|Shown]]").as_deref(), Some("Note#Section|Shown"));
    }

    #[test]
    fn plain_text_has_no_link() {
        assert_eq!(parse("Plan A"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("[single]"), None);
    }

    #[test]
    fn blank_brackets_have_no_link() {
        assert_eq!(parse("[[]]"), None);
        assert_eq!(parse("[[   ]]"), None);
    }

    #[test]
    fn non_string_values_have_no_link() {
        assert!(parse_link_reference(&PropertyValue::Bool(true)).is_none());
        assert!(parse_link_reference(&PropertyValue::Number(3.0)).is_none());
        assert!(parse_link_reference(&PropertyValue::Null).is_none());
        let list = PropertyValue::List(vec![PropertyValue::from("[[A]]")]);
        assert!(parse_link_reference(&list).is_none());
    }

    #[test]
    fn wikilink_value_is_quoted() {
        assert_eq!(wikilink_value("A"), "\"[[A]]\"");
        assert_eq!(wikilink_value("Say \"hi\""), "\"[[Say \\\"hi\\\"]]\"");
    }
}
