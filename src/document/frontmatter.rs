//! Frontmatter reading and merging
//!
//! Frontmatter is the block at the very start of a document delimited by
//! lines consisting solely of `---`:
//!
//! ```text
//! ---
//! title: Plan B
//! supersedes: "[[Plan A]]"
//! ---
//! Body text...
//! ```
//!
//! Reading parses the block as YAML. Merging is a line-level text edit so
//! that everything the merge does not touch survives byte for byte.

use super::property::Properties;
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("invalid frontmatter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Location of a frontmatter block inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// Lines between the delimiters, each with its line ending.
    pub body: &'a str,
    /// Byte offset where `body` starts (just after the opening delimiter line).
    pub body_start: usize,
    /// Byte offset of the closing delimiter line.
    pub close_start: usize,
    /// Line ending used by the opening delimiter.
    pub newline: &'static str,
}

/// Locate the leading frontmatter block, if the document has one.
///
/// The opening `---` must be the first line. The block ends at the next
/// line that is exactly `---`; without one there is no block.
pub fn split_frontmatter(content: &str) -> Option<Frontmatter<'_>> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if !first.ends_with('\n') || strip_eol(first).0 != DELIMITER {
        return None;
    }
    let newline = if first.ends_with("\r\n") { "\r\n" } else { "\n" };

    let body_start = first.len();
    let mut offset = body_start;
    for line in lines {
        if strip_eol(line).0 == DELIMITER {
            return Some(Frontmatter {
                body: &content[body_start..offset],
                body_start,
                close_start: offset,
                newline,
            });
        }
        offset += line.len();
    }
    None
}

/// Parse the frontmatter block into ordered properties.
///
/// A document without a block, or whose block is empty or not a mapping,
/// has no properties.
pub fn parse_properties(content: &str) -> Result<Properties, FrontmatterError> {
    let Some(block) = split_frontmatter(content) else {
        return Ok(Properties::new());
    };
    if block.body.trim().is_empty() {
        return Ok(Properties::new());
    }

    match serde_yaml::from_str::<serde_yaml::Value>(block.body)? {
        serde_yaml::Value::Mapping(mapping) => Ok(Properties::from_yaml_mapping(mapping)),
        _ => Ok(Properties::new()),
    }
}

/// Set frontmatter keys to already-serialized values.
///
/// Each `(key, value)` becomes a `key: value` line. Existing top-level lines
/// for a key are replaced where they stand (along with any indented or
/// list-item continuation lines that belonged to the old value); keys not
/// present are appended at the end of the block in the order given. All
/// other bytes of the document are left untouched. Without a block, a new
/// one holding exactly the given keys is placed before the content.
///
/// Pure: the output depends only on the arguments.
pub fn merge_frontmatter(content: &str, assignments: &[(&str, &str)]) -> String {
    let Some(block) = split_frontmatter(content) else {
        let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let mut out = String::with_capacity(content.len() + 64);
        out.push_str(DELIMITER);
        out.push_str(newline);
        for (key, value) in assignments {
            push_assignment(&mut out, key, value, newline);
        }
        out.push_str(DELIMITER);
        out.push_str(newline);
        out.push_str(content);
        return out;
    };

    let mut out = String::with_capacity(content.len() + 64);
    out.push_str(&content[..block.body_start]);

    let mut matched = vec![false; assignments.len()];
    let mut replacing = false;
    // Blank lines seen while replacing. They belong to the old value only if
    // another continuation line follows them.
    let mut pending_blank = String::new();
    for line in block.body.split_inclusive('\n') {
        let (text, eol) = strip_eol(line);

        if replacing {
            if text.trim().is_empty() {
                pending_blank.push_str(line);
                continue;
            }
            if is_continuation(text) {
                pending_blank.clear();
                continue;
            }
            out.push_str(&pending_blank);
            pending_blank.clear();
        }
        replacing = false;

        match line_key(text).and_then(|key| assignments.iter().position(|(k, _)| *k == key)) {
            Some(idx) => {
                let (key, value) = assignments[idx];
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push_str(eol);
                matched[idx] = true;
                replacing = true;
            }
            None => out.push_str(line),
        }
    }
    out.push_str(&pending_blank);

    for ((key, value), done) in assignments.iter().zip(&matched) {
        if !done {
            push_assignment(&mut out, key, value, block.newline);
        }
    }

    out.push_str(&content[block.close_start..]);
    out
}

fn push_assignment(out: &mut String, key: &str, value: &str, newline: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push_str(newline);
}

/// Split a line into its text and its line ending.
fn strip_eol(line: &str) -> (&str, &str) {
    if let Some(text) = line.strip_suffix("\r\n") {
        (text, "\r\n")
    } else if let Some(text) = line.strip_suffix('\n') {
        (text, "\n")
    } else {
        (line, "")
    }
}

/// Key of a top-level `key: value` line, with one pair of surrounding
/// quotes removed. Indented, comment and list lines have none.
fn line_key(text: &str) -> Option<&str> {
    if text.starts_with(char::is_whitespace) || text.starts_with('#') || text.starts_with('-') {
        return None;
    }
    let colon = text.find(':')?;
    let key = unquote(text[..colon].trim());
    (!key.is_empty()).then_some(key)
}

fn unquote(key: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = key.strip_prefix(quote).and_then(|k| k.strip_suffix(quote)) {
            return inner;
        }
    }
    key
}

/// Lines that continue the previous key's value: indented lines and
/// bare list items, including empty ones.
fn is_continuation(text: &str) -> bool {
    !text.trim().is_empty()
        && (text.starts_with(char::is_whitespace) || text == "-" || text.starts_with("- "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyValue;

    const REVERSE: &[(&str, &str)] = &[("superseded_by", "\"[[A]]\""), ("status", "superseded")];

    #[test]
    fn test_split_frontmatter() {
        let content = "---\ntitle: B\n---\nbody\n";
        let block = split_frontmatter(content).unwrap();
        assert_eq!(block.body, "title: B\n");
        assert_eq!(&content[block.close_start..], "---\nbody\n");
        assert_eq!(block.newline, "\n");
    }

    #[test]
    fn test_split_requires_leading_delimiter() {
        assert!(split_frontmatter("\n---\ntitle: B\n---\n").is_none());
        assert!(split_frontmatter("# Heading\n---\n").is_none());
        assert!(split_frontmatter("---\ntitle: unterminated\n").is_none());
        assert!(split_frontmatter("---").is_none());
    }

    #[test]
    fn test_split_empty_block() {
        let block = split_frontmatter("---\n---\nbody").unwrap();
        assert_eq!(block.body, "");
    }

    #[test]
    fn test_parse_properties() {
        let content = "---\nsupersedes: \"[[A]]\"\ntags: [x, y]\ndraft: false\n---\n# B\n";
        let props = parse_properties(content).unwrap();

        assert_eq!(props.get("supersedes").and_then(|v| v.as_str()), Some("[[A]]"));
        assert_eq!(props.get("draft"), Some(&PropertyValue::Bool(false)));
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["supersedes", "tags", "draft"]);
    }

    #[test]
    fn test_parse_unquoted_link_is_not_a_string() {
        // YAML reads an unquoted [[A]] as a nested list
        let props = parse_properties("---\nsupersedes: [[A]]\n---\n").unwrap();
        assert!(matches!(props.get("supersedes"), Some(PropertyValue::List(_))));
    }

    #[test]
    fn test_parse_without_block() {
        assert!(parse_properties("just text").unwrap().is_empty());
        assert!(parse_properties("---\n---\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_yaml() {
        assert!(parse_properties("---\nkey: [unclosed\n---\n").is_err());
    }

    #[test]
    fn test_merge_synthesizes_block() {
        let merged = merge_frontmatter("# B\n\nBody.\n", REVERSE);
        assert_eq!(merged, "---\nsuperseded_by: \"[[A]]\"\nstatus: superseded\n---\n# B\n\nBody.\n");
    }

    #[test]
    fn test_merge_synthesizes_block_for_empty_document() {
        let merged = merge_frontmatter("", REVERSE);
        assert_eq!(merged, "---\nsuperseded_by: \"[[A]]\"\nstatus: superseded\n---\n");
    }

    #[test]
    fn test_merge_replaces_in_place_and_appends() {
        let content = "---\ntitle: B\nstatus: active\ntags: [x]\n---\nBody\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(
            merged,
            "---\ntitle: B\nstatus: superseded\ntags: [x]\nsuperseded_by: \"[[A]]\"\n---\nBody\n"
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let content = "---\ntitle: B\n---\nBody\n";
        let once = merge_frontmatter(content, REVERSE);
        let twice = merge_frontmatter(&once, REVERSE);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_into_empty_block() {
        let merged = merge_frontmatter("---\n---\nBody", REVERSE);
        assert_eq!(merged, "---\nsuperseded_by: \"[[A]]\"\nstatus: superseded\n---\nBody");
    }

    #[test]
    fn test_merge_drops_continuation_of_replaced_value() {
        let content = "---\nsuperseded_by:\n  - \"[[Old]]\"\ntitle: B\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(merged, "---\nsuperseded_by: \"[[A]]\"\ntitle: B\nstatus: superseded\n---\n");
    }

    #[test]
    fn test_merge_drops_block_scalar_with_blank_line() {
        let content = "---\nstatus: |\n  line1\n\n  line2\ntitle: B\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(merged, "---\nstatus: superseded\ntitle: B\nsuperseded_by: \"[[A]]\"\n---\n");

        let props = parse_properties(&merged).unwrap();
        assert_eq!(props.get("status").and_then(|v| v.as_str()), Some("superseded"));
    }

    #[test]
    fn test_merge_keeps_blank_line_after_replaced_value() {
        let content = "---\nstatus: active\n\ntitle: B\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(merged, "---\nstatus: superseded\n\ntitle: B\nsuperseded_by: \"[[A]]\"\n---\n");
    }

    #[test]
    fn test_merge_keeps_trailing_blank_line() {
        let content = "---\ntitle: B\nstatus: active\n\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(merged, "---\ntitle: B\nstatus: superseded\n\nsuperseded_by: \"[[A]]\"\n---\n");
    }

    #[test]
    fn test_merge_matches_quoted_keys() {
        let content = "---\n\"superseded_by\": \"[[Gone]]\"\n'status': draft\ntitle: B\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(merged, "---\nsuperseded_by: \"[[A]]\"\nstatus: superseded\ntitle: B\n---\n");

        let props = parse_properties(&merged).unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["superseded_by", "status", "title"]);
    }

    #[test]
    fn test_merge_drops_empty_list_items() {
        let content = "---\nsuperseded_by:\n-\n- \"[[Old]]\"\ntitle: B\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(merged, "---\nsuperseded_by: \"[[A]]\"\ntitle: B\nstatus: superseded\n---\n");
    }

    #[test]
    fn test_merge_ignores_nested_keys() {
        let content = "---\nreview:\n  status: done\n---\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(
            merged,
            "---\nreview:\n  status: done\nsuperseded_by: \"[[A]]\"\nstatus: superseded\n---\n"
        );
    }

    #[test]
    fn test_merge_keeps_crlf() {
        let content = "---\r\ntitle: B\r\nstatus: active\r\n---\r\nBody\r\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert_eq!(
            merged,
            "---\r\ntitle: B\r\nstatus: superseded\r\nsuperseded_by: \"[[A]]\"\r\n---\r\nBody\r\n"
        );
    }

    #[test]
    fn test_merge_leaves_body_delimiters_alone() {
        let content = "---\ntitle: B\n---\nintro\n---\nstatus: not frontmatter\n";
        let merged = merge_frontmatter(content, REVERSE);
        assert!(merged.ends_with("---\nintro\n---\nstatus: not frontmatter\n"));
        assert!(merged.starts_with("---\ntitle: B\nsuperseded_by: \"[[A]]\"\nstatus: superseded\n---\n"));
    }
}
