//! Wikilink resolution against a set of documents
//!
//! Rules, in order:
//! - `|alias` and `#heading` / `#^block` suffixes are dropped; a link that
//!   is only a suffix points at the linking document itself
//! - names are tried as written and with `.md` appended
//! - links containing `/` match relative to the linking document's folder,
//!   then from the vault root, then as a path suffix
//! - bare names match any document with that file name; ties prefer the
//!   linking document's folder, then the shortest path, then lexical order
//!
//! All comparisons are case-insensitive.

use crate::document::DocumentId;

/// Resolve `link` as written in `from` against `candidates`.
pub fn resolve_linkpath<'a, I>(link: &str, from: &DocumentId, candidates: I) -> Option<DocumentId>
where
    I: IntoIterator<Item = &'a DocumentId>,
{
    let candidates: Vec<&DocumentId> = candidates.into_iter().collect();
    let path = strip_subpath(link);

    if path.is_empty() {
        return candidates.into_iter().find(|c| *c == from).cloned();
    }

    let names = [path.to_lowercase(), format!("{}.md", path.to_lowercase())];

    if path.contains('/') {
        let relative = join_relative(from.folder(), path).map(|p| p.to_lowercase());
        if let Some(relative) = relative {
            let with_ext = format!("{}.md", relative);
            if let Some(found) = find_exact(&candidates, &[relative, with_ext]) {
                return Some(found);
            }
        }

        let rooted: Vec<String> = names
            .iter()
            .map(|n| n.trim_start_matches('/').to_string())
            .collect();
        if let Some(found) = find_exact(&candidates, &rooted) {
            return Some(found);
        }

        let suffixes: Vec<String> = rooted.iter().map(|n| format!("/{}", n)).collect();
        return best_match(&candidates, from, |c| {
            let lower = c.as_str().to_lowercase();
            suffixes.iter().any(|s| lower.ends_with(s.as_str()))
        });
    }

    best_match(&candidates, from, |c| {
        let lower = c.file_name().to_lowercase();
        names.iter().any(|n| *n == lower)
    })
}

/// Drop alias and heading/block suffixes.
fn strip_subpath(link: &str) -> &str {
    let end = link.find(['|', '#']).unwrap_or(link.len());
    link[..end].trim()
}

/// Join a link onto a folder, folding `.` and `..`. `None` if it climbs
/// above the vault root.
fn join_relative(folder: &str, link: &str) -> Option<String> {
    let mut parts: Vec<&str> = folder.split('/').filter(|p| !p.is_empty()).collect();
    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

fn find_exact(candidates: &[&DocumentId], wanted: &[String]) -> Option<DocumentId> {
    candidates
        .iter()
        .find(|c| {
            let lower = c.as_str().to_lowercase();
            wanted.iter().any(|w| *w == lower)
        })
        .map(|c| (*c).clone())
}

fn best_match<F>(candidates: &[&DocumentId], from: &DocumentId, matches: F) -> Option<DocumentId>
where
    F: Fn(&DocumentId) -> bool,
{
    candidates
        .iter()
        .filter(|c| matches(c))
        .min_by(|a, b| {
            let a_near = a.folder() != from.folder();
            let b_near = b.folder() != from.folder();
            a_near
                .cmp(&b_near)
                .then(a.as_str().len().cmp(&b.as_str().len()))
                .then(a.as_str().cmp(b.as_str()))
        })
        .map(|c| (*c).clone())
}
