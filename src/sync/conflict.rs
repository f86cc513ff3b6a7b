//! Classifying a target's existing reverse relation

use super::traits::LinkResolver;
use crate::document::{DocumentId, PropertyValue};
use crate::link::parse_link_reference;

/// What a target's `superseded_by` currently says relative to a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReverseState {
    /// No usable reverse link: unset, not a link, or dangling.
    Absent,
    /// Already points at the source.
    MatchesSource,
    /// Points at some other existing document.
    ConflictsWith(DocumentId),
}

/// Classify `superseded_by` on `target` against the would-be `source`.
///
/// The existing link is resolved relative to the target. A link that no
/// longer resolves does not block an update.
pub async fn check_reverse_state(
    resolver: &dyn LinkResolver,
    target: &DocumentId,
    superseded_by: Option<&PropertyValue>,
    source: &DocumentId,
) -> ReverseState {
    let Some(link) = superseded_by.and_then(parse_link_reference) else {
        return ReverseState::Absent;
    };

    match resolver.resolve(link.as_str(), target).await {
        None => {
            tracing::debug!(%target, link = %link, "existing superseded_by is dangling");
            ReverseState::Absent
        }
        Some(existing) if existing == *source => ReverseState::MatchesSource,
        Some(existing) => ReverseState::ConflictsWith(existing),
    }
}
