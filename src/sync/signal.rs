//! Messages shown to the user

use crate::document::DocumentId;
use crate::link::LinkReference;
use std::fmt;

/// A user-facing notification emitted by an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSignal {
    /// The forward link did not resolve to any document.
    TargetNotFound { source: DocumentId, link: LinkReference },
    /// The target already names a different document in `superseded_by`.
    ConflictDetected {
        target: DocumentId,
        existing: DocumentId,
        source: DocumentId,
    },
    /// The target was marked as superseded.
    UpdateApplied { target: DocumentId, source: DocumentId },
    /// Asking whether to mark the target as superseded.
    ConfirmationPrompt { target: DocumentId, source: DocumentId },
}

impl fmt::Display for SyncSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound { source, link } => write!(
                f,
                "Superseded note not found: \"{}\" (linked from \"{}\")",
                link,
                source.basename()
            ),
            Self::ConflictDetected { target, existing, .. } => write!(
                f,
                "\"{}\" is already superseded by \"{}\"; not updating",
                target.basename(),
                existing.basename()
            ),
            Self::UpdateApplied { target, source } => write!(
                f,
                "Marked \"{}\" as superseded by \"{}\"",
                target.basename(),
                source.basename()
            ),
            Self::ConfirmationPrompt { target, source } => write!(
                f,
                "Mark \"{}\" as superseded by \"{}\"?",
                target.basename(),
                source.basename()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyValue;
    use crate::link::parse_link_reference;

    #[test]
    fn messages_name_both_documents() {
        let conflict = SyncSignal::ConflictDetected {
            target: DocumentId::new("notes/B.md"),
            existing: DocumentId::new("C.md"),
            source: DocumentId::new("A.md"),
        };
        assert_eq!(conflict.to_string(), "\"B\" is already superseded by \"C\"; not updating");

        let applied = SyncSignal::UpdateApplied {
            target: DocumentId::new("B.md"),
            source: DocumentId::new("A.md"),
        };
        assert_eq!(applied.to_string(), "Marked \"B\" as superseded by \"A\"");

        let missing = SyncSignal::TargetNotFound {
            source: DocumentId::new("notes/A.md"),
            link: parse_link_reference(&PropertyValue::String("[[Gone]]".into())).unwrap(),
        };
        assert_eq!(
            missing.to_string(),
            "Superseded note not found: \"Gone\" (linked from \"A\")"
        );
    }
}
