//! Capabilities the host provides to the synchronization engine
//!
//! The engine owns no documents and no UI. Link resolution, document
//! storage, notifications and confirmation dialogs are injected through
//! these traits, so the same evaluation runs against a live vault, a
//! directory on disk, or an in-memory fixture.

use super::signal::SyncSignal;
use crate::document::{DocumentId, Properties};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from reading or writing documents.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),
}

/// Turns link text into a document identity.
///
/// How paths, case, aliases and ambiguity are handled is entirely up to
/// the implementation.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Resolve `link` as written inside `from`. `None` means no document
    /// matches.
    async fn resolve(&self, link: &str, from: &DocumentId) -> Option<DocumentId>;
}

/// Read and write access to documents.
///
/// Every call must reflect the current stored state; the engine never
/// caches what it reads across evaluations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Parsed frontmatter of a document.
    async fn read_metadata(&self, id: &DocumentId) -> Result<Properties, StoreError>;

    /// Full raw text of a document.
    async fn read_content(&self, id: &DocumentId) -> Result<String, StoreError>;

    /// Replace a document's full text.
    async fn write_content(&self, id: &DocumentId, content: String) -> Result<(), StoreError>;
}

/// User-facing notification surface. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, signal: &SyncSignal);
}

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
    /// Closed without answering
    Dismissed,
}

/// Asks the user whether to mark `target` as superseded by `source`.
///
/// The evaluation is suspended until the returned future completes.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, signal: &SyncSignal) -> Confirmation;
}

/// Prompt used when the host has none: every request is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmationPrompt for AlwaysConfirm {
    async fn confirm(&self, _signal: &SyncSignal) -> Confirmation {
        Confirmation::Accepted
    }
}

/// Notifier that writes signals to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, signal: &SyncSignal) {
        match signal {
            SyncSignal::TargetNotFound { .. } | SyncSignal::ConflictDetected { .. } => {
                tracing::warn!("{}", signal)
            }
            _ => tracing::info!("{}", signal),
        }
    }
}
