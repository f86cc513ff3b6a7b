//! SyncOrchestrator: reacts to a change in a document's forward relation
//!
//! Each trigger is evaluated from scratch:
//!
//! ```text
//! Idle → Triggered → Parsing → Resolving → CheckingConflict
//!      → { Skip | Blocked | AwaitingConfirmation | Applying } → Idle
//! ```
//!
//! Nothing is carried between evaluations except the per-target locks that
//! serialize the final read-check-write on a target document.

use super::conflict::{check_reverse_state, ReverseState};
use super::signal::SyncSignal;
use super::traits::{
    AlwaysConfirm, Confirmation, ConfirmationPrompt, DocumentStore, LinkResolver, Notifier,
    StoreError,
};
use super::{STATUS, STATUS_SUPERSEDED, SUPERSEDED_BY, SUPERSEDES};
use crate::document::{merge_frontmatter, DocumentId};
use crate::link::{parse_link_reference, wikilink_value, LinkReference};
use crate::settings::{SettingsSource, SyncSettings};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that abort an evaluation.
///
/// Missing links, unresolved targets, conflicts and declined prompts are
/// ordinary outcomes, not errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Evaluation task failed: {0}")]
    Task(String),
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Evaluation stages, reported through `tracing` as they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Triggered,
    Parsing,
    Resolving,
    CheckingConflict,
    Skip,
    Blocked,
    AwaitingConfirmation,
    Applying,
}

/// Why an evaluation ended without writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source has no `supersedes` link.
    NoForwardLink,
    /// The forward link points back at the source.
    SelfReference,
    /// The target already names the source.
    AlreadyLinked,
}

/// How one evaluation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The kill-switch is off.
    Disabled,
    Skipped(SkipReason),
    /// The forward link resolved to nothing.
    TargetNotFound { link: LinkReference },
    /// The target is already superseded by a different document.
    Blocked {
        target: DocumentId,
        existing: DocumentId,
    },
    /// The user declined or dismissed the confirmation prompt.
    Declined {
        target: DocumentId,
        answer: Confirmation,
    },
    /// The target was rewritten.
    Applied { target: DocumentId },
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Skipped(SkipReason::NoForwardLink) => write!(f, "no supersedes link"),
            Self::Skipped(SkipReason::SelfReference) => write!(f, "links to itself"),
            Self::Skipped(SkipReason::AlreadyLinked) => write!(f, "already linked"),
            Self::TargetNotFound { link } => write!(f, "not found: {}", link),
            Self::Blocked { target, existing } => {
                write!(f, "blocked: {} superseded by {}", target, existing)
            }
            Self::Declined { target, .. } => write!(f, "declined: {}", target),
            Self::Applied { target } => write!(f, "updated {}", target),
        }
    }
}

/// Keeps `superseded_by`/`status` on targets in step with `supersedes` on
/// sources.
///
/// The orchestrator only ever writes to the document a forward link points
/// at, never to the document that triggered the evaluation, and only sets
/// the two reverse keys.
pub struct SyncOrchestrator {
    resolver: Arc<dyn LinkResolver>,
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    prompt: Arc<dyn ConfirmationPrompt>,
    settings: Arc<dyn SettingsSource>,
    target_locks: DashMap<DocumentId, Arc<Mutex<()>>>,
}

impl SyncOrchestrator {
    /// Create an orchestrator with default settings and no prompt.
    pub fn new(
        resolver: Arc<dyn LinkResolver>,
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver,
            store,
            notifier,
            prompt: Arc::new(AlwaysConfirm),
            settings: Arc::new(SyncSettings::default()),
            target_locks: DashMap::new(),
        }
    }

    /// Create an orchestrator over a store that also resolves links.
    pub fn for_vault<V>(vault: Arc<V>, notifier: Arc<dyn Notifier>) -> Self
    where
        V: LinkResolver + DocumentStore + 'static,
    {
        Self::new(vault.clone(), vault, notifier)
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_settings(mut self, settings: Arc<dyn SettingsSource>) -> Self {
        self.settings = settings;
        self
    }

    /// Evaluate a change notification for `source`.
    pub async fn handle_change(&self, source: &DocumentId) -> SyncResult<SyncOutcome> {
        let settings = self.settings.settings();
        enter(SyncState::Triggered, source, None);
        if !settings.enabled {
            enter(SyncState::Idle, source, None);
            return Ok(SyncOutcome::Disabled);
        }

        enter(SyncState::Parsing, source, None);
        let metadata = self.store.read_metadata(source).await?;
        let Some(link) = metadata.get(SUPERSEDES).and_then(parse_link_reference) else {
            enter(SyncState::Skip, source, None);
            return Ok(SyncOutcome::Skipped(SkipReason::NoForwardLink));
        };

        enter(SyncState::Resolving, source, None);
        let Some(target) = self.resolver.resolve(link.as_str(), source).await else {
            tracing::warn!(%source, link = %link, "supersedes target not found");
            self.notifier.notify(&SyncSignal::TargetNotFound {
                source: source.clone(),
                link: link.clone(),
            });
            enter(SyncState::Idle, source, None);
            return Ok(SyncOutcome::TargetNotFound { link });
        };
        if target == *source {
            enter(SyncState::Skip, source, Some(&target));
            return Ok(SyncOutcome::Skipped(SkipReason::SelfReference));
        }

        enter(SyncState::CheckingConflict, source, Some(&target));
        if let Some(outcome) = self.check_target(source, &target).await? {
            return Ok(outcome);
        }

        if settings.confirm_before_update {
            enter(SyncState::AwaitingConfirmation, source, Some(&target));
            let question = SyncSignal::ConfirmationPrompt {
                target: target.clone(),
                source: source.clone(),
            };
            match self.prompt.confirm(&question).await {
                Confirmation::Accepted => {}
                answer => {
                    tracing::debug!(%source, %target, ?answer, "update not confirmed");
                    enter(SyncState::Idle, source, Some(&target));
                    return Ok(SyncOutcome::Declined { target, answer });
                }
            }
        }

        enter(SyncState::Applying, source, Some(&target));
        let outcome = self.apply(source, &target).await;
        enter(SyncState::Idle, source, Some(&target));
        outcome
    }

    /// Evaluate several triggers concurrently, one task per source.
    ///
    /// Results come back in the order the sources were given.
    pub async fn handle_changes(
        self: &Arc<Self>,
        sources: Vec<DocumentId>,
    ) -> Vec<(DocumentId, SyncResult<SyncOutcome>)> {
        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let this = Arc::clone(self);
                let id = source.clone();
                (source, tokio::spawn(async move { this.handle_change(&id).await }))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (source, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(SyncError::Task(e.to_string())),
            };
            results.push((source, result));
        }
        results
    }

    /// Read the target's reverse relation and decide whether to stop.
    ///
    /// Returns `None` when the update may proceed.
    async fn check_target(
        &self,
        source: &DocumentId,
        target: &DocumentId,
    ) -> SyncResult<Option<SyncOutcome>> {
        let metadata = self.store.read_metadata(target).await?;
        let state =
            check_reverse_state(self.resolver.as_ref(), target, metadata.get(SUPERSEDED_BY), source)
                .await;

        match state {
            ReverseState::Absent => Ok(None),
            ReverseState::MatchesSource => {
                enter(SyncState::Skip, source, Some(target));
                Ok(Some(SyncOutcome::Skipped(SkipReason::AlreadyLinked)))
            }
            ReverseState::ConflictsWith(existing) => {
                enter(SyncState::Blocked, source, Some(target));
                tracing::warn!(%source, %target, %existing, "target already superseded by another document");
                self.notifier.notify(&SyncSignal::ConflictDetected {
                    target: target.clone(),
                    existing: existing.clone(),
                    source: source.clone(),
                });
                Ok(Some(SyncOutcome::Blocked {
                    target: target.clone(),
                    existing,
                }))
            }
        }
    }

    /// Re-check and write the reverse relation under the target's lock.
    async fn apply(&self, source: &DocumentId, target: &DocumentId) -> SyncResult<SyncOutcome> {
        let lock = self
            .target_locks
            .entry(target.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            self.write_locked(source, target).await
        };

        drop(lock);
        self.target_locks
            .remove_if(target, |_, lock| Arc::strong_count(lock) == 1);
        outcome
    }

    async fn write_locked(&self, source: &DocumentId, target: &DocumentId) -> SyncResult<SyncOutcome> {
        // The target may have changed during the confirmation wait or while
        // another evaluation held the lock.
        if let Some(outcome) = self.check_target(source, target).await? {
            return Ok(outcome);
        }

        let content = self.store.read_content(target).await?;
        let source_link = wikilink_value(source.basename());
        let merged = merge_frontmatter(
            &content,
            &[(SUPERSEDED_BY, source_link.as_str()), (STATUS, STATUS_SUPERSEDED)],
        );
        if merged == content {
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadyLinked));
        }

        self.store.write_content(target, merged).await?;
        tracing::info!(%source, %target, "marked target as superseded");
        self.notifier.notify(&SyncSignal::UpdateApplied {
            target: target.clone(),
            source: source.clone(),
        });
        Ok(SyncOutcome::Applied {
            target: target.clone(),
        })
    }
}

fn enter(state: SyncState, source: &DocumentId, target: Option<&DocumentId>) {
    match target {
        Some(target) => tracing::debug!(?state, %source, %target, "sync state"),
        None => tracing::debug!(?state, %source, "sync state"),
    }
}
