//! Supersession synchronization engine
//!
//! When a document declares `supersedes: "[[Other]]"`, the engine makes sure
//! `Other` carries the matching reverse relation:
//!
//! ```text
//! ---
//! superseded_by: "[[Source]]"
//! status: superseded
//! ---
//! ```
//!
//! # Components
//!
//! - **conflict**: classifies a target's existing `superseded_by`
//! - **orchestrator**: the per-trigger state machine that parses, resolves,
//!   checks, asks and writes
//! - **traits**: capabilities injected by the host (links, storage,
//!   notifications, confirmation)
//!
//! An existing reverse relation naming a different document is never
//! overwritten, and re-running against a consistent pair writes nothing.

mod conflict;
mod orchestrator;
mod signal;
mod traits;

pub use conflict::{check_reverse_state, ReverseState};
pub use orchestrator::{SkipReason, SyncError, SyncOrchestrator, SyncOutcome, SyncResult, SyncState};
pub use signal::SyncSignal;
pub use traits::{
    AlwaysConfirm, Confirmation, ConfirmationPrompt, DocumentStore, LinkResolver, Notifier,
    StoreError, TracingNotifier,
};

/// Forward relation, read from the source.
pub const SUPERSEDES: &str = "supersedes";
/// Reverse relation, written to the target.
pub const SUPERSEDED_BY: &str = "superseded_by";
/// Status key set alongside the reverse relation.
pub const STATUS: &str = "status";
/// Value written to [`STATUS`].
pub const STATUS_SUPERSEDED: &str = "superseded";
