//! Supersede: bidirectional supersession links for markdown knowledge bases
//!
//! When a note declares that it replaces another, the replaced note should
//! say so too. This crate keeps the pair consistent:
//!
//! ```text
//! A.md                        B.md
//! ---                         ---
//! supersedes: "[[B]]"   ==>   superseded_by: "[[A]]"
//! ---                         status: superseded
//!                             ---
//! ```
//!
//! # Core Concepts
//!
//! - **Documents**: identified by vault-relative path, with an ordered
//!   frontmatter block ([`document`])
//! - **Link references**: the first `[[...]]` span of a property ([`link`])
//! - **Synchronization**: a per-trigger state machine that resolves the
//!   target, refuses to overwrite a different supersessor, and performs a
//!   minimal frontmatter edit ([`sync`])
//! - **Vaults**: bundled stores over memory or a directory ([`vault`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use supersede::{DocumentId, MemoryVault, SyncOrchestrator, TracingNotifier};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let vault = Arc::new(MemoryVault::with_documents([
//!     ("A.md", "---\nsupersedes: \"[[B]]\"\n---\n"),
//!     ("B.md", "# B\n"),
//! ]));
//! let sync = SyncOrchestrator::for_vault(vault.clone(), Arc::new(TracingNotifier));
//!
//! let outcome = sync.handle_change(&DocumentId::new("A.md")).await.unwrap();
//! assert!(outcome.is_applied());
//! assert!(vault.content(&DocumentId::new("B.md")).unwrap().starts_with("---\nsuperseded_by"));
//! # });
//! ```

pub mod document;
pub mod link;
pub mod settings;
pub mod sync;
pub mod vault;

pub use document::{DocumentId, Properties, PropertyValue};
pub use link::{parse_link_reference, LinkReference};
pub use settings::{SettingsError, SettingsSource, SharedSettings, SyncSettings};
pub use sync::{
    Confirmation, ConfirmationPrompt, DocumentStore, LinkResolver, Notifier, ReverseState,
    SkipReason, StoreError, SyncError, SyncOrchestrator, SyncOutcome, SyncSignal, TracingNotifier,
};
pub use vault::{FsVault, MemoryVault};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
