//! Common test utilities for synchronization scenarios
//!
//! Recording notifier, scripted confirmation prompts and vault builders
//! shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use supersede::{
    Confirmation, ConfirmationPrompt, DocumentId, MemoryVault, Notifier, SyncOrchestrator,
    SyncSignal,
};

/// Notifier that keeps every signal for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    signals: Mutex<Vec<SyncSignal>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signals(&self) -> Vec<SyncSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, signal: &SyncSignal) {
        self.signals.lock().unwrap().push(signal.clone());
    }
}

/// Prompt that always gives the same answer and records what it was asked.
pub struct ScriptedPrompt {
    answer: Confirmation,
    asked: Mutex<Vec<SyncSignal>>,
}

impl ScriptedPrompt {
    pub fn answering(answer: Confirmation) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<SyncSignal> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmationPrompt for ScriptedPrompt {
    async fn confirm(&self, signal: &SyncSignal) -> Confirmation {
        self.asked.lock().unwrap().push(signal.clone());
        self.answer
    }
}

pub fn id(path: &str) -> DocumentId {
    DocumentId::new(path)
}

/// A vault plus an orchestrator over it that records its signals.
pub struct Fixture {
    pub vault: Arc<MemoryVault>,
    pub notifier: Arc<RecordingNotifier>,
    pub sync: SyncOrchestrator,
}

impl Fixture {
    pub fn new(documents: &[(&str, &str)]) -> Self {
        let vault = Arc::new(MemoryVault::with_documents(documents.iter().copied()));
        let notifier = RecordingNotifier::new();
        let sync = SyncOrchestrator::for_vault(vault.clone(), notifier.clone());
        Self {
            vault,
            notifier,
            sync,
        }
    }

    /// Replace the orchestrator, keeping vault and notifier.
    pub fn map_sync(mut self, f: impl FnOnce(SyncOrchestrator) -> SyncOrchestrator) -> Self {
        let fresh = SyncOrchestrator::for_vault(self.vault.clone(), self.notifier.clone());
        self.sync = f(fresh);
        self
    }

    pub fn content(&self, path: &str) -> String {
        self.vault.content(&id(path)).unwrap()
    }

    pub fn writes(&self, path: &str) -> usize {
        self.vault.write_count(&id(path))
    }

    pub fn total_writes(&self) -> usize {
        self.vault.ids().iter().map(|d| self.vault.write_count(d)).sum()
    }
}
