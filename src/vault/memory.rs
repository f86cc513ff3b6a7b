//! In-memory document store

use super::resolve::resolve_linkpath;
use crate::document::{parse_properties, DocumentId, Properties};
use crate::sync::{DocumentStore, LinkResolver, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// Documents held in memory, keyed by path.
///
/// Useful for hosts that keep their own document cache, and for tests.
#[derive(Debug, Default)]
pub struct MemoryVault {
    documents: DashMap<DocumentId, String>,
    writes: DashMap<DocumentId, usize>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vault from `(path, content)` pairs.
    pub fn with_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let vault = Self::new();
        for (path, content) in documents {
            vault.insert(path, content);
        }
        vault
    }

    /// Add or replace a document without counting it as a write.
    pub fn insert(&self, path: impl Into<DocumentId>, content: impl Into<String>) {
        self.documents.insert(path.into(), content.into());
    }

    pub fn remove(&self, id: &DocumentId) -> Option<String> {
        self.documents.remove(id).map(|(_, content)| content)
    }

    /// Current text of a document.
    pub fn content(&self, id: &DocumentId) -> Option<String> {
        self.documents.get(id).map(|c| c.clone())
    }

    /// How many times `write_content` has stored this document.
    pub fn write_count(&self, id: &DocumentId) -> usize {
        self.writes.get(id).map(|n| *n).unwrap_or(0)
    }

    /// All document ids, sorted.
    pub fn ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<_> = self.documents.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl LinkResolver for MemoryVault {
    async fn resolve(&self, link: &str, from: &DocumentId) -> Option<DocumentId> {
        let ids = self.ids();
        resolve_linkpath(link, from, &ids)
    }
}

#[async_trait]
impl DocumentStore for MemoryVault {
    async fn read_metadata(&self, id: &DocumentId) -> Result<Properties, StoreError> {
        let content = self.read_content(id).await?;
        match parse_properties(&content) {
            Ok(properties) => Ok(properties),
            Err(e) => {
                tracing::warn!(document = %id, error = %e, "ignoring malformed frontmatter");
                Ok(Properties::new())
            }
        }
    }

    async fn read_content(&self, id: &DocumentId) -> Result<String, StoreError> {
        self.content(id).ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn write_content(&self, id: &DocumentId, content: String) -> Result<(), StoreError> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        *entry = content;
        drop(entry);
        *self.writes.entry(id.clone()).or_insert(0) += 1;
        Ok(())
    }
}
