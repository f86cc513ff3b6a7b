//! Directory-backed document store

use super::resolve::resolve_linkpath;
use crate::document::{parse_properties, DocumentId, Properties};
use crate::sync::{DocumentStore, LinkResolver, StoreError};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use walkdir::{DirEntry, WalkDir};

/// A vault rooted at a directory of markdown files.
///
/// Link resolution uses an index of `*.md` paths built at open time and on
/// [`FsVault::refresh`]. Reads always go to disk. Hidden files and folders
/// (`.obsidian`, `.git`, ...) are not indexed.
#[derive(Debug)]
pub struct FsVault {
    root: PathBuf,
    index: RwLock<Vec<DocumentId>>,
}

impl FsVault {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(StoreError::InvalidPath(root.display().to_string()));
        }
        let vault = Self {
            root,
            index: RwLock::new(Vec::new()),
        };
        vault.refresh();
        Ok(vault)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rescan the directory for markdown documents.
    pub fn refresh(&self) {
        let mut ids: Vec<DocumentId> = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
            .filter_map(|e| {
                let relative = e.path().strip_prefix(&self.root).ok()?;
                Some(DocumentId::new(relative.to_string_lossy().to_string()))
            })
            .collect();
        ids.sort();
        tracing::debug!(root = %self.root.display(), documents = ids.len(), "indexed vault");

        match self.index.write() {
            Ok(mut index) => *index = ids,
            Err(poisoned) => *poisoned.into_inner() = ids,
        }
    }

    /// Indexed document ids, sorted.
    pub fn documents(&self) -> Vec<DocumentId> {
        match self.index.read() {
            Ok(index) => index.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Map a filesystem path (absolute, or relative to the working
    /// directory) to a document id inside this vault.
    pub fn id_for_path(&self, path: &Path) -> Result<DocumentId, StoreError> {
        let canonical = path.canonicalize()?;
        let relative = canonical
            .strip_prefix(&self.root)
            .map_err(|_| StoreError::InvalidPath(path.display().to_string()))?;
        Ok(DocumentId::new(relative.to_string_lossy().to_string()))
    }

    /// Absolute path for an id. Rejects ids that would leave the root.
    pub fn path_for(&self, id: &DocumentId) -> Result<PathBuf, StoreError> {
        let relative = Path::new(id.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if id.as_str().is_empty() || escapes {
            return Err(StoreError::InvalidPath(id.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

#[async_trait]
impl LinkResolver for FsVault {
    async fn resolve(&self, link: &str, from: &DocumentId) -> Option<DocumentId> {
        let ids = self.documents();
        resolve_linkpath(link, from, &ids)
    }
}

#[async_trait]
impl DocumentStore for FsVault {
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
        let path = self.path_for(id)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file and renames it over the document, so
    /// readers see either the old or the new text.
    async fn write_content(&self, id: &DocumentId, content: String) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(id.clone()));
        }
        let tmp = path.with_file_name(format!(".{}.supersede-tmp", id.file_name()));
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
