use crate::app::syntax::{is_csharp, parse_csharp, SyntaxRoot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Read-only view of one source document. Both accessors may suspend.
#[async_trait]
pub trait DocumentHandle: Send + Sync {
    fn path(&self) -> &Path;

    /// `None` when the document has no syntax tree (not C#, or unparseable).
    async fn syntax_root(&self) -> Option<Arc<SyntaxRoot>>;

    async fn text(&self) -> Arc<str>;
}

#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn open(&self, path: &Path) -> Result<Arc<dyn DocumentHandle>>;
}

/// In-memory document whose syntax tree is parsed on first request.
pub struct SourceDocument {
    path: PathBuf,
    text: Arc<str>,
    root: OnceCell<Option<Arc<SyntaxRoot>>>,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            root: OnceCell::new(),
        }
    }

    async fn parse(&self) -> Option<Arc<SyntaxRoot>> {
        if !is_csharp(&self.path) {
            return None;
        }

        let text = Arc::clone(&self.text);
        match tokio::task::spawn_blocking(move || parse_csharp(&text)).await {
            Ok(Ok(root)) => Some(Arc::new(root)),
            Ok(Err(err)) => {
                log::debug!("Could not parse {:?}: {:#}", self.path, err);
                None
            }
            Err(err) => {
                log::warn!("Parser task for {:?} failed: {}", self.path, err);
                None
            }
        }
    }
}

#[async_trait]
impl DocumentHandle for SourceDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn syntax_root(&self) -> Option<Arc<SyntaxRoot>> {
        self.root.get_or_init(|| self.parse()).await.clone()
    }

    async fn text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }
}

/// Documents under one directory, read from disk once and cached by path.
pub struct WorkspaceDocuments {
    root: PathBuf,
    cache: Mutex<HashMap<PathBuf, Arc<SourceDocument>>>,
}

impl WorkspaceDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl DocumentProvider for WorkspaceDocuments {
    async fn open(&self, path: &Path) -> Result<Arc<dyn DocumentHandle>> {
        let full_path = self.resolve(path);
        if let Some(document) = self.cache.lock().await.get(&full_path) {
            let document: Arc<dyn DocumentHandle> = document.clone();
            return Ok(document);
        }

        let text = tokio::fs::read_to_string(&full_path)
            .await
            .with_context(|| format!("Failed to read document {:?}", full_path))?;
        let document = Arc::new(SourceDocument::new(full_path.clone(), text));

        let mut cache = self.cache.lock().await;
        let document: Arc<dyn DocumentHandle> = cache.entry(full_path).or_insert(document).clone();
        Ok(document)
    }
}
