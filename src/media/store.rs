//! Key-addressed blob storage for internally hosted media

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::types::{BugsightError, Result};

/// Object returned by a [`BlobStore`]
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub key: String,
    pub content_type: Option<String>,
    body: Vec<u8>,
}

impl BlobObject {
    pub fn new(key: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            content_type: None,
            body,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Read the full payload
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

/// Blob store contract: `Ok(None)` for a missing key, `Err` for a storage failure
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>>;

    /// Store name for logging
    fn name(&self) -> &str;
}

pub type SharedBlobStore = Arc<dyn BlobStore>;

// =============================================================================
// Filesystem store
// =============================================================================

/// Directory-backed store; keys are relative paths under `root`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(BugsightError::media(key, "key escapes the storage root"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => {
                let object = BlobObject::new(key, body);
                Ok(Some(match image_type_for_extension(&path) {
                    Some(content_type) => object.with_content_type(content_type),
                    None => object,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BugsightError::Io(e)),
        }
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

fn image_type_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Lock-free in-memory store, used for embedding and tests
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    objects: Arc<DashMap<String, BlobObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, object: BlobObject) {
        self.objects.insert(object.key.clone(), object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>> {
        Ok(self.objects.get(key).map(|entry| entry.value().clone()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
