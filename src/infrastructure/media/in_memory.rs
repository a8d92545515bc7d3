//! In-memory media store

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::media::{Asset, MediaFolder, MediaStore, UploadFile};
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "memory://media";

/// Keeps uploaded files in process memory.
///
/// Ids are `{FOLDER}/{sequence}` so they are predictable in tests.
#[derive(Debug)]
pub struct InMemoryMediaStore {
    base_url: String,
    sequence: AtomicU64,
    files: RwLock<HashMap<String, UploadFile>>,
    destroyed: RwLock<Vec<String>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sequence: AtomicU64::new(0),
            files: RwLock::new(HashMap::new()),
            destroyed: RwLock::new(Vec::new()),
        }
    }

    /// Whether an asset is currently stored
    pub async fn contains(&self, external_id: &str) -> bool {
        self.files.read().await.contains_key(external_id)
    }

    /// Number of stored assets
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    /// Ids passed to `destroy`, in call order
    pub async fn destroyed(&self) -> Vec<String> {
        self.destroyed.read().await.clone()
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(&self, folder: MediaFolder, file: UploadFile) -> Result<Asset, DomainError> {
        if file.is_empty() {
            return Err(DomainError::upload(format!(
                "File '{}' is empty",
                file.file_name
            )));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let external_id = format!("{}/{}", folder, sequence);
        let url = format!("{}/{}/{}", self.base_url, external_id, file.file_name);

        self.files.write().await.insert(external_id.clone(), file);

        Ok(Asset::new(external_id, url))
    }

    async fn destroy(&self, external_id: &str) -> Result<(), DomainError> {
        self.destroyed.write().await.push(external_id.to_string());
        self.files.write().await.remove(external_id);
        Ok(())
    }
}
