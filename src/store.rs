//! Content store abstraction.
//!
//! Seeded documents are backed by files that land in the store out of band
//! (a bind-mounted directory in the original deployment, an object store
//! elsewhere). This subsystem only ever observes existence and byte length;
//! it never creates or deletes store entries.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::SeedError;

/// Read-only view of the store backing seeded documents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolved path/key a `storage_key` maps to, for diagnostics.
    fn locate(&self, storage_key: &str) -> String;

    /// Byte length of the entry, or `None` if it does not exist.
    /// `Err` means the store itself could not be consulted.
    async fn byte_size(&self, storage_key: &str) -> Result<Option<u64>, SeedError>;
}

/// Filesystem-backed content store: entries are files directly under `root`.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, storage_key: &str) -> PathBuf {
        self.root.join(storage_key)
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    fn locate(&self, storage_key: &str) -> String {
        self.resolve(storage_key).display().to_string()
    }

    async fn byte_size(&self, storage_key: &str) -> Result<Option<u64>, SeedError> {
        let path = self.resolve(storage_key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            // Directories and other non-file entries do not count as content
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SeedError::ContentStoreUnavailable {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }
}
