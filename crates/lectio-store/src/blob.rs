//! Directory-backed blob store for uploaded documents.

use crate::error::StoreResult;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Stores document bytes under a root directory, one file per upload,
/// named by a fresh UUID plus the original extension.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a blob store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist document bytes and return the stored file's path.
    ///
    /// The root directory is created on first use. The stored name keeps
    /// only the original file's extension.
    pub fn save(&self, bytes: &[u8], original_name: &str) -> StoreResult<PathBuf> {
        std::fs::create_dir_all(&self.root)?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_lowercase();
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.root.join(filename);

        std::fs::write(&path, bytes)?;

        info!("Saved document to {}", path.display());
        Ok(path)
    }

    /// Read back stored document bytes.
    pub fn read(&self, path: &Path) -> StoreResult<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    /// Delete a stored document. Returns whether a file was removed;
    /// failures are logged, not propagated.
    pub fn delete(&self, path: &Path) -> bool {
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted document {}", path.display());
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Failed to delete document {}: {}", path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().join("docs"));

        let path = store.save(b"document bytes", "paper.PDF").unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "pdf");

        let bytes = store.read(&path).unwrap();
        assert_eq!(bytes, b"document bytes");
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let a = store.save(b"same", "a.md").unwrap();
        let b = store.save(b"same", "b.md").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let path = store.save(b"bytes", "doc.docx").unwrap();
        assert!(store.delete(&path));
        assert!(!path.exists());
        // Second delete reports nothing removed
        assert!(!store.delete(&path));
    }
}
