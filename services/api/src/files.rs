//! Local file store for uploads
//!
//! Files are persisted under a public static directory with a
//! content-addressed name: SHA-256 over the original filename plus a random
//! UUID salt, hex-encoded, keeping the original extension. The store only
//! knows save and delete-by-name; metadata lives in the database.

use anyhow::{Context, Result};
use ring::digest;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

/// A file persisted by the store
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Hex-encoded content address (without extension)
    pub hash: String,
    /// Name on disk, `<hash><ext>`
    pub filename: String,
    /// Public URL the file is reachable under
    pub url: String,
}

/// Local filesystem file store
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    public_base: String,
}

impl FileStore {
    pub fn new(upload_dir: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_base: public_base.into(),
        }
    }

    /// Create a new FileStore from environment variables
    ///
    /// # Environment Variables
    /// - `UPLOAD_DIR`: directory for stored files (default: "uploads")
    /// - `PUBLIC_BASE_URL`: base URL files are served under
    ///   (default: "http://localhost:8000")
    pub fn from_env() -> Self {
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let public_base = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        Self::new(upload_dir, public_base)
    }

    /// Persist file content under a content-addressed name
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let hash = content_address(original_name);

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let filename = format!("{}{}", hash, ext);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| format!("creating upload dir {:?}", self.upload_dir))?;

        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing upload {:?}", path))?;

        let url = format!("{}/uploads/{}", self.public_base.trim_end_matches('/'), filename);

        Ok(StoredFile {
            hash,
            filename,
            url,
        })
    }

    /// Remove a stored file by its on-disk name
    ///
    /// Removing a name that is already gone is not an error; the metadata
    /// row is the source of truth and may outlive the file.
    pub async fn delete(&self, filename: &str) -> Result<()> {
        let path = self.upload_dir.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("stored file already missing: {:?}", path);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("removing upload {:?}", path)),
        }
    }
}

/// Hash an original filename together with a random salt
fn content_address(original_name: &str) -> String {
    let salted = format!("{}{}", original_name, Uuid::new_v4());
    let digest = digest::digest(&digest::SHA256, salted.as_bytes());

    digest.as_ref().iter().fold(String::new(), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{:02x}", b);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_content_addressed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "http://localhost:8000");

        let stored = store.save("photo.png", b"binary-bytes").await.unwrap();

        assert_eq!(stored.filename, format!("{}.png", stored.hash));
        assert_eq!(stored.hash.len(), 64);
        assert_eq!(
            stored.url,
            format!("http://localhost:8000/uploads/{}", stored.filename)
        );

        let on_disk = std::fs::read(dir.path().join(&stored.filename)).unwrap();
        assert_eq!(on_disk, b"binary-bytes");
    }

    #[tokio::test]
    async fn same_name_gets_distinct_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "http://localhost:8000");

        let first = store.save("photo.png", b"a").await.unwrap();
        let second = store.save("photo.png", b"b").await.unwrap();

        assert_ne!(first.filename, second.filename);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "http://localhost:8000");

        let stored = store.save("doc.pdf", b"content").await.unwrap();
        store.delete(&stored.filename).await.unwrap();
        assert!(!dir.path().join(&stored.filename).exists());

        // second delete of the same name is fine
        store.delete(&stored.filename).await.unwrap();
    }

    #[tokio::test]
    async fn extensionless_names_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), "http://localhost:8000");

        let stored = store.save("README", b"x").await.unwrap();
        assert_eq!(stored.filename, stored.hash);
    }
}
