//! Local file store for uploaded documents.
//!
//! Files are written under a root directory with a generated key
//! (`<uuid>.<ext>`); the key is what document rows reference.

use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory-backed store for uploaded files.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `bytes` under a fresh key derived from `original_name`'s extension.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let key = match extension_of(original_name) {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4()),
            None => uuid::Uuid::new_v4().to_string(),
        };
        tokio::fs::write(self.root.join(&key), bytes).await?;

        debug!("Stored {} bytes as {key}", bytes.len());
        Ok(key)
    }

    /// Reads a stored file back.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path_for(key)?).await?)
    }

    /// Deletes a stored file.
    pub async fn remove(&self, key: &str) -> Result<()> {
        tokio::fs::remove_file(self.path_for(key)?).await?;
        debug!("Removed {key}");
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        // Keys are generated by `save` and never contain separators
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::validation(format!("Некорректный ключ файла: {key}")));
        }
        Ok(self.root.join(key))
    }
}

fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then_some(ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8)
}
