//! Folder-backed file store.
//!
//! Uploading copies a local file into `<root>/<id>/<name>`; sharing turns the
//! stored copy into a durable `file://` link.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use leadforge_shared::{LeadForgeError, Result};

/// A file copied into the artifact folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
}

/// Root directory acting as the shareable file store.
#[derive(Debug, Clone)]
pub struct ArtifactFolder {
    root: PathBuf,
}

impl ArtifactFolder {
    /// Bind the folder at `root`, creating it if needed.
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| LeadForgeError::io(root, e))?;
        let root = root.canonicalize().map_err(|e| LeadForgeError::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy `local` into the folder under `name`.
    pub async fn upload(&self, local: &Path, name: &str) -> Result<StoredFile> {
        let bytes = tokio::fs::read(local)
            .await
            .map_err(|e| LeadForgeError::io(local, e))?;

        let id = Uuid::now_v7().to_string();
        let dir = self.root.join(&id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| LeadForgeError::io(&dir, e))?;

        let name = file_name(name);
        let path = dir.join(&name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| LeadForgeError::io(&path, e))?;

        debug!(id = %id, name = %name, bytes = bytes.len(), "artifact stored");

        Ok(StoredFile {
            id,
            name,
            sha256: compute_hash(&bytes),
            size_bytes: bytes.len() as u64,
            path,
        })
    }

    /// Durable link for a stored file.
    pub fn share(&self, stored: &StoredFile) -> Result<String> {
        if !stored.path.starts_with(&self.root) || !stored.path.is_file() {
            return Err(LeadForgeError::Storage(format!(
                "{} is not in the artifact folder",
                stored.path.display()
            )));
        }
        Url::from_file_path(&stored.path)
            .map(|url| url.to_string())
            .map_err(|()| {
                LeadForgeError::Storage(format!("cannot link {}", stored.path.display()))
            })
    }
}

/// Make `name` safe to use as a single path component.
fn file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.');
    if cleaned.is_empty() {
        "artifact".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}
