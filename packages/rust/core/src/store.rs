//! The lead store: known URLs, artifact upload, and the append-only sheet.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use leadforge_shared::{
    ArtifactLink, LeadForgeError, LeadRecord, Result, SHEET_HEADERS, StoreConfig, URL_COLUMN,
};
use leadforge_storage::{ArtifactEntry, ArtifactFolder, Storage};

use crate::portfolio::portfolio_name;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Persistence seam used by the pipeline and the report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// URLs of every lead already logged. Never fails; read errors give an
    /// empty set.
    async fn known_urls(&self) -> HashSet<String>;

    /// Upload a lead's portfolio file and return a shareable link or a
    /// failure sentinel.
    async fn upload_artifact(&self, local: &Path, lead_name: &str) -> ArtifactLink;

    /// Append exactly one row.
    async fn append_record(&self, record: &LeadRecord) -> Result<()>;

    /// Every row, header included.
    async fn all_rows(&self) -> Result<Vec<Vec<String>>>;
}

// ---------------------------------------------------------------------------
// libSQL + folder implementation
// ---------------------------------------------------------------------------

/// [`LeadStore`] over a libSQL sheet and an artifact folder.
pub struct SheetLeadStore {
    storage: Storage,
    folder: ArtifactFolder,
    sheet: String,
}

impl SheetLeadStore {
    /// Open the database and artifact folder named in `[store]` and make sure
    /// the sheet has its header row.
    #[instrument(skip_all, fields(sheet = %config.sheet_name))]
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let storage = Storage::open(Path::new(&config.database_path)).await?;
        let folder = ArtifactFolder::open(Path::new(&config.artifact_dir))?;
        let store = Self {
            storage,
            folder,
            sheet: config.sheet_name.clone(),
        };

        if let Err(e) = store.storage.ensure_header_row(&store.sheet, &SHEET_HEADERS).await {
            warn!(error = %e, "could not write the header row");
        }

        info!(
            database = %config.database_path,
            artifacts = %store.folder.root().display(),
            "lead store connected"
        );
        Ok(store)
    }

    async fn store_and_share(&self, local: &Path, name: &str) -> Result<String> {
        let stored = self.folder.upload(local, name).await?;
        self.storage
            .insert_artifact(&ArtifactEntry {
                id: stored.id.clone(),
                name: stored.name.clone(),
                stored_path: stored.path.display().to_string(),
                sha256: stored.sha256.clone(),
                size_bytes: stored.size_bytes,
                uploaded_at: chrono::Utc::now(),
                link: None,
            })
            .await?;
        let link = self.folder.share(&stored)?;
        self.storage.set_artifact_link(&stored.id, &link).await?;
        Ok(link)
    }
}

#[async_trait]
impl LeadStore for SheetLeadStore {
    async fn known_urls(&self) -> HashSet<String> {
        match self.storage.column_values(&self.sheet, URL_COLUMN).await {
            Ok(urls) => urls.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "could not read known URLs; treating every lead as new");
                HashSet::new()
            }
        }
    }

    #[instrument(skip(self, local))]
    async fn upload_artifact(&self, local: &Path, lead_name: &str) -> ArtifactLink {
        if !local.is_file() {
            warn!(path = %local.display(), "portfolio file is missing");
            return ArtifactLink::FileMissing;
        }

        let link = match self.store_and_share(local, &portfolio_name(lead_name)).await {
            Ok(link) => link,
            Err(e) => {
                match e.hint() {
                    Some(hint) => warn!(error = %e, hint, "portfolio upload failed"),
                    None => warn!(error = %e, "portfolio upload failed"),
                }
                return ArtifactLink::Failed;
            }
        };

        remove_local(local.to_path_buf());
        debug!(link = %link, "portfolio shared");
        ArtifactLink::Shared(link)
    }

    async fn append_record(&self, record: &LeadRecord) -> Result<()> {
        self.storage
            .append_row(&self.sheet, &record.to_row())
            .await
            .map(|_| ())
    }

    async fn all_rows(&self) -> Result<Vec<Vec<String>>> {
        self.storage.all_rows(&self.sheet).await
    }
}

/// Delete the local copy after a confirmed upload; failure is only a warning.
fn remove_local(path: PathBuf) {
    if let Err(e) = std::fs::remove_file(&path) {
        let e = LeadForgeError::io(&path, e);
        warn!(error = %e, "could not delete local portfolio");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_config() -> StoreConfig {
        let root = std::env::temp_dir().join(format!("lf_store_{}", Uuid::now_v7()));
        StoreConfig {
            sheet_name: "Leads".into(),
            database_path: root.join("leads.db").display().to_string(),
            artifact_dir: root.join("drive").display().to_string(),
        }
    }

    fn record(name: &str, url: &str) -> LeadRecord {
        LeadRecord {
            name: name.into(),
            url: url.into(),
            summary: "s".into(),
            industry: "i".into(),
            email: "e".into(),
            artifact_link: "UPLOAD_FAILED".into(),
        }
    }

    #[tokio::test]
    async fn connect_writes_headers_once() {
        let config = temp_config();
        let store = SheetLeadStore::connect(&config).await.expect("connect");
        drop(store);
        let store = SheetLeadStore::connect(&config).await.expect("reconnect");

        let rows = store.all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], SHEET_HEADERS.map(String::from).to_vec());
        assert!(store.known_urls().await.is_empty());
    }

    #[tokio::test]
    async fn appended_urls_become_known() {
        let store = SheetLeadStore::connect(&temp_config()).await.unwrap();
        store.append_record(&record("Acme", "https://acme.com")).await.unwrap();
        store.append_record(&record("Foo", "http://foo.com")).await.unwrap();

        let known = store.known_urls().await;
        assert_eq!(known.len(), 2);
        assert!(known.contains("https://acme.com"));
        assert!(!known.contains("URL"));
    }

    #[tokio::test]
    async fn upload_shares_and_removes_local() {
        let config = temp_config();
        let store = SheetLeadStore::connect(&config).await.unwrap();
        let local = Path::new(&config.database_path).with_file_name("Foo_Portfolio.md");
        std::fs::write(&local, "# Foo\n").unwrap();

        let link = store.upload_artifact(&local, "Foo Inc").await;
        let ArtifactLink::Shared(url) = &link else {
            panic!("expected a shared link, got {link:?}");
        };
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("Foo%20Inc_Portfolio.md"));
        assert!(!local.exists());
    }

    #[tokio::test]
    async fn missing_local_file_is_sentinel() {
        let store = SheetLeadStore::connect(&temp_config()).await.unwrap();
        let link = store
            .upload_artifact(Path::new("/no/such/portfolio.md"), "Foo Inc")
            .await;
        assert_eq!(link, ArtifactLink::FileMissing);
        assert_eq!(link.as_cell(), "UPLOAD_FAILED_FILE_MISSING");
    }
}
