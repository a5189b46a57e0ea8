//! libSQL storage layer (local, offline mode).
//!
//! The [`Storage`] struct wraps a libSQL database that plays the role of a
//! spreadsheet: named sheets of append-only rows whose first row is the
//! header. It also keeps a registry of files placed in the
//! [`ArtifactFolder`], which is the shareable file store.

mod artifacts;
mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};

use leadforge_shared::{LeadForgeError, Result};

pub use artifacts::{ArtifactFolder, StoredFile};

/// One row of the artifact registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub id: String,
    pub name: String,
    pub stored_path: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
    /// Set once the file has been shared.
    pub link: Option<String>,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

fn storage_err(e: impl std::fmt::Display) -> LeadForgeError {
    LeadForgeError::Storage(e.to_string())
}

impl Storage {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LeadForgeError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        LeadForgeError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Sheet operations
    // -----------------------------------------------------------------------

    /// Number of rows in `sheet`, header included.
    pub async fn row_count(&self, sheet: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM sheet_rows WHERE sheet = ?1",
                params![sheet],
            )
            .await
            .map_err(storage_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).map_err(storage_err)? as u64),
            Ok(None) => Ok(0),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// Append one row to `sheet`. Returns its row index.
    pub async fn append_row(&self, sheet: &str, cells: &[String]) -> Result<i64> {
        let cells_json = serde_json::to_string(cells).map_err(storage_err)?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO sheet_rows (sheet, cells_json, appended_at) VALUES (?1, ?2, ?3)",
                params![sheet, cells_json.as_str(), now.as_str()],
            )
            .await
            .map_err(storage_err)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Write `headers` as the first row if `sheet` is empty.
    /// Returns `true` when the header row was written.
    pub async fn ensure_header_row(&self, sheet: &str, headers: &[&str]) -> Result<bool> {
        if self.row_count(sheet).await? > 0 {
            return Ok(false);
        }
        let cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        self.append_row(sheet, &cells).await?;
        tracing::info!(sheet, "wrote header row");
        Ok(true)
    }

    /// Every row of `sheet` in append order, header included.
    pub async fn all_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let mut rows = self
            .conn
            .query(
                "SELECT cells_json FROM sheet_rows WHERE sheet = ?1 ORDER BY row_index",
                params![sheet],
            )
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let cells_json: String = row.get(0).map_err(storage_err)?;
            let cells: Vec<String> = serde_json::from_str(&cells_json)
                .map_err(|e| LeadForgeError::Storage(format!("corrupt row: {e}")))?;
            results.push(cells);
        }
        Ok(results)
    }

    /// Non-empty values of one column, header row skipped.
    pub async fn column_values(&self, sheet: &str, column: usize) -> Result<Vec<String>> {
        let rows = self.all_rows(sheet).await?;
        Ok(rows
            .into_iter()
            .skip(1)
            .filter_map(|mut cells| {
                if column < cells.len() {
                    Some(cells.swap_remove(column))
                } else {
                    None
                }
            })
            .filter(|value| !value.trim().is_empty())
            .collect())
    }

    // -----------------------------------------------------------------------
    // Artifact registry
    // -----------------------------------------------------------------------

    /// Register a file placed in the artifact folder.
    pub async fn insert_artifact(&self, entry: &ArtifactEntry) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO artifacts (id, name, stored_path, sha256, size_bytes, uploaded_at, link)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.id.as_str(),
                    entry.name.as_str(),
                    entry.stored_path.as_str(),
                    entry.sha256.as_str(),
                    entry.size_bytes as i64,
                    entry.uploaded_at.to_rfc3339(),
                    entry.link.as_deref(),
                ],
            )
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    /// Record the share link of an artifact.
    pub async fn set_artifact_link(&self, id: &str, link: &str) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE artifacts SET link = ?1 WHERE id = ?2",
                params![link, id],
            )
            .await
            .map_err(storage_err)?;
        if changed == 0 {
            return Err(LeadForgeError::Storage(format!("no artifact with id {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SHEET: &str = "Smart Marketing Leads";

    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("lf_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn open_creates_schema() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 2);
        assert_eq!(storage.row_count(SHEET).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reopen_keeps_rows() {
        let tmp = std::env::temp_dir().join(format!("lf_test_{}.db", Uuid::now_v7()));
        {
            let storage = Storage::open(&tmp).await.unwrap();
            storage.append_row(SHEET, &row(&["a", "b"])).await.unwrap();
        }
        let storage = Storage::open(&tmp).await.unwrap();
        assert_eq!(storage.all_rows(SHEET).await.unwrap(), vec![row(&["a", "b"])]);
    }

    #[tokio::test]
    async fn header_written_once() {
        let storage = test_storage().await;
        let headers = ["Client Name", "URL"];
        assert!(storage.ensure_header_row(SHEET, &headers).await.unwrap());
        assert!(!storage.ensure_header_row(SHEET, &headers).await.unwrap());
        assert_eq!(storage.row_count(SHEET).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn rows_keep_append_order() {
        let storage = test_storage().await;
        storage.append_row(SHEET, &row(&["h1", "h2"])).await.unwrap();
        storage.append_row(SHEET, &row(&["Foo Inc", "http://foo.com"])).await.unwrap();
        storage.append_row(SHEET, &row(&["Bar", "http://bar.com"])).await.unwrap();

        let rows = storage.all_rows(SHEET).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "Foo Inc");
        assert_eq!(rows[2][1], "http://bar.com");
    }

    #[tokio::test]
    async fn sheets_are_isolated() {
        let storage = test_storage().await;
        storage.append_row("one", &row(&["x"])).await.unwrap();
        storage.append_row("two", &row(&["y"])).await.unwrap();
        assert_eq!(storage.all_rows("one").await.unwrap(), vec![row(&["x"])]);
    }

    #[tokio::test]
    async fn column_values_skip_header_and_blanks() {
        let storage = test_storage().await;
        storage.append_row(SHEET, &row(&["Client Name", "URL"])).await.unwrap();
        storage.append_row(SHEET, &row(&["Acme", "https://acme.com"])).await.unwrap();
        storage.append_row(SHEET, &row(&["Blank", ""])).await.unwrap();
        storage.append_row(SHEET, &row(&["Short"])).await.unwrap();

        let urls = storage.column_values(SHEET, 1).await.unwrap();
        assert_eq!(urls, vec!["https://acme.com".to_string()]);
    }

    async fn artifact_link(storage: &Storage, id: &str) -> Option<String> {
        let mut rows = storage
            .conn
            .query("SELECT link FROM artifacts WHERE id = ?1", params![id])
            .await
            .unwrap();
        let row = rows.next().await.unwrap().expect("artifact row");
        row.get::<String>(0).ok()
    }

    #[tokio::test]
    async fn artifact_registry() {
        let storage = test_storage().await;
        let id = Uuid::now_v7().to_string();
        let entry = ArtifactEntry {
            id: id.clone(),
            name: "Foo Inc_Portfolio.md".into(),
            stored_path: "/tmp/drive/Foo Inc_Portfolio.md".into(),
            sha256: "abc123".into(),
            size_bytes: 42,
            uploaded_at: Utc::now(),
            link: None,
        };
        storage.insert_artifact(&entry).await.expect("insert");

        assert_eq!(artifact_link(&storage, &id).await, None);

        storage
            .set_artifact_link(&id, "file:///tmp/drive/x.md")
            .await
            .expect("share");
        assert_eq!(
            artifact_link(&storage, &id).await.as_deref(),
            Some("file:///tmp/drive/x.md")
        );

        assert!(storage.set_artifact_link("missing", "x").await.is_err());
    }
}
