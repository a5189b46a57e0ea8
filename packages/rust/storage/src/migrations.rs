//! SQL migration definitions for the LeadForge database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: sheet_rows",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Append-only spreadsheet rows; the first row of a sheet is its header
CREATE TABLE IF NOT EXISTS sheet_rows (
    row_index   INTEGER PRIMARY KEY AUTOINCREMENT,
    sheet       TEXT NOT NULL,
    cells_json  TEXT NOT NULL,
    appended_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sheet_rows_sheet ON sheet_rows(sheet, row_index);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Artifact registry",
            sql: r#"
-- Files copied into the artifact folder
CREATE TABLE IF NOT EXISTS artifacts (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    stored_path TEXT NOT NULL,
    sha256      TEXT NOT NULL,
    size_bytes  INTEGER NOT NULL,
    uploaded_at TEXT NOT NULL,
    link        TEXT
);

CREATE INDEX IF NOT EXISTS idx_artifacts_name ON artifacts(name);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}
