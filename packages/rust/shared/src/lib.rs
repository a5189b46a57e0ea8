//! Shared types, error model, and configuration for LeadForge.
//!
//! This crate is the foundation depended on by all other LeadForge crates.
//! It provides:
//! - The unified error type ([`LeadForgeError`])
//! - Domain types ([`Lead`], [`ClientProfile`], [`LeadRecord`], [`ArtifactLink`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, LlmConfig, OutreachConfig, SearchConfig, StoreConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, search_api_key,
};
pub use error::{LeadForgeError, Result};
pub use types::{
    ArtifactLink, ClientProfile, Lead, LeadRecord, SHEET_HEADERS, UPLOAD_FAILED,
    UPLOAD_FAILED_FILE_MISSING, URL_COLUMN,
};
