//! Application configuration for LeadForge.
//!
//! User config lives at `~/.leadforge/leadforge.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored in the file: `[search] api_key_env` names the
//! environment variable that holds the key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadforge";

// ---------------------------------------------------------------------------
// Config structs (matching leadforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Language-model service settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Search API settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Lead store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Outreach email signature.
    #[serde(default)]
    pub outreach: OutreachConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Geographic location passed to the search API.
    #[serde(default = "default_location")]
    pub location: String,

    /// Directory where portfolio files are rendered before upload.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Maximum characters of page text handed to the model.
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            work_dir: default_work_dir(),
            text_limit: default_text_limit(),
        }
    }
}

fn default_location() -> String {
    "United States".into()
}
fn default_work_dir() -> String {
    "var/portfolios".into()
}
fn default_text_limit() -> usize {
    4_000
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model tag used for every chat call.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_llm_model() -> String {
    "llama3:8b".into()
}
fn default_llm_timeout() -> u64 {
    120
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the env var holding the SerpAPI key (never store the key itself).
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// SerpAPI base URL.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Organic results requested per query.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Google domain to search.
    #[serde(default = "default_google_domain")]
    pub google_domain: String,

    /// Country code (`gl`).
    #[serde(default = "default_gl")]
    pub gl: String,

    /// Interface language (`hl`).
    #[serde(default = "default_hl")]
    pub hl: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_search_key_env(),
            base_url: default_search_base_url(),
            max_results: default_max_results(),
            google_domain: default_google_domain(),
            gl: default_gl(),
            hl: default_hl(),
        }
    }
}

fn default_search_key_env() -> String {
    "SERPAPI_KEY".into()
}
fn default_search_base_url() -> String {
    "https://serpapi.com".into()
}
fn default_max_results() -> u32 {
    10
}
fn default_google_domain() -> String {
    "google.com".into()
}
fn default_gl() -> String {
    "us".into()
}
fn default_hl() -> String {
    "en".into()
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Display name of the lead sheet.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Path of the libSQL database holding the sheet rows.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Folder that receives uploaded portfolio files.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            database_path: default_database_path(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

fn default_sheet_name() -> String {
    "Smart Marketing Leads".into()
}
fn default_database_path() -> String {
    "var/leads.db".into()
}
fn default_artifact_dir() -> String {
    "var/drive".into()
}

/// `[outreach]` section: who signs the drafted emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachConfig {
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default = "default_sender_title")]
    pub sender_title: String,

    #[serde(default = "default_company")]
    pub company: String,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            sender_name: default_sender_name(),
            sender_title: default_sender_title(),
            company: default_company(),
        }
    }
}

impl OutreachConfig {
    /// The sign-off line every draft must end with.
    pub fn signature(&self) -> String {
        format!("{}, {}, {}", self.sender_name, self.sender_title, self.company)
    }
}

fn default_sender_name() -> String {
    "Jordan Reyes".into()
}
fn default_sender_title() -> String {
    "Co-founder".into()
}
fn default_company() -> String {
    "LeadForge".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadforge/leadforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LeadForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the SerpAPI key from the env var named in config.
pub fn search_api_key(config: &SearchConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(LeadForgeError::config(format!(
            "SerpAPI key not found. Set the {var_name} environment variable \
             (a .env file in the working directory also works)."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("SERPAPI_KEY"));
        assert!(toml_str.contains("llama3:8b"));
        assert!(toml_str.contains("Smart Marketing Leads"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.text_limit, 4_000);
        assert_eq!(parsed.defaults.location, "United States");
        assert_eq!(parsed.search.max_results, 10);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[llm]
model = "mistral:7b"

[outreach]
sender_name = "Sam Lee"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.llm.model, "mistral:7b");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.outreach.signature(), "Sam Lee, Co-founder, LeadForge");
        assert_eq!(config.store.database_path, "var/leads.db");
    }

    #[test]
    fn missing_search_key() {
        let config = SearchConfig {
            // Unique name so other tests' env does not leak in
            api_key_env: "LF_TEST_NONEXISTENT_KEY_12345".into(),
            ..SearchConfig::default()
        };
        let result = search_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("SerpAPI key not found"));
    }
}
