//! SerpAPI (Google engine) search client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use leadforge_shared::{LeadForgeError, Result, SearchConfig};

use crate::{SearchHit, SearchProvider, SearchQuery};

/// Default timeout in seconds for a search call.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Characters of a non-JSON body kept in the parse error.
const BODY_EXCERPT_CHARS: usize = 200;

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("LeadForge/", env!("CARGO_PKG_VERSION"));

/// SerpAPI response body. Only the fields we read.
#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// SerpAPI client bound to one API key and a set of Google parameters.
pub struct SerpApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    google_domain: String,
    gl: String,
    hl: String,
}

impl SerpApiClient {
    /// Build a client from config. A missing key is not an error here; every
    /// search then fails with a config hint instead.
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LeadForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            google_domain: config.google_domain.clone(),
            gl: config.gl.clone(),
            hl: config.hl.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    #[instrument(skip_all, fields(q = %query.text, location = %query.location))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LeadForgeError::Search("SERPAPI_KEY is not set".into()))?;

        let num = query.max_results.to_string();
        let url = format!("{}/search.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("q", query.text.as_str()),
                ("location", query.location.as_str()),
                ("google_domain", self.google_domain.as_str()),
                ("gl", self.gl.as_str()),
                ("hl", self.hl.as_str()),
                ("num", num.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| LeadForgeError::Network(format!("SerpAPI request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LeadForgeError::Network(format!("SerpAPI: failed to read body: {e}")))?;

        // SerpAPI reports bad keys and exhausted quotas as an `error` field,
        // usually alongside a 4xx status; prefer its message when present.
        let parsed: Option<SerpResponse> = serde_json::from_str(&body).ok();
        if let Some(SerpResponse {
            error: Some(message),
            ..
        }) = &parsed
        {
            return Err(LeadForgeError::Search(message.clone()));
        }

        if !status.is_success() {
            return Err(LeadForgeError::Search(format!("HTTP {status}")));
        }

        let parsed = parsed.ok_or_else(|| {
            LeadForgeError::parse(format!(
                "SerpAPI returned a non-JSON body: {}",
                body.chars().take(BODY_EXCERPT_CHARS).collect::<String>()
            ))
        })?;

        debug!(results = parsed.organic_results.len(), "SerpAPI response parsed");

        Ok(parsed
            .organic_results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title.unwrap_or_default(),
                link: r.link.unwrap_or_default(),
            })
            .collect())
    }
}
