//! Page text extraction for LeadForge.
//!
//! Fetches a URL the way a browser would and reduces the HTML to its visible
//! text. Both self-analysis and client analysis sit on top of [`TextSource`],
//! so tests can substitute canned pages without a network.

mod text;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use leadforge_shared::{LeadForgeError, Result};

pub use text::visible_text;

/// Desktop browser User-Agent; many marketing sites refuse obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Default timeout in seconds for a page fetch.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Anything that can turn a URL into readable page text.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Return the visible text of `url`.
    ///
    /// Errors on network failure, non-2xx status, or a page with no visible
    /// text at all; callers treat every error as "extraction failed".
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Options for the HTTP extractor.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Timeout for the whole request in seconds.
    pub timeout_secs: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Fetches pages over HTTP and strips them to visible text.
pub struct PageTextExtractor {
    client: Client,
}

impl PageTextExtractor {
    /// Create a new extractor with the given options.
    pub fn new(opts: &ExtractOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(opts.timeout_secs))
            .build()
            .map_err(|e| LeadForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TextSource for PageTextExtractor {
    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "failed to fetch page");
            LeadForgeError::Network(format!("{url}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "page fetch returned an error status");
            return Err(LeadForgeError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LeadForgeError::Network(format!("{url}: failed to read body: {e}")))?;

        let text = visible_text(&body);
        debug!(url, html_len = body.len(), text_len = text.len(), "page text extracted");

        if text.is_empty() {
            return Err(LeadForgeError::parse(format!("{url}: page has no visible text")));
        }

        Ok(text)
    }
}
