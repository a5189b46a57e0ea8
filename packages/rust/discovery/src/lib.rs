//! Lead discovery via a web search API.
//!
//! The operator's services text is reduced to its primary service, which
//! becomes a single "companies needing ..." query. Organic results that look
//! like real websites become [`Lead`]s. Discovery never fails the run: every
//! error path degrades to an empty lead list plus a diagnostic.

mod serpapi;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use leadforge_shared::{Lead, Result};

pub use serpapi::SerpApiClient;

// ---------------------------------------------------------------------------
// Search seam
// ---------------------------------------------------------------------------

/// One search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub location: String,
    pub max_results: u32,
}

/// One ranked organic result, as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
}

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return organic results in rank order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// First comma-separated entry of `services`, trimmed. `None` when blank.
pub fn primary_service(services: &str) -> Option<&str> {
    services
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Query text for a primary service.
pub fn lead_query(service: &str) -> String {
    format!("companies needing {service}")
}

/// Whether a search hit is usable as a lead.
fn is_lead(hit: &SearchHit) -> bool {
    !hit.title.trim().is_empty()
        && (hit.link.starts_with("http://") || hit.link.starts_with("https://"))
}

/// Find candidate client companies for the operator's services.
///
/// Returns leads in result order. Duplicate URLs on one result page are
/// passed through unchanged.
#[instrument(skip_all, fields(location = %location))]
pub async fn find_leads(
    provider: &dyn SearchProvider,
    services: &str,
    location: &str,
    max_results: u32,
) -> Vec<Lead> {
    let Some(service) = primary_service(services) else {
        warn!("services text is empty; nothing to search for");
        return Vec::new();
    };

    let query = SearchQuery {
        text: lead_query(service),
        location: location.to_string(),
        max_results,
    };
    info!(query = %query.text, "searching for leads");

    let hits = match provider.search(&query).await {
        Ok(hits) => hits,
        Err(e) => {
            match e.hint() {
                Some(hint) => warn!(error = %e, hint, "lead search failed"),
                None => warn!(error = %e, "lead search failed"),
            }
            return Vec::new();
        }
    };

    let total = hits.len();
    let leads: Vec<Lead> = hits
        .into_iter()
        .filter(is_lead)
        .map(|hit| Lead::new(hit.title, hit.link))
        .collect();

    info!(results = total, leads = leads.len(), "lead search complete");
    leads
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use leadforge_shared::LeadForgeError;

    /// Provider returning canned hits and recording every query.
    struct CannedSearch {
        reply: Mutex<Option<Result<Vec<SearchHit>>>>,
        seen: Mutex<Vec<SearchQuery>>,
    }

    impl CannedSearch {
        fn new(reply: Result<Vec<SearchHit>>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<SearchQuery> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for CannedSearch {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
            self.seen.lock().unwrap().push(query.clone());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn hit(title: &str, link: &str) -> SearchHit {
        SearchHit {
            title: title.into(),
            link: link.into(),
        }
    }

    #[test]
    fn primary_service_is_first_token() {
        assert_eq!(
            primary_service(" AI Audits , Data Pipelines, MLOps"),
            Some("AI Audits")
        );
        assert_eq!(primary_service("Consulting"), Some("Consulting"));
        assert_eq!(primary_service(""), None);
        assert_eq!(primary_service("  ,Data"), None);
    }

    #[tokio::test]
    async fn builds_query_from_first_service() {
        let provider = CannedSearch::new(Ok(vec![hit("Foo Inc", "http://foo.com")]));
        let leads = find_leads(&provider, "AI Audits, MLOps", "United States", 10).await;

        assert_eq!(leads, vec![Lead::new("Foo Inc", "http://foo.com")]);
        let queries = provider.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].text, "companies needing AI Audits");
        assert_eq!(queries[0].location, "United States");
        assert_eq!(queries[0].max_results, 10);
    }

    #[tokio::test]
    async fn empty_services_never_searches() {
        let provider = CannedSearch::new(Ok(vec![hit("Foo", "http://foo.com")]));
        assert!(find_leads(&provider, "   ", "United States", 10).await.is_empty());
        assert!(find_leads(&provider, ",,,", "United States", 10).await.is_empty());
        assert!(provider.queries().is_empty());
    }

    #[tokio::test]
    async fn filters_titles_and_schemes() {
        let provider = CannedSearch::new(Ok(vec![
            hit("Foo Inc", "https://foo.com"),
            hit("", "https://untitled.com"),
            hit("FTP", "ftp://files.example.com"),
            hit("Relative", "/about"),
            hit("Foo Careers", "https://foo.com"),
        ]));
        let leads = find_leads(&provider, "AI Audits", "United States", 10).await;

        assert_eq!(
            leads,
            vec![
                Lead::new("Foo Inc", "https://foo.com"),
                Lead::new("Foo Careers", "https://foo.com"),
            ]
        );
    }

    #[tokio::test]
    async fn provider_error_yields_no_leads() {
        let provider = CannedSearch::new(Err(LeadForgeError::Search(
            "Your account has run out of searches.".into(),
        )));
        let leads = find_leads(&provider, "AI Audits", "United States", 10).await;
        assert!(leads.is_empty());
    }
}
