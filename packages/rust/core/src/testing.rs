//! In-memory collaborators for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use leadforge_discovery::{SearchHit, SearchProvider, SearchQuery};
use leadforge_extract::TextSource;
use leadforge_llm::{ChatModel, ChatRequest};
use leadforge_shared::{LeadForgeError, Result};

/// Pages keyed by URL; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct FakePages {
    pages: HashMap<String, String>,
}

impl FakePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl TextSource for FakePages {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| LeadForgeError::Network(format!("{url}: connection refused")))
    }
}

/// Replies handed out in order; records every request.
pub struct FakeModel {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeModel {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn chat(&self, request: ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LeadForgeError::Model("no scripted reply".into())))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn model_id(&self) -> &str {
        "fake"
    }
}

/// Returns the same hits for every query.
pub struct FakeSearch {
    hits: Vec<SearchHit>,
}

impl FakeSearch {
    pub fn new(hits: &[(&str, &str)]) -> Self {
        Self {
            hits: hits
                .iter()
                .map(|(title, link)| SearchHit {
                    title: title.to_string(),
                    link: link.to_string(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}
