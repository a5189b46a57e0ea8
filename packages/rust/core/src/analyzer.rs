//! Business analysis: the operator's own services, and each lead's profile.
//!
//! Neither operation returns an error. Self-analysis degrades to the
//! operator's own description; client analysis reports why no profile exists.

use tracing::{info, instrument, warn};

use leadforge_extract::TextSource;
use leadforge_llm::{ChatMessage, ChatModel, ChatRequest, parse_structured};
use leadforge_shared::{ClientProfile, LeadForgeError};

const SERVICES_PROMPT: &str = "Given the following context about a B2B company, identify and list \
its 3-5 most important, client-facing services.
Return ONLY a comma-separated list (e.g., AI Audits, Compliance-as-a-Service, DevSecOps).";

const ANALYST_SYSTEM_PROMPT: &str = "You are a concise B2B market analyst. Your job is to extract \
key information from a company's website text. You must only output a valid JSON object.";

const PROFILE_PROMPT: &str = "Analyze the following website text and provide two pieces of information:
1. summary: A one-sentence summary of what this company does.
2. industry: The company's primary industry (e.g. \"FinTech\", \"SaaS\", \"Healthcare\", \"E-commerce\", \"Manufacturing\").

Return your answer only as a single, valid JSON object, like this:
{\"summary\": \"...\", \"industry\": \"...\"}";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why self-analysis fell back to the operator's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    ExtractionFailed,
    ModelFailed,
}

/// The operator's services, inferred or given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfAnalysis {
    /// The model produced a services list from the site text.
    Inferred(String),
    /// The operator's description, returned unchanged.
    Fallback {
        services: String,
        reason: FallbackReason,
    },
}

impl SelfAnalysis {
    /// Services text to search and draft with.
    pub fn services(&self) -> &str {
        match self {
            Self::Inferred(services) => services,
            Self::Fallback { services, .. } => services,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Why a lead has no profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The site could not be fetched or had no text.
    Extraction,
    /// The model call failed.
    Model,
    /// The model answered with something other than the expected object.
    MalformedReply,
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Extraction => "site text unavailable",
            Self::Model => "model call failed",
            Self::MalformedReply => "model reply was not a valid profile",
        })
    }
}

/// Result of analyzing one lead's site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAnalysis {
    Profiled(ClientProfile),
    Unavailable(Unavailable),
}

impl ClientAnalysis {
    pub fn profile(&self) -> Option<&ClientProfile> {
        match self {
            Self::Profiled(profile) => Some(profile),
            Self::Unavailable(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Longest prefix of `text` with at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Page-text plus model analysis.
pub struct BusinessAnalyzer<'a> {
    source: &'a dyn TextSource,
    model: &'a dyn ChatModel,
    text_limit: usize,
}

impl<'a> BusinessAnalyzer<'a> {
    pub fn new(source: &'a dyn TextSource, model: &'a dyn ChatModel, text_limit: usize) -> Self {
        Self {
            source,
            model,
            text_limit,
        }
    }

    /// Infer the operator's client-facing services from their own site.
    #[instrument(skip(self, description))]
    pub async fn analyze_self(&self, url: &str, description: &str) -> SelfAnalysis {
        let fallback = |reason| SelfAnalysis::Fallback {
            services: description.to_string(),
            reason,
        };

        let text = match self.source.fetch_text(url).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("own site has no visible text; using the given description");
                return fallback(FallbackReason::ExtractionFailed);
            }
            Err(e) => {
                warn!(error = %e, "could not read own site; using the given description");
                return fallback(FallbackReason::ExtractionFailed);
            }
        };

        let context = format!(
            "User Description: {description}\n\nWebsite Text: {}",
            truncate_chars(&text, self.text_limit)
        );
        let request = ChatRequest::new().message(ChatMessage::user(format!(
            "{SERVICES_PROMPT}\n\nContext:\n{context}"
        )));

        match self.model.chat(request).await {
            Ok(reply) if !reply.trim().is_empty() => {
                let services = reply.trim().to_string();
                info!(services = %services, "inferred own services");
                SelfAnalysis::Inferred(services)
            }
            Ok(_) => {
                warn!("model returned no services; using the given description");
                fallback(FallbackReason::ModelFailed)
            }
            Err(e) => {
                warn!(error = %e, "services inference failed; using the given description");
                fallback(FallbackReason::ModelFailed)
            }
        }
    }

    /// Summarize a lead's site into a [`ClientProfile`].
    #[instrument(skip(self))]
    pub async fn analyze_client(&self, url: &str) -> ClientAnalysis {
        let text = match self.source.fetch_text(url).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => return ClientAnalysis::Unavailable(Unavailable::Extraction),
            Err(e) => {
                warn!(error = %e, "could not read lead site");
                return ClientAnalysis::Unavailable(Unavailable::Extraction);
            }
        };

        let request = ChatRequest::new()
            .message(ChatMessage::system(ANALYST_SYSTEM_PROMPT))
            .message(ChatMessage::user(format!(
                "{PROFILE_PROMPT}\n\nWebsite Text:\n{}",
                truncate_chars(&text, self.text_limit)
            )))
            .json();

        let reply = match self.model.chat(request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "client analysis model call failed");
                return ClientAnalysis::Unavailable(Unavailable::Model);
            }
        };

        match parse_structured::<ClientProfile>(&reply) {
            Ok(profile) if profile.is_complete() => {
                info!(industry = %profile.industry, "lead profiled");
                ClientAnalysis::Profiled(profile)
            }
            Ok(_) => {
                warn!("model returned a profile with an empty field");
                ClientAnalysis::Unavailable(Unavailable::MalformedReply)
            }
            Err(LeadForgeError::MalformedReply { message }) => {
                warn!(error = %message, "model did not return valid profile JSON");
                ClientAnalysis::Unavailable(Unavailable::MalformedReply)
            }
            Err(e) => {
                warn!(error = %e, "could not read profile reply");
                ClientAnalysis::Unavailable(Unavailable::MalformedReply)
            }
        }
    }
}
