//! Outreach email drafting.

use tracing::{info, instrument};

use leadforge_llm::{ChatMessage, ChatModel, ChatRequest};
use leadforge_shared::{ClientProfile, OutreachConfig, Result};

/// Persona for every draft.
fn persona_prompt(company: &str) -> String {
    format!(
        "You are a senior B2B expert at {company}.
You are writing a short, concise, and professional cold outreach email.
Your tone is confident, expert, and helpful, not \"salesy\".
DO NOT use buzzwords like \"revolutionize\" or \"unlock\".
Your goal is to get a reply."
    )
}

/// Per-lead drafting instructions.
fn draft_prompt(services: &str, profile: &ClientProfile, signature: &str) -> String {
    format!(
        "I need to write a cold email to a potential client.

My Company's Services:
{services}

Client Information:
- Business Summary: {summary}
- Industry: {industry}

Instructions:
1. Start with a brief observation about their company or industry (e.g. \"As a leader in the FinTech space...\").
2. Identify a specific, implied pain point for their industry (e.g. FinTech needs compliance; SaaS needs speed).
3. Connect ONE of my services directly to that exact pain point.
4. Keep the email to 3-4 short paragraphs.
5. End with a single, clear call to action (e.g. \"Are you free for a 15-minute call next week?\").
6. Sign off as \"{signature}\".

Draft the email.",
        summary = profile.summary,
        industry = profile.industry,
    )
}

/// Drafts one email per profiled lead.
pub struct EmailDrafter<'a> {
    model: &'a dyn ChatModel,
    outreach: &'a OutreachConfig,
}

impl<'a> EmailDrafter<'a> {
    pub fn new(model: &'a dyn ChatModel, outreach: &'a OutreachConfig) -> Self {
        Self { model, outreach }
    }

    /// Draft an email connecting one of `services` to the lead's industry.
    ///
    /// The completion is returned as-is.
    #[instrument(skip_all, fields(industry = %profile.industry))]
    pub async fn draft(&self, services: &str, profile: &ClientProfile) -> Result<String> {
        let request = ChatRequest::new()
            .message(ChatMessage::system(persona_prompt(&self.outreach.company)))
            .message(ChatMessage::user(draft_prompt(
                services,
                profile,
                &self.outreach.signature(),
            )));

        let email = self.model.chat(request).await?;
        info!(chars = email.len(), "email drafted");
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeModel;
    use leadforge_llm::Role;
    use leadforge_shared::LeadForgeError;

    fn profile() -> ClientProfile {
        ClientProfile {
            summary: "Foo sells widgets".into(),
            industry: "Manufacturing".into(),
        }
    }

    #[tokio::test]
    async fn prompt_carries_services_profile_and_signature() {
        let model = FakeModel::new(vec![Ok("Hi Foo team".into())]);
        let outreach = OutreachConfig::default();
        let drafter = EmailDrafter::new(&model, &outreach);

        let email = drafter.draft("AI Audits, MLOps", &profile()).await.expect("draft");
        assert_eq!(email, "Hi Foo team");

        let requests = model.requests();
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("revolutionize"));
        assert!(messages[1].content.contains("AI Audits, MLOps"));
        assert!(messages[1].content.contains("Foo sells widgets"));
        assert!(messages[1].content.contains("Industry: Manufacturing"));
        assert!(messages[1].content.contains(&outreach.signature()));
    }

    #[tokio::test]
    async fn model_failure_propagates() {
        let model = FakeModel::new(vec![Err(LeadForgeError::Model("timeout".into()))]);
        let outreach = OutreachConfig::default();
        let drafter = EmailDrafter::new(&model, &outreach);

        let err = drafter.draft("AI Audits", &profile()).await.unwrap_err();
        assert!(matches!(err, LeadForgeError::Model(_)));
    }
}
