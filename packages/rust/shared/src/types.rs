//! Core domain types for the lead pipeline.

use serde::{Deserialize, Serialize};

/// Column headers of the lead sheet, in column order.
pub const SHEET_HEADERS: [&str; 6] = [
    "Client Name",
    "URL",
    "Summary",
    "Industry",
    "Email Draft",
    "Drive Link",
];

/// Zero-based index of the URL column in [`SHEET_HEADERS`].
pub const URL_COLUMN: usize = 1;

/// Sentinel written to the link column when the upload itself failed.
pub const UPLOAD_FAILED: &str = "UPLOAD_FAILED";

/// Sentinel written to the link column when the local artifact was missing.
pub const UPLOAD_FAILED_FILE_MISSING: &str = "UPLOAD_FAILED_FILE_MISSING";

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A candidate client company discovered via search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lead {
    /// Display name (the search result title).
    pub name: String,
    /// Company website.
    pub url: String,
}

impl Lead {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientProfile
// ---------------------------------------------------------------------------

/// What a lead's website says about the business.
///
/// Deserialized straight from the model's JSON reply, so unknown keys are
/// rejected: the reply must be exactly `{"summary": ..., "industry": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientProfile {
    /// One-sentence summary of what the company does.
    pub summary: String,
    /// Primary industry (e.g. "FinTech", "Manufacturing").
    pub industry: String,
}

impl ClientProfile {
    /// Both fields must carry text.
    pub fn is_complete(&self) -> bool {
        !self.summary.trim().is_empty() && !self.industry.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// ArtifactLink
// ---------------------------------------------------------------------------

/// Outcome of uploading a lead's portfolio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLink {
    /// Durable, shareable link to the uploaded file.
    Shared(String),
    /// The local file did not exist at upload time.
    FileMissing,
    /// The upload or share step failed.
    Failed,
}

impl ArtifactLink {
    /// Value written into the sheet's link column.
    pub fn as_cell(&self) -> &str {
        match self {
            Self::Shared(link) => link,
            Self::FileMissing => UPLOAD_FAILED_FILE_MISSING,
            Self::Failed => UPLOAD_FAILED,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }
}

impl std::fmt::Display for ArtifactLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_cell())
    }
}

// ---------------------------------------------------------------------------
// LeadRecord
// ---------------------------------------------------------------------------

/// One persisted sheet row. Created once per processed lead, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub name: String,
    pub url: String,
    pub summary: String,
    pub industry: String,
    pub email: String,
    pub artifact_link: String,
}

impl LeadRecord {
    /// Assemble a record from the per-lead pipeline products.
    pub fn new(lead: &Lead, profile: &ClientProfile, email: &str, link: &ArtifactLink) -> Self {
        Self {
            name: lead.name.clone(),
            url: lead.url.clone(),
            summary: profile.summary.clone(),
            industry: profile.industry.clone(),
            email: email.to_string(),
            artifact_link: link.as_cell().to_string(),
        }
    }

    /// Cells in [`SHEET_HEADERS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.url.clone(),
            self.summary.clone(),
            self.industry.clone(),
            self.email.clone(),
            self.artifact_link.clone(),
        ]
    }
}
