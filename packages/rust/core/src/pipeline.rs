//! End-to-end `run` pipeline: self-analysis → discovery → dedup → per-lead
//! analyze, draft, render, upload, log.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use leadforge_discovery::{SearchProvider, find_leads};
use leadforge_extract::TextSource;
use leadforge_llm::ChatModel;
use leadforge_shared::{
    ArtifactLink, ClientProfile, Lead, LeadForgeError, LeadRecord, OutreachConfig, Result,
};

use crate::analyzer::{BusinessAnalyzer, ClientAnalysis, SelfAnalysis, Unavailable};
use crate::drafter::EmailDrafter;
use crate::portfolio::{render_portfolio, write_portfolio};
use crate::store::LeadStore;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The operator's own website.
    pub self_url: String,
    /// The operator's description of their business.
    pub description: String,
    /// Search location.
    pub location: String,
    /// Organic results requested from search.
    pub max_results: u32,
    /// Characters of page text handed to the model.
    pub text_limit: usize,
    /// Where portfolios are rendered.
    pub work_dir: PathBuf,
    /// Email signature.
    pub outreach: OutreachConfig,
    /// Skip every store interaction.
    pub dry_run: bool,
}

/// External services the pipeline talks to.
pub struct Collaborators<'a> {
    pub pages: &'a dyn TextSource,
    pub model: &'a dyn ChatModel,
    pub search: &'a dyn SearchProvider,
    /// Absent when no store could be opened; the run is then dry.
    pub store: Option<&'a dyn LeadStore>,
}

impl Collaborators<'_> {
    /// The store to use, if the run is not dry.
    fn active_store(&self, dry_run: bool) -> Option<&dyn LeadStore> {
        if dry_run { None } else { self.store }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Per-lead stage that can fail after a profile exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadStage {
    Draft,
    Portfolio,
    Record,
}

impl std::fmt::Display for LeadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft email",
            Self::Portfolio => "render portfolio",
            Self::Record => "append record",
        })
    }
}

/// Everything produced for a processed lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedLead {
    pub profile: ClientProfile,
    pub email: String,
    /// Local portfolio path. Removed after a confirmed upload.
    pub portfolio: PathBuf,
    /// Upload result; `None` in dry mode.
    pub link: Option<ArtifactLink>,
}

/// What happened to one discovered lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOutcome {
    Processed(Box<ProcessedLead>),
    /// Already logged in an earlier run.
    Duplicate,
    /// No profile could be built.
    Skipped(Unavailable),
    Failed { stage: LeadStage, reason: String },
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a lead is processed.
    fn lead_started(&self, lead: &Lead, current: usize, total: usize);
    /// Called after a lead is processed.
    fn lead_finished(&self, lead: &Lead, outcome: &LeadOutcome);
    /// Called when the pipeline completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn lead_started(&self, _lead: &Lead, _current: usize, _total: usize) {}
    fn lead_finished(&self, _lead: &Lead, _outcome: &LeadOutcome) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    pub self_analysis: SelfAnalysis,
    /// Leads returned by discovery.
    pub discovered: usize,
    /// Size of the known-URL set at the start of the run.
    pub known_urls: usize,
    /// One entry per discovered lead, in discovery order.
    pub outcomes: Vec<(Lead, LeadOutcome)>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Leads fully processed.
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, LeadOutcome::Processed(_)))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, LeadOutcome::Duplicate))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, LeadOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LeadOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&LeadOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full lead pipeline.
///
/// 1. Infer own services (falls back to the description)
/// 2. Discover leads
/// 3. Load known URLs (skipped in dry mode)
/// 4. For each new lead: analyze, draft, render, upload, append
///
/// Leads are processed one at a time in discovery order; a failure affects
/// only its own lead. Errors returned here happen before the lead loop.
#[instrument(skip_all, fields(url = %config.self_url, dry_run = config.dry_run))]
pub async fn run_pipeline(
    config: &RunConfig,
    deps: &Collaborators<'_>,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();
    let store = deps.active_store(config.dry_run);
    let dry_run = store.is_none();
    info!("starting lead pipeline");

    std::fs::create_dir_all(&config.work_dir)
        .map_err(|e| LeadForgeError::io(&config.work_dir, e))?;

    let analyzer = BusinessAnalyzer::new(deps.pages, deps.model, config.text_limit);
    let drafter = EmailDrafter::new(deps.model, &config.outreach);

    // --- Phase 1: Self-analysis ---
    progress.phase("Analyzing your business");
    let self_analysis = analyzer
        .analyze_self(&config.self_url, &config.description)
        .await;
    let services = self_analysis.services().to_string();

    // --- Phase 2: Discovery ---
    progress.phase("Searching for leads");
    let leads = find_leads(deps.search, &services, &config.location, config.max_results).await;
    let discovered = leads.len();

    // --- Phase 3: Known URLs ---
    let known = match store {
        Some(store) => {
            progress.phase("Loading known leads");
            store.known_urls().await
        }
        None => Default::default(),
    };
    info!(discovered, known = known.len(), "leads discovered");

    // --- Phase 4: Per-lead processing ---
    let mut outcomes = Vec::with_capacity(discovered);
    for (i, lead) in leads.into_iter().enumerate() {
        progress.lead_started(&lead, i + 1, discovered);

        let outcome = if known.contains(&lead.url) {
            info!(url = %lead.url, "already logged, skipping");
            LeadOutcome::Duplicate
        } else {
            process_lead(&lead, i + 1, &services, &config.work_dir, store, &analyzer, &drafter)
                .await
        };

        log_outcome(&lead, &outcome);
        progress.lead_finished(&lead, &outcome);
        outcomes.push((lead, outcome));
    }

    let summary = RunSummary {
        self_analysis,
        discovered,
        known_urls: known.len(),
        outcomes,
        dry_run,
        elapsed: start.elapsed(),
    };

    info!(
        processed = summary.processed(),
        duplicates = summary.duplicates(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "lead pipeline complete"
    );

    progress.done(&summary);
    Ok(summary)
}

#[instrument(skip_all, fields(lead = %lead.name, url = %lead.url))]
async fn process_lead(
    lead: &Lead,
    position: usize,
    services: &str,
    work_dir: &Path,
    store: Option<&dyn LeadStore>,
    analyzer: &BusinessAnalyzer<'_>,
    drafter: &EmailDrafter<'_>,
) -> LeadOutcome {
    let profile = match analyzer.analyze_client(&lead.url).await {
        ClientAnalysis::Profiled(profile) => profile,
        ClientAnalysis::Unavailable(reason) => return LeadOutcome::Skipped(reason),
    };

    let email = match drafter.draft(services, &profile).await {
        Ok(email) => email,
        Err(e) => return failed(LeadStage::Draft, e),
    };

    let content = render_portfolio(lead, &profile, services, &email);
    let portfolio = match write_portfolio(work_dir, position, &lead.name, &content) {
        Ok(path) => path,
        Err(e) => return failed(LeadStage::Portfolio, e),
    };

    let link = match store {
        Some(store) => {
            let link = store.upload_artifact(&portfolio, &lead.name).await;
            let record = LeadRecord::new(lead, &profile, &email, &link);
            if let Err(e) = store.append_record(&record).await {
                return failed(LeadStage::Record, e);
            }
            Some(link)
        }
        None => None,
    };

    LeadOutcome::Processed(Box::new(ProcessedLead {
        profile,
        email,
        portfolio,
        link,
    }))
}

fn failed(stage: LeadStage, e: LeadForgeError) -> LeadOutcome {
    match e.hint() {
        Some(hint) => warn!(%stage, error = %e, hint, "lead failed"),
        None => warn!(%stage, error = %e, "lead failed"),
    }
    LeadOutcome::Failed {
        stage,
        reason: e.to_string(),
    }
}

fn log_outcome(lead: &Lead, outcome: &LeadOutcome) {
    match outcome {
        LeadOutcome::Processed(p) => info!(
            lead = %lead.name,
            link = p.link.as_ref().map(ArtifactLink::as_cell).unwrap_or("-"),
            "lead processed"
        ),
        LeadOutcome::Skipped(reason) => info!(lead = %lead.name, %reason, "lead skipped"),
        LeadOutcome::Duplicate | LeadOutcome::Failed { .. } => {}
    }
}
