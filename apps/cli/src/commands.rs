//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Section;
use color_eyre::eyre::{Report, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use url::Url;

use leadforge_core::pipeline::{
    Collaborators, LeadOutcome, ProgressReporter, RunConfig, RunSummary, run_pipeline,
};
use leadforge_core::report::{LeadReport, lead_report};
use leadforge_core::store::{LeadStore, SheetLeadStore};
use leadforge_discovery::SerpApiClient;
use leadforge_extract::{ExtractOptions, PageTextExtractor};
use leadforge_llm::{ChatModel, OllamaClient};
use leadforge_shared::{
    AppConfig, Lead, LeadForgeError, init_config, load_config, search_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LeadForge: find B2B leads and draft outreach for each one.
#[derive(Parser)]
#[command(
    name = "leadforge",
    version,
    about = "Find B2B leads for your services and draft a personalized pitch for each.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full pipeline: analyze your site, find leads, draft and log outreach.
    Run {
        /// Your business website.
        url: String,

        /// Short description of your business (used if your site can't be read).
        #[arg(short, long)]
        desc: String,

        /// Dev mode: draft everything but never touch the lead store.
        #[arg(long)]
        dev: bool,

        /// Search location (defaults to `[defaults] location`).
        #[arg(long)]
        location: Option<String>,
    },

    /// Summarize the logged leads by industry.
    Analyze,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadforge=info",
        1 => "leadforge=debug",
        _ => "leadforge=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            url,
            desc,
            dev,
            location,
        } => cmd_run(&url, &desc, dev, location).await,
        Command::Analyze => cmd_analyze().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Attach the error's remediation hint, if any, as a suggestion.
fn with_hint(e: LeadForgeError) -> Report {
    let hint = e.hint();
    let report = Report::new(e);
    match hint {
        Some(hint) => report.suggestion(hint),
        None => report,
    }
}

/// Check the operator's site URL. A bad URL is not fatal: extraction fails
/// and the run falls back to the description.
fn check_site_url(raw: &str) -> std::result::Result<(), LeadForgeError> {
    let url = Url::parse(raw)
        .map_err(|e| LeadForgeError::validation(format!("site URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        _ => Err(LeadForgeError::validation(format!(
            "site URL '{raw}' is not an http:// or https:// address"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(url: &str, desc: &str, dev: bool, location: Option<String>) -> Result<()> {
    let config = load_config().map_err(with_hint)?;
    if let Err(e) = check_site_url(url) {
        warn!(error = %e, "your site will likely be unreadable; using the description");
    }

    let model = OllamaClient::new(&config.llm).map_err(with_hint)?;
    model.health_check().await.map_err(with_hint)?;
    info!(model = model.model_id(), "model service is reachable");

    let pages = PageTextExtractor::new(&ExtractOptions::default()).map_err(with_hint)?;

    let api_key = match search_api_key(&config.search) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(error = %e, "lead search will return nothing");
            None
        }
    };
    let search = SerpApiClient::new(&config.search, api_key).map_err(with_hint)?;

    let store = if dev {
        info!("dev mode: the lead store is disabled");
        None
    } else {
        match SheetLeadStore::connect(&config.store).await {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(
                    error = %e,
                    hint = e.hint().unwrap_or(""),
                    "could not open the lead store; continuing in dev mode"
                );
                None
            }
        }
    };

    let run_config = RunConfig {
        self_url: url.to_string(),
        description: desc.to_string(),
        location: location.unwrap_or_else(|| config.defaults.location.clone()),
        max_results: config.search.max_results,
        text_limit: config.defaults.text_limit,
        work_dir: PathBuf::from(&config.defaults.work_dir),
        outreach: config.outreach.clone(),
        dry_run: dev,
    };

    let deps = Collaborators {
        pages: &pages,
        model: &model,
        search: &search,
        store: store.as_ref().map(|s| s as &dyn LeadStore),
    };

    let reporter = CliProgress::new();
    let summary = run_pipeline(&run_config, &deps, &reporter)
        .await
        .map_err(with_hint)?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.dry_run {
        for (lead, outcome) in &summary.outcomes {
            if let LeadOutcome::Processed(processed) = outcome {
                println!();
                println!("--- {} ({}) ---", lead.name, lead.url);
                println!("{}", processed.email.trim());
                println!("Portfolio: {}", processed.portfolio.display());
            }
        }
    }

    println!();
    if summary.self_analysis.is_fallback() {
        println!("  Services (from your description): {}", summary.self_analysis.services());
    } else {
        println!("  Services: {}", summary.self_analysis.services());
    }
    println!("  Discovered:  {}", summary.discovered);
    println!("  Duplicates:  {}", summary.duplicates());
    println!("  Skipped:     {}", summary.skipped());
    println!("  Failed:      {}", summary.failed());
    println!("  Processed:   {}", summary.processed());
    println!(
        "  Mode:        {}",
        if summary.dry_run { "dev (nothing logged)" } else { "live" }
    );
    println!("  Time:        {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

async fn cmd_analyze() -> Result<()> {
    let config = load_config().map_err(with_hint)?;
    let store = SheetLeadStore::connect(&config.store)
        .await
        .map_err(with_hint)?;

    let report = lead_report(&store).await.map_err(with_hint)?;
    println!("{}", format_report(&report));
    Ok(())
}

fn format_report(report: &LeadReport) -> String {
    match report {
        LeadReport::NoData => "No data to analyze. Run the 'run' command first.".to_string(),
        LeadReport::MissingIndustryColumn { total } => format!(
            "Total leads: {total}\nNo 'Industry' column found; cannot break down by industry."
        ),
        LeadReport::Breakdown { total, industries } => {
            let width = industries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            let mut out = format!("Total leads: {total}\n\nLeads by industry:\n");
            for (name, count) in industries {
                out.push_str(&format!("  {name:<width$}  {count}\n"));
            }
            out.trim_end().to_string()
        }
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config().map_err(with_hint)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config().map_err(with_hint)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Spinner-based progress reporter for the terminal.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn lead_started(&self, lead: &Lead, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Lead [{current}/{total}] {}", lead.name));
    }

    fn lead_finished(&self, lead: &Lead, outcome: &LeadOutcome) {
        let line = match outcome {
            LeadOutcome::Processed(_) => format!("  ✓ {}", lead.name),
            LeadOutcome::Duplicate => format!("  = {} (already logged)", lead.name),
            LeadOutcome::Skipped(reason) => format!("  - {} ({reason})", lead.name),
            LeadOutcome::Failed { stage, .. } => format!("  ✗ {} ({stage} failed)", lead.name),
        };
        self.spinner.println(line);
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
