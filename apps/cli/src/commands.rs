//! CLI command definitions, routing, and tracing setup.

use std::str::FromStr;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use arxivcode_core::{Pipeline, ProgressReporter, RunMode};
use arxivcode_shared::{init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// arxivcode — keep a daily digest of arXiv papers with code.
#[derive(Parser)]
#[command(
    name = "arxivcode",
    version,
    about = "Fetch daily arXiv papers, find their code repositories, and render a digest.",
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
    /// Execute one pipeline run and regenerate the digest.
    Run {
        /// Run mode: "first_run" (backfill the full window) or "daily_run"
        /// (fetch yesterday and merge). Validated before anything is written.
        #[arg(long, env = "RUN_MODE", default_value = "daily_run")]
        mode: String,
    },

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
    /// Write a default arxivcode.toml to the working directory.
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
        0 => "arxivcode=info",
        1 => "arxivcode=debug",
        _ => "arxivcode=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
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
        Command::Run { mode } => cmd_run(&mode).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_run(mode: &str) -> Result<()> {
    // Reject unknown modes before the store or digest can be touched.
    let mode = RunMode::from_str(mode)?;
    let config = load_config()?;

    info!(
        %mode,
        store = %config.output.store_path.display(),
        digest = %config.output.digest_path.display(),
        "starting run"
    );

    let pipeline = Pipeline::new(config)?;
    let reporter = CliProgress::new();
    let summary = pipeline.run(mode, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Run complete ({})", summary.mode);
    println!("  Dates fetched:     {}", summary.dates_processed);
    println!("  Entries found:     {}", summary.entries_found);
    println!("  Dates in store:    {}", summary.store_dates);
    println!("  Time:              {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn date_done(&self, date: &str, current: usize, total: usize, with_code: usize) {
        self.spinner
            .println(format!("[{current}/{total}] {date}: {with_code} with code"));
    }
}
