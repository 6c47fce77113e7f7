use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use call_analytics::constants;
use call_analytics::observability::{self, metrics};
use call_analytics::pipeline::export;
use call_analytics::{AnalyticsConfig, Pipeline, Report};

#[derive(Parser)]
#[command(name = "call_analytics")]
#[command(about = "Agent summaries, call distributions and missed-call alerts for call exports")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to $CALL_ANALYTICS_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to a daily file in this directory
    #[arg(long, global = true, env = constants::LOG_DIR_ENV)]
    log_dir: Option<PathBuf>,

    /// Print collected metrics in Prometheus text format to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RangeArgs {
    /// First day to include (YYYY-MM-DD); defaults to the earliest call
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD); defaults to the latest call
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the analytics report for a call export
    Report {
        /// CSV export to analyze
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Emit the report as JSON instead of text tables
        #[arg(long)]
        json: bool,
    },
    /// Write the filtered attributed records to CSV
    Export {
        /// CSV export to analyze
        input: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Destination file
        #[arg(long, short, default_value = constants::DEFAULT_EXPORT_FILE)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = observability::init_logging(cli.log_dir.as_deref());
    let metrics_handle = if cli.metrics { metrics::init() } else { None };

    let config = AnalyticsConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let multiplier = config.alerts.std_dev_multiplier;
    let pipeline = Pipeline::new(config);

    match cli.command {
        Commands::Report { input, range, json } => {
            let processed = pipeline
                .run(&input)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            let range = processed.resolve_range(range.from, range.to)?;
            let report = Report::build(&processed.filter(range), multiplier);

            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Commands::Export { input, range, output } => {
            let processed = pipeline
                .run(&input)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            let range = processed.resolve_range(range.from, range.to)?;
            let filtered = processed.filter(range);

            if filtered.attributed.is_empty() {
                warn!("No attributed records in range, writing header only");
            }
            let written = export::write_export(&output, &filtered.attributed)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(rows = written, output = %output.display(), "Export complete");
            println!("Wrote {} rows to {}", written, output.display());
        }
    }

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(())
}
