use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use shift_leader_dashboard::loader::DataSource;
use shift_leader_dashboard::taxonomy::TaskTaxonomy;
use shift_leader_dashboard::{report, stats, trends};

const SHEET_ID_ENV: &str = "CHECKLIST_SHEET_ID";

#[derive(Parser)]
#[command(name = "shift-dashboard")]
#[command(about = "Shift leader checklist compliance dashboard", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// JSON file replacing the built-in task sections
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Markdown)]
    format: Format,

    /// Log filter directive, e.g. `info` or `shift_leader_dashboard=debug`
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("source")
        .args(["csv", "url", "sheet_id"])
        .multiple(false)
))]
struct SourceArgs {
    /// Read submissions from a local CSV export
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Fetch the CSV from a URL
    #[arg(long)]
    url: Option<String>,
    /// Google Sheet ID; defaults to $CHECKLIST_SHEET_ID
    #[arg(long)]
    sheet_id: Option<String>,
}

impl SourceArgs {
    fn resolve(&self) -> anyhow::Result<DataSource> {
        if let Some(path) = &self.csv {
            return Ok(DataSource::File(path.clone()));
        }
        if let Some(url) = &self.url {
            return Ok(DataSource::Url(url.clone()));
        }
        let sheet_id = match &self.sheet_id {
            Some(id) => id.clone(),
            None => std::env::var(SHEET_ID_ENV).with_context(|| {
                format!("pass --csv, --url or --sheet-id, or set {SHEET_ID_ENV}")
            })?,
        };
        Ok(DataSource::google_sheet(&sheet_id))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most recent shift for the incoming shift leader
    Handoff,
    /// Completion statistics across submissions
    Summary {
        #[arg(long, default_value_t = 7)]
        since_days: i64,
    },
    /// Most missed tasks, top staff and handoff compliance
    Trends {
        #[arg(long, default_value_t = trends::DEFAULT_LIMIT)]
        limit: usize,
    },
    /// Write all views to a single file
    Report {
        #[arg(long, default_value_t = 7)]
        since_days: i64,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let taxonomy = match &cli.taxonomy {
        Some(path) => TaskTaxonomy::from_path(path)?,
        None => TaskTaxonomy::default(),
    };
    let source = cli.source.resolve()?;
    let submissions = source
        .load()
        .await
        .with_context(|| format!("error loading data from {}", source.describe()))?;

    let Some(latest) = submissions.first() else {
        println!("No submissions yet. Data will appear here once shift leaders submit checklists.");
        return Ok(());
    };
    let now = Local::now().naive_local();

    match cli.command {
        Commands::Handoff => {
            let handoff = report::build_handoff(latest, &taxonomy);
            match cli.format {
                Format::Markdown => print!("{}", report::render_handoff(&handoff)),
                Format::Json => println!("{}", to_json(&handoff)?),
            }
        }
        Commands::Summary { since_days } => {
            let summary = stats::summarize(&submissions, &taxonomy, now, since_days);
            match cli.format {
                Format::Markdown => print!("{}", report::render_summary(&summary)),
                Format::Json => println!("{}", to_json(&summary)?),
            }
        }
        Commands::Trends { limit } => {
            let outcome = trends::analyze(&submissions, &taxonomy, limit);
            match cli.format {
                Format::Markdown => print!("{}", report::render_trends(&outcome)),
                Format::Json => println!("{}", to_json(&outcome)?),
            }
        }
        Commands::Report { since_days, out } => {
            let handoff = report::build_handoff(latest, &taxonomy);
            let summary = stats::summarize(&submissions, &taxonomy, now, since_days);
            let outcome = trends::analyze(&submissions, &taxonomy, trends::DEFAULT_LIMIT);
            let rendered = match cli.format {
                Format::Markdown => report::build_report(&handoff, &summary, &outcome),
                Format::Json => to_json(&serde_json::json!({
                    "handoff": handoff,
                    "summary": summary,
                    "trends": outcome,
                }))?,
            };
            std::fs::write(&out, rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
