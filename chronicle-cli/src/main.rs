/*!
Chronicle CLI - command-line interface for the documentation history engine.

Exposes the service operations (snapshot, check, compact, search, evolution,
timeline, compare, init) over a local workspace. Results are printed as JSON
through a single boundary; the timeline is also available as a table.
*/

mod capture;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::debug;

use capture::LocalWorkspaceCapture;
use chronicle_core::{ChronicleConfig, HistoryService};

#[derive(Parser)]
#[command(name = "chronicle")]
#[command(about = "CLI for the chronicle documentation history engine")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the history directories and default configuration
    Init,
    /// Capture a snapshot for a milestone
    Snapshot {
        /// Milestone description, e.g. 'feature-implementation'
        milestone: String,
    },
    /// Report whether compaction is due
    Check,
    /// Consolidate due snapshots into an archive bundle
    Compact,
    /// Search active and archived history
    Search {
        term: String,
        /// Maximum number of matches to return
        #[arg(short, long, default_value_t = 5)]
        max_results: usize,
    },
    /// List active snapshots matching a glob pattern
    Files { pattern: String },
    /// Show how a component evolved across the history
    Evolution { component: String },
    /// List every document in the history as a dated event
    Timeline {
        /// Render as JSON instead of a table
        #[arg(short, long)]
        json: bool,
    },
    /// Compare two snapshots section by section
    Compare { first: String, second: String },
}

#[derive(Tabled)]
struct TimelineRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    event_type: String,
    #[tabled(rename = "Milestone")]
    milestone: String,
    #[tabled(rename = "File")]
    source_file: String,
}

#[derive(Serialize)]
struct ErrorReply {
    success: bool,
    message: String,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    debug!(root = %root.display(), "resolved workspace root");

    let config = ChronicleConfig::load_or_default(&root)
        .with_context(|| format!("loading configuration under {}", root.display()))?;
    let capture = LocalWorkspaceCapture::new(root.clone(), &config);
    let service = HistoryService::new(&root, config, capture)
        .context("invalid chronicle configuration")?;

    match cli.command {
        Commands::Init => print_json(&service.init())?,
        Commands::Snapshot { milestone } => print_json(&service.create_snapshot(&milestone))?,
        Commands::Check => emit(service.check_compaction())?,
        Commands::Compact => emit(service.compact())?,
        Commands::Search { term, max_results } => emit(service.search(&term, max_results))?,
        Commands::Files { pattern } => emit(service.find_files(&pattern))?,
        Commands::Evolution { component } => emit(service.get_evolution(&component))?,
        Commands::Timeline { json } => {
            if json {
                emit(service.get_timeline())?;
            } else {
                print_timeline_table(&service)?;
            }
        }
        Commands::Compare { first, second } => print_json(&service.compare(&first, &second))?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// The single serialization boundary: successful outcomes print as-is,
/// errors fold into a `{success: false, message}` record.
fn emit<T: Serialize>(outcome: chronicle_core::Result<T>) -> Result<(), anyhow::Error> {
    match outcome {
        Ok(value) => print_json(&value),
        Err(e) => print_json(&ErrorReply {
            success: false,
            message: e.to_string(),
        }),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_timeline_table(
    service: &HistoryService<LocalWorkspaceCapture>,
) -> Result<(), anyhow::Error> {
    let timeline = match service.get_timeline() {
        Ok(timeline) => timeline,
        Err(e) => {
            return print_json(&ErrorReply {
                success: false,
                message: e.to_string(),
            })
        }
    };

    if timeline.events.is_empty() {
        println!("No history found");
        return Ok(());
    }

    let rows: Vec<TimelineRow> = timeline
        .events
        .into_iter()
        .map(|event| TimelineRow {
            date: event.date.to_string(),
            event_type: event.event_type,
            milestone: event.milestone,
            source_file: event.source_file,
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}
