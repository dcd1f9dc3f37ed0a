mod cmd_process;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "mneme",
    version,
    about = "Score a coding session and queue it as a memory if it matters"
)]
struct Cli {
    /// Session snapshot JSON written by the session-end hook
    session_file: PathBuf,
    /// Memory queue file (defaults to ~/.claude/scripts/memory-queue.jsonl)
    #[arg(long, env = "MNEME_QUEUE_FILE")]
    queue_file: Option<PathBuf>,
    /// Filter catalog overrides (defaults to ~/.claude/scripts/memory-filters.json)
    #[arg(long, env = "MNEME_FILTERS_FILE")]
    filters_file: Option<PathBuf>,
    /// Score and summarize without writing to the queue
    #[arg(long)]
    dry_run: bool,
    /// Print the decision report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mneme=info,mneme_pipeline=info,mneme_score=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let queue_file = cli.queue_file.unwrap_or_else(mneme_queue::default_queue_file);
    let filters_file = cli
        .filters_file
        .unwrap_or_else(mneme_queue::default_filters_file);

    let result = cmd_process::execute(&cmd_process::ProcessParams {
        session_file: &cli.session_file,
        queue_file: &queue_file,
        filters_file: &filters_file,
        dry_run: cli.dry_run,
        json: cli.json,
    });
    if let Err(e) = result {
        tracing::error!("error processing session: {e:?}");
        std::process::exit(1);
    }
}
