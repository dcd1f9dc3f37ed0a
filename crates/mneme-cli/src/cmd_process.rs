use anyhow::Context;
use mneme_pipeline::{Outcome, Report, SessionPipeline};
use mneme_queue::Queue;
use std::path::Path;

pub struct ProcessParams<'a> {
    pub session_file: &'a Path,
    pub queue_file: &'a Path,
    pub filters_file: &'a Path,
    pub dry_run: bool,
    pub json: bool,
}

/// `mneme <session_file>`
///
/// Rejected and duplicate sessions return `Ok`. A failed queue write is an
/// error so the hook sees a non-zero exit.
pub fn execute(params: &ProcessParams<'_>) -> anyhow::Result<()> {
    let snapshot = mneme_core::load_snapshot(params.session_file)?;
    let catalog = mneme_score::load_catalog(Some(params.filters_file));
    let queue = Queue::new(params.queue_file);

    let report = SessionPipeline::new(&catalog, &queue)
        .dry_run(params.dry_run)
        .process(&snapshot);

    if params.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, params.dry_run);
    }

    if let Outcome::WriteFailed { error, .. } = &report.outcome {
        return Err(anyhow::anyhow!("{error}"))
            .with_context(|| format!("failed to queue memory in {}", queue.path().display()));
    }
    Ok(())
}

fn print_report(report: &Report, dry_run: bool) {
    let sig = &report.significance;
    println!("Session significance score: {:.1}", sig.score);
    if sig.reasons.is_empty() {
        println!("Reasons: (none)");
    } else {
        println!("Reasons: {}", sig.reasons.join(", "));
    }

    match &report.outcome {
        Outcome::Rejected { threshold } => {
            println!("Session not significant enough (threshold: {threshold})");
        }
        Outcome::Duplicate { .. } => {
            println!("Similar memory already exists, skipping");
        }
        Outcome::Accepted {
            content,
            level,
            insight_written,
        } => {
            if dry_run {
                println!("[dry-run] would queue {level} memory: {}", preview(content));
            } else {
                println!("Queued {level} memory: {}", preview(content));
                if *insight_written {
                    println!("Stored additional work pattern insight");
                }
            }
        }
        Outcome::WriteFailed { error, .. } => {
            println!("Error queuing memory: {error}");
        }
    }
}

/// First 100 characters, with an ellipsis when cut.
fn preview(content: &str) -> String {
    match content.char_indices().nth(100) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}
