//! Additive significance scoring.
//!
//! Each signal adds a fixed or capped contribution and, usually, a reason.
//! Reasons are kept in contribution order; the formatter quotes the first two.

use std::sync::LazyLock;

use mneme_core::SessionSnapshot;
use regex::Regex;
use serde::Serialize;

use crate::catalog::FilterCatalog;

/// Reason text used instead of a file name that looks like it holds secrets.
pub const WITHHELD_FILE_REASON: &str = "Modified sensitive file (name withheld)";

/// Project/branch words that mark a session as high-stakes. First hit only.
const IMPORTANT_KEYWORDS: [&str; 5] = [
    "production",
    "release",
    "hotfix",
    "security",
    "critical",
];

const FILE_COUNT_POINTS: f64 = 2.0;
const COMMIT_POINTS: f64 = 3.0;
const SIGNIFICANT_COMMIT_POINTS: f64 = 2.0;
const LINES_PER_POINT: f64 = 20.0;
const LINES_CAP: f64 = 5.0;
const IMPORTANT_CONTEXT_POINTS: f64 = 3.0;
const BRANCH_POINTS: f64 = 1.0;

static INSERTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+insertions?").unwrap());
static DELETIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+deletions?").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Significance {
    pub score: f64,
    pub reasons: Vec<String>,
}

impl Significance {
    fn add(&mut self, points: f64, reason: Option<String>) {
        self.score += points;
        if let Some(reason) = reason {
            self.reasons.push(reason);
        }
    }

    pub fn top_reasons(&self, n: usize) -> &[String] {
        &self.reasons[..self.reasons.len().min(n)]
    }
}

/// Score one session against the filter catalog.
pub fn score(snapshot: &SessionSnapshot, catalog: &FilterCatalog) -> Significance {
    let mut sig = Significance::default();

    let files: Vec<&str> = snapshot
        .changed_paths()
        .filter(|path| !catalog.is_trivial(path))
        .collect();
    score_files(&mut sig, &files, catalog);
    score_commits(&mut sig, snapshot, catalog);
    score_line_changes(&mut sig, snapshot, catalog);
    score_context(&mut sig, snapshot);

    sig
}

fn score_files(sig: &mut Significance, files: &[&str], catalog: &FilterCatalog) {
    if files.len() >= catalog.minimum_changes {
        sig.add(
            FILE_COUNT_POINTS,
            Some(format!("Modified {} files", files.len())),
        );
    }
    for path in files {
        let Some((_, weight)) = catalog.weight_for(path) else {
            continue;
        };
        let reason = (weight >= 2.0).then(|| {
            if catalog.is_sensitive(path) {
                WITHHELD_FILE_REASON.to_string()
            } else {
                format!("Modified code file: {path}")
            }
        });
        sig.add(weight * 0.5, reason);
    }
}

fn score_commits(sig: &mut Significance, snapshot: &SessionSnapshot, catalog: &FilterCatalog) {
    let commits: Vec<&str> = snapshot.commits().collect();
    if commits.is_empty() {
        return;
    }
    sig.add(
        COMMIT_POINTS * commits.len() as f64,
        Some(format!("Made {} commits", commits.len())),
    );
    for commit in commits {
        if let Some(pattern) = catalog.significant_match(commit) {
            sig.add(
                SIGNIFICANT_COMMIT_POINTS,
                Some(format!("Significant commit pattern: {pattern}")),
            );
        }
    }
}

/// Total of every `<n> insertion(s)` and `<n> deletion(s)` in the stats text.
pub fn total_lines_changed(stats: &str) -> u64 {
    INSERTIONS
        .captures_iter(stats)
        .chain(DELETIONS.captures_iter(stats))
        .filter_map(|c| c[1].parse::<u64>().ok())
        .fold(0u64, u64::saturating_add)
}

fn score_line_changes(
    sig: &mut Significance,
    snapshot: &SessionSnapshot,
    catalog: &FilterCatalog,
) {
    let total = total_lines_changed(&snapshot.stats_text());
    if total >= catalog.minimum_lines {
        sig.add(
            (total as f64 / LINES_PER_POINT).min(LINES_CAP),
            Some(format!("Changed {total} lines")),
        );
    }
}

fn score_context(sig: &mut Significance, snapshot: &SessionSnapshot) {
    let project = snapshot.session_info.project_name.to_lowercase();
    let branch = snapshot.branch().to_lowercase();

    if let Some(keyword) = IMPORTANT_KEYWORDS
        .iter()
        .find(|kw| project.contains(*kw) || branch.contains(*kw))
    {
        sig.add(
            IMPORTANT_CONTEXT_POINTS,
            Some(format!("Important context: {keyword}")),
        );
    }

    if branch.starts_with("feature/") || branch.starts_with("fix/") {
        sig.add(
            BRANCH_POINTS,
            Some(format!("Feature/fix branch: {}", snapshot.branch())),
        );
    }
}
