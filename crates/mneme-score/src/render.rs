//! Memory content and metadata rendering.

use mneme_core::{now_rfc3339, MemoryRecord, PatternSummary, SessionSnapshot, NO_BRANCH};
use serde_json::json;

use crate::catalog::FilterCatalog;
use crate::significance::Significance;

const BASE_TAGS: [&str; 3] = ["session_milestone", "claude_code", "automated"];
const INSIGHT_TAGS: [&str; 4] = ["pattern", "insight", "work_style", "automated"];

/// Narrative summary of a session, e.g.
/// `Claude session in demo. on branch main. - Made 2 commits. - Used conventional_commits`.
pub fn render_content(
    snapshot: &SessionSnapshot,
    sig: &Significance,
    patterns: &PatternSummary,
) -> String {
    let info = &snapshot.session_info;
    let project = non_empty_or(&info.project_name, "Unknown Project");
    let mut parts = vec![format!("Claude session in {project}")];

    if !info.git_branch.is_empty() && info.git_branch != NO_BRANCH {
        parts.push(format!("on branch {}", info.git_branch));
    }
    for reason in sig.top_reasons(2) {
        parts.push(format!("- {reason}"));
    }
    if let Some(style) = patterns.commit_style.label() {
        parts.push(format!("- Used {style}"));
    }
    if !patterns.work_focus.is_empty() {
        parts.push(format!("- Focused on: {}", patterns.focus_labels(2).join(", ")));
    }
    if let Some(size) = patterns.change_size {
        parts.push(format!("- Change size: {}", size.as_str()));
    }

    parts.join(". ")
}

/// Tags for a session memory: base tags, one per work-focus family, then the level.
pub fn session_tags(
    sig: &Significance,
    patterns: &PatternSummary,
    catalog: &FilterCatalog,
) -> Vec<String> {
    let mut tags: Vec<String> = BASE_TAGS.iter().map(|t| t.to_string()).collect();
    for focus in &patterns.work_focus {
        let tag = focus.tag().to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags.push(catalog.level_for(sig.score).as_str().to_string());
    tags
}

/// The primary memory for an accepted session.
pub fn session_record(
    snapshot: &SessionSnapshot,
    sig: &Significance,
    patterns: &PatternSummary,
    catalog: &FilterCatalog,
    content: String,
) -> MemoryRecord {
    let info = &snapshot.session_info;
    let metadata = json!({
        "tags": session_tags(sig, patterns, catalog),
        "type": "session_completion",
        "project": non_empty_or(&info.project_name, "unknown"),
        "git_branch": info.git_branch,
        "git_repo": info.git_repo,
        "significance_score": sig.score,
        "significance_level": catalog.level_for(sig.score),
        "timestamp": info.timestamp.clone().unwrap_or_else(now_rfc3339),
        "patterns": patterns,
        "reasons": sig.reasons,
    });
    MemoryRecord::now(content, metadata)
}

/// A secondary work-style memory, when the session shows a commit style or focus.
pub fn insight_record(
    snapshot: &SessionSnapshot,
    patterns: &PatternSummary,
) -> Option<MemoryRecord> {
    if !patterns.has_work_style() {
        return None;
    }
    let project = non_empty_or(&snapshot.session_info.project_name, "project");

    let mut clauses = Vec::new();
    if let Some(style) = patterns.commit_style.label() {
        clauses.push(format!("uses {style}"));
    }
    if !patterns.work_focus.is_empty() {
        clauses.push(format!("focuses on {}", patterns.focus_labels(2).join(", ")));
    }
    if !patterns.file_types.is_empty() {
        let types: Vec<&str> = patterns.file_types.iter().take(3).map(String::as_str).collect();
        clauses.push(format!("works with {} files", types.join(", ")));
    }

    let content = format!("Work pattern in {project}: {}", clauses.join(", "));
    let metadata = json!({
        "tags": INSIGHT_TAGS,
        "type": "work_pattern",
        "project": non_empty_or(&snapshot.session_info.project_name, "unknown"),
        "timestamp": now_rfc3339(),
    });
    Some(MemoryRecord::now(content, metadata))
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
