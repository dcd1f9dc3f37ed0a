use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use mneme_core::{
    BranchPattern, ChangeSize, CommitStyle, PatternSummary, SessionSnapshot, WorkFocus,
};
use regex::Regex;

use crate::catalog::FilterCatalog;

const COMMIT_EMOJI: [char; 5] = ['🚀', '✨', '🐛', '🔧', '📝'];
const MAX_FILE_TYPES: usize = 5;

/// Per-file stat rows such as `src/lib.rs | 12 +++---`.
static STAT_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s+[+-]").unwrap());

/// Built-in rules used to drop noise and secret-bearing files from the
/// file-type mix. User filter overrides do not apply here.
static BUILTIN_RULES: LazyLock<FilterCatalog> = LazyLock::new(FilterCatalog::default);

/// Summarize how the developer worked during the session.
pub fn extract(snapshot: &SessionSnapshot) -> PatternSummary {
    let commits = snapshot.commit_text();
    PatternSummary {
        commit_style: commit_style(&commits),
        work_focus: work_focus(&commits),
        file_types: file_types(snapshot),
        change_size: change_size(snapshot),
        branch_pattern: branch_pattern(snapshot.branch()),
    }
}

fn commit_style(commits: &str) -> CommitStyle {
    if commits.contains("feat:") || commits.contains("fix:") {
        CommitStyle::Conventional
    } else if commits.chars().any(|c| COMMIT_EMOJI.contains(&c)) {
        CommitStyle::Emoji
    } else {
        CommitStyle::None
    }
}

fn work_focus(commits: &str) -> Vec<WorkFocus> {
    let text = commits.to_lowercase();
    WorkFocus::ALL
        .into_iter()
        .filter(|focus| {
            let keywords: &[&str] = match focus {
                WorkFocus::Feature => &["feat"],
                WorkFocus::Bug => &["fix", "bug"],
                WorkFocus::Test => &["test"],
                WorkFocus::Refactor => &["refactor"],
                WorkFocus::Doc => &["doc"],
            };
            keywords.iter().any(|kw| text.contains(kw))
        })
        .collect()
}

fn file_types(snapshot: &SessionSnapshot) -> Vec<String> {
    snapshot
        .changed_paths()
        .filter(|path| !BUILTIN_RULES.is_trivial(path) && !BUILTIN_RULES.is_sensitive(path))
        .filter_map(|path| Path::new(path).extension().and_then(|e| e.to_str()))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_FILE_TYPES)
        .collect()
}

fn change_size(snapshot: &SessionSnapshot) -> Option<ChangeSize> {
    let stats = format!("{}{}", snapshot.diff_stats, snapshot.staged_stats);
    if stats.trim().is_empty() {
        return None;
    }
    Some(match STAT_ROW.find_iter(&stats).count() {
        0..=9 => ChangeSize::Small,
        10..=49 => ChangeSize::Medium,
        _ => ChangeSize::Large,
    })
}

fn branch_pattern(branch: &str) -> BranchPattern {
    if branch.starts_with("feature/") {
        BranchPattern::Feature
    } else if branch.starts_with("fix/") || branch.starts_with("bugfix/") {
        BranchPattern::Bugfix
    } else if branch.starts_with("release/") {
        BranchPattern::Release
    } else if matches!(branch, "main" | "master" | "develop") {
        BranchPattern::Main
    } else {
        BranchPattern::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mneme_core::SessionInfo;

    fn with_commits(commits: &[&str]) -> SessionSnapshot {
        SessionSnapshot {
            recent_commits: commits.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn conventional_beats_emoji() {
        let p = extract(&with_commits(&["✨ sparkle", "fix: crash"]));
        assert_eq!(p.commit_style, CommitStyle::Conventional);
        let p = extract(&with_commits(&["🐛 squash bug"]));
        assert_eq!(p.commit_style, CommitStyle::Emoji);
        let p = extract(&with_commits(&["wip"]));
        assert_eq!(p.commit_style, CommitStyle::None);
    }

    #[test]
    fn work_focus_follows_family_order() {
        let p = extract(&with_commits(&[
            "Update docs",
            "Refactor tests",
            "BUGFIX: null deref",
            "feat(api): add endpoint",
        ]));
        assert_eq!(
            p.work_focus,
            vec![
                WorkFocus::Feature,
                WorkFocus::Bug,
                WorkFocus::Test,
                WorkFocus::Refactor,
                WorkFocus::Doc,
            ]
        );
        assert!(extract(&with_commits(&[])).work_focus.is_empty());
    }

    #[test]
    fn file_types_exclude_noise_and_secrets() {
        let snap = SessionSnapshot {
            file_changes: vec![
                "M  src/a.rs".into(),
                "M  src/b.rs".into(),
                "M  web/app.ts".into(),
                "M  node_modules/x/index.js".into(),
                "M  certs/server.pem".into(),
                "M  config/api_key.json".into(),
                "?? Makefile".into(),
            ],
            ..Default::default()
        };
        let p = extract(&snap);
        assert_eq!(p.file_types, vec!["rs", "ts"]);
    }

    #[test]
    fn file_types_capped_at_five() {
        let snap = SessionSnapshot {
            file_changes: ["a.c", "b.go", "c.py", "d.rs", "e.ts", "f.md", "g.sh"]
                .iter()
                .map(|f| format!("M  {f}"))
                .collect(),
            ..Default::default()
        };
        assert_eq!(extract(&snap).file_types.len(), 5);
    }

    #[test]
    fn change_size_thresholds() {
        let rows = |n: usize| (0..n).map(|i| format!(" f{i}.rs | 3 ++-\n")).collect::<String>();
        let size = |stats: String| {
            extract(&SessionSnapshot {
                diff_stats: stats,
                ..Default::default()
            })
            .change_size
        };
        assert_eq!(size(String::new()), None);
        assert_eq!(size(rows(9)), Some(ChangeSize::Small));
        assert_eq!(size(rows(10)), Some(ChangeSize::Medium));
        assert_eq!(size(rows(49)), Some(ChangeSize::Medium));
        assert_eq!(size(rows(50)), Some(ChangeSize::Large));
    }

    #[test]
    fn branch_patterns() {
        let pattern = |b: &str| {
            extract(&SessionSnapshot {
                session_info: SessionInfo {
                    git_branch: b.into(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .branch_pattern
        };
        assert_eq!(pattern("feature/login"), BranchPattern::Feature);
        assert_eq!(pattern("fix/crash"), BranchPattern::Bugfix);
        assert_eq!(pattern("bugfix/crash"), BranchPattern::Bugfix);
        assert_eq!(pattern("release/1.2"), BranchPattern::Release);
        assert_eq!(pattern("develop"), BranchPattern::Main);
        assert_eq!(pattern("master"), BranchPattern::Main);
        assert_eq!(pattern("spike"), BranchPattern::None);
        assert_eq!(pattern(""), BranchPattern::None);
    }
}
