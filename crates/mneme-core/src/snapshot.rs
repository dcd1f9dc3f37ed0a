use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// Branch name used when the session was not inside a git checkout.
pub const NO_BRANCH: &str = "no-branch";

/// Identity of the project a session ran in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub git_branch: String,
    #[serde(default)]
    pub git_repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One development session's activity, as captured by the session hook.
///
/// `file_changes` and `recent_commits` accept either a newline-joined string
/// (what `git status --porcelain` / `git log --oneline` print) or an array of
/// lines.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    #[serde(default, deserialize_with = "lines")]
    pub file_changes: Vec<String>,
    #[serde(default, deserialize_with = "lines")]
    pub recent_commits: Vec<String>,
    #[serde(default)]
    pub diff_stats: String,
    #[serde(default)]
    pub staged_stats: String,
    #[serde(default, alias = "session_data")]
    pub session_info: SessionInfo,
}

impl SessionSnapshot {
    /// Diff and staged stats joined for regex scans.
    pub fn stats_text(&self) -> String {
        format!("{} {}", self.diff_stats, self.staged_stats)
    }

    /// All commit lines as one block of text.
    pub fn commit_text(&self) -> String {
        self.recent_commits.join("\n")
    }

    /// Commit lines that carry a message.
    pub fn commits(&self) -> impl Iterator<Item = &str> {
        self.recent_commits
            .iter()
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty())
    }

    /// Path portion of every file change line, skipping the 2-character
    /// status prefix. Blank paths are dropped.
    pub fn changed_paths(&self) -> impl Iterator<Item = &str> {
        self.file_changes.iter().filter_map(|line| {
            let path = strip_status(line).trim();
            (!path.is_empty()).then_some(path)
        })
    }

    pub fn branch(&self) -> &str {
        &self.session_info.git_branch
    }
}

/// Drop the porcelain status column (`M `, `??`, ` D`, ...).
fn strip_status(line: &str) -> &str {
    match line.char_indices().nth(2) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lines {
    Text(String),
    List(Vec<String>),
}

fn lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Lines>::deserialize(deserializer)? {
        Some(Lines::Text(s)) => s.lines().map(str::to_string).collect(),
        Some(Lines::List(v)) => v,
        None => Vec::new(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("session file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read session file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session file {} is not a valid snapshot: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<SessionSnapshot, SnapshotError> {
    if !path.exists() {
        return Err(SnapshotError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
