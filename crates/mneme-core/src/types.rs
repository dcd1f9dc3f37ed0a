use serde::{Deserialize, Serialize};

/// Commit message convention seen in the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStyle {
    #[default]
    None,
    Conventional,
    Emoji,
}

impl CommitStyle {
    pub fn label(self) -> Option<&'static str> {
        match self {
            CommitStyle::None => None,
            CommitStyle::Conventional => Some("conventional_commits"),
            CommitStyle::Emoji => Some("emoji_commits"),
        }
    }
}

/// Keyword family found in commit text. Declaration order is the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkFocus {
    Feature,
    Bug,
    Test,
    Refactor,
    Doc,
}

impl WorkFocus {
    pub const ALL: [WorkFocus; 5] = [
        WorkFocus::Feature,
        WorkFocus::Bug,
        WorkFocus::Test,
        WorkFocus::Refactor,
        WorkFocus::Doc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkFocus::Feature => "feature_development",
            WorkFocus::Bug => "bug_fixing",
            WorkFocus::Test => "testing",
            WorkFocus::Refactor => "refactoring",
            WorkFocus::Doc => "documentation",
        }
    }

    /// Domain tag attached to the queued memory.
    pub fn tag(self) -> &'static str {
        match self {
            WorkFocus::Feature => "coding",
            WorkFocus::Bug => "debugging",
            WorkFocus::Test => "testing",
            WorkFocus::Refactor => "architecture",
            WorkFocus::Doc => "documentation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSize {
    Small,
    Medium,
    Large,
}

impl ChangeSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeSize::Small => "small",
            ChangeSize::Medium => "medium",
            ChangeSize::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPattern {
    #[default]
    None,
    Feature,
    Bugfix,
    Release,
    Main,
}

/// Work-style summary of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub commit_style: CommitStyle,
    pub work_focus: Vec<WorkFocus>,
    pub file_types: Vec<String>,
    pub change_size: Option<ChangeSize>,
    pub branch_pattern: BranchPattern,
}

impl PatternSummary {
    /// Whether the session says anything about how the developer works.
    pub fn has_work_style(&self) -> bool {
        self.commit_style != CommitStyle::None || !self.work_focus.is_empty()
    }

    pub fn focus_labels(&self, n: usize) -> Vec<&'static str> {
        self.work_focus.iter().take(n).map(|f| f.label()).collect()
    }
}

/// Coarse significance bucket, derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceLevel {
    Minor,
    Moderate,
    Major,
}

impl SignificanceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SignificanceLevel::Minor => "minor",
            SignificanceLevel::Moderate => "moderate",
            SignificanceLevel::Major => "major",
        }
    }
}

impl std::fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
