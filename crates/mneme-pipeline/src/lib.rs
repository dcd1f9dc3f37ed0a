//! One-shot session pipeline.
//!
//! ```text
//! score ─▶ below threshold ─▶ Rejected
//!   └─▶ extract ─▶ render ─▶ dedup ─▶ duplicate ─▶ Duplicate
//!                               └─▶ append ─▶ failed ─▶ WriteFailed
//!                                     └─▶ insight (optional) ─▶ Accepted
//! ```
//!
//! Everything before the append is pure, so a session is either fully queued
//! or leaves the queue untouched.

use mneme_core::{SessionSnapshot, SignificanceLevel};
use mneme_queue::{is_duplicate, Queue};
use mneme_score::{FilterCatalog, Significance};
use serde::Serialize;

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Outcome {
    /// Scored below the significance threshold. Nothing queued.
    Rejected { threshold: f64 },
    /// An identical memory is already queued within the dedup window.
    Duplicate { content: String },
    /// Primary memory queued (or would have been, in dry-run).
    Accepted {
        content: String,
        level: SignificanceLevel,
        insight_written: bool,
    },
    /// The primary memory could not be appended.
    WriteFailed { content: String, error: String },
}

impl Outcome {
    /// Rejected and duplicate sessions are normal completions.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::WriteFailed { .. })
    }
}

/// Result of processing one session.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub significance: Significance,
    pub outcome: Outcome,
}

/// Wires the catalog and queue together for a single session.
pub struct SessionPipeline<'a> {
    catalog: &'a FilterCatalog,
    queue: &'a Queue,
    dry_run: bool,
}

impl<'a> SessionPipeline<'a> {
    pub fn new(catalog: &'a FilterCatalog, queue: &'a Queue) -> Self {
        Self {
            catalog,
            queue,
            dry_run: false,
        }
    }

    /// Run every decision but never touch the queue file.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn process(&self, snapshot: &SessionSnapshot) -> Report {
        let significance = mneme_score::score(snapshot, self.catalog);
        tracing::debug!(
            score = significance.score,
            reasons = significance.reasons.len(),
            "session scored"
        );

        let threshold = self.catalog.significance_threshold;
        if significance.score < threshold {
            return Report {
                significance,
                outcome: Outcome::Rejected { threshold },
            };
        }

        let patterns = mneme_score::extract(snapshot);
        let content = mneme_score::render_content(snapshot, &significance, &patterns);

        if is_duplicate(self.queue, &content, self.catalog.dedup_window_hours) {
            tracing::info!("identical memory already queued, skipping");
            return Report {
                significance,
                outcome: Outcome::Duplicate { content },
            };
        }

        let level = self.catalog.level_for(significance.score);
        if self.dry_run {
            return Report {
                significance,
                outcome: Outcome::Accepted {
                    content,
                    level,
                    insight_written: false,
                },
            };
        }

        let record = mneme_score::session_record(
            snapshot,
            &significance,
            &patterns,
            self.catalog,
            content.clone(),
        );
        if let Err(e) = self.queue.append(&record) {
            tracing::error!(queue = %self.queue.path().display(), "error queuing memory: {e:#}");
            return Report {
                significance,
                outcome: Outcome::WriteFailed {
                    content,
                    error: format!("{e:#}"),
                },
            };
        }

        let insight_written = match mneme_score::insight_record(snapshot, &patterns) {
            Some(insight) => match self.queue.append(&insight) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("error queuing work pattern insight: {e:#}");
                    false
                }
            },
            None => false,
        };

        Report {
            significance,
            outcome: Outcome::Accepted {
                content,
                level,
                insight_written,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mneme_core::SessionInfo;
    use mneme_score::FilterConfig;

    fn scenario_a() -> SessionSnapshot {
        SessionSnapshot {
            file_changes: ["a", "b", "c", "d", "e"]
                .iter()
                .map(|f| format!("M  src/{f}.py"))
                .collect(),
            recent_commits: vec!["feat: add importer".into(), "tidy imports".into()],
            diff_stats: "5 files changed, 40 insertions(+)".into(),
            staged_stats: String::new(),
            session_info: SessionInfo {
                project_name: "demo".into(),
                git_branch: "main".into(),
                git_repo: "git@example.com:me/demo.git".into(),
                timestamp: None,
            },
        }
    }

    fn queue_in(dir: &tempfile::TempDir) -> Queue {
        Queue::new(dir.path().join("scripts/memory-queue.jsonl"))
    }

    #[test]
    fn scenario_a_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = queue_in(&tmp);
        let catalog = FilterCatalog::default();

        let report = SessionPipeline::new(&catalog, &queue).process(&scenario_a());
        // 2 + 5 * 1.0 + 2 * 3 + 2 + 40 / 20
        assert_eq!(report.significance.score, 17.0);
        match &report.outcome {
            Outcome::Accepted {
                level,
                insight_written,
                ..
            } => {
                assert_eq!(*level, SignificanceLevel::Moderate);
                assert!(insight_written);
            }
            other => panic!("expected Accepted, got {other:?}"),
        }

        let lines = queue.tail(10).unwrap();
        assert_eq!(lines.len(), 2);
        let primary: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        let tags: Vec<&str> = primary["metadata"]["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap())
            .collect();
        assert!(tags.contains(&"coding"));
        assert!(tags.contains(&"moderate"));
        assert!(primary["timestamp"].as_str().unwrap().ends_with('Z'));

        let insight: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(insight["metadata"]["type"], "work_pattern");
        assert_eq!(
            insight["content"],
            "Work pattern in demo: uses conventional_commits, focuses on feature_development, works with py files"
        );
    }

    #[test]
    fn scenario_b_is_rejected_without_write() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = queue_in(&tmp);
        let catalog = FilterCatalog::default();
        let snap = SessionSnapshot {
            file_changes: vec!["M  README".into()],
            ..Default::default()
        };

        let report = SessionPipeline::new(&catalog, &queue).process(&snap);
        assert_eq!(report.significance.score, 0.0);
        assert_eq!(report.outcome, Outcome::Rejected { threshold: 12.0 });
        assert!(report.outcome.is_success());
        assert!(!queue.path().exists());
    }

    #[test]
    fn scenario_c_repeat_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = queue_in(&tmp);
        let catalog = FilterCatalog::default();
        let pipeline = SessionPipeline::new(&catalog, &queue);

        let first = pipeline.process(&scenario_a());
        assert!(matches!(first.outcome, Outcome::Accepted { .. }));
        let before = queue.len().unwrap();

        let second = pipeline.process(&scenario_a());
        assert!(matches!(second.outcome, Outcome::Duplicate { .. }));
        assert!(second.outcome.is_success());
        assert_eq!(queue.len().unwrap(), before);
    }

    #[test]
    fn no_insight_without_work_style() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = queue_in(&tmp);
        let catalog = FilterCatalog::compile(FilterConfig {
            significance_threshold: 2.0,
            ..Default::default()
        });
        let snap = SessionSnapshot {
            file_changes: vec!["M  a.rs".into(), "M  b.rs".into(), "M  c.rs".into()],
            ..Default::default()
        };

        let report = SessionPipeline::new(&catalog, &queue).process(&snap);
        assert!(matches!(
            report.outcome,
            Outcome::Accepted {
                insight_written: false,
                ..
            }
        ));
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn dry_run_never_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = queue_in(&tmp);
        let catalog = FilterCatalog::default();

        let report = SessionPipeline::new(&catalog, &queue)
            .dry_run(true)
            .process(&scenario_a());
        assert!(matches!(report.outcome, Outcome::Accepted { .. }));
        assert!(!queue.path().exists());
    }

    #[test]
    fn write_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        // The queue path is a directory, so the append cannot open it.
        let path = tmp.path().join("memory-queue.jsonl");
        std::fs::create_dir_all(&path).unwrap();
        let queue = Queue::new(&path);
        let catalog = FilterCatalog::default();

        let report = SessionPipeline::new(&catalog, &queue).process(&scenario_a());
        assert!(matches!(report.outcome, Outcome::WriteFailed { .. }));
        assert!(!report.outcome.is_success());
    }

    #[test]
    fn outcome_serializes_with_decision_tag() {
        let v = serde_json::to_value(Outcome::Rejected { threshold: 12.0 }).unwrap();
        assert_eq!(v["decision"], "rejected");
        assert_eq!(v["threshold"], 12.0);
    }
}
