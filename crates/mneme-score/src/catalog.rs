//! Filter catalog: the classification rules that drive scoring.
//!
//! Rules are plain data (`FilterConfig`, the on-disk JSON shape) compiled once
//! into a `FilterCatalog`. A user file only has to name the keys it changes;
//! everything else comes from the built-in defaults.

use anyhow::Context;
use indexmap::IndexMap;
use mneme_core::SignificanceLevel;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// On-disk shape of `memory-filters.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub trivial_patterns: Vec<String>,
    pub sensitive_patterns: Vec<String>,
    pub significant_patterns: Vec<String>,
    /// Extension suffix → weight. Order matters: first match wins.
    pub file_weight: IndexMap<String, f64>,
    pub minimum_changes: usize,
    pub minimum_lines: u64,
    pub significance_threshold: f64,
    pub dedup_window_hours: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            trivial_patterns: strings(&[
                r"^\s*$",
                r"^#\s*$",
                r"\.DS_Store",
                r"__pycache__",
                r"node_modules",
                r"\.git/",
                r"\.venv/",
                r"venv/",
                r"\.pyc$",
                r"(^|/)target/",
                r"(^|/)dist/",
                r"(^|/)build/",
                r"\.lock$",
                r"package-lock\.json$",
            ]),
            sensitive_patterns: strings(&[
                r"(^|/)\.env(\.|$)",
                r"\.(pem|key|p12|pfx|jks|keystore)$",
                r"(^|/)id_(rsa|dsa|ecdsa|ed25519)",
                r"api[_-]?key",
                r"private[_-]?key",
                r"secret",
                r"passw(or)?d",
                r"token",
                r"credential",
            ]),
            significant_patterns: strings(&[
                r"feat[:(]",
                r"fix[:(]",
                r"BREAKING",
                r"performance",
                r"security",
                r"refactor",
                r"test[:(]",
            ]),
            file_weight: [
                (".py", 2.0),
                (".js", 2.0),
                (".ts", 2.0),
                (".jsx", 2.0),
                (".tsx", 2.0),
                (".php", 2.0),
                (".go", 2.0),
                (".rs", 2.0),
                (".java", 2.0),
                (".c", 2.0),
                (".cpp", 2.0),
                (".sh", 1.5),
                (".yml", 1.5),
                (".yaml", 1.5),
                (".json", 1.3),
                (".md", 1.2),
                (".txt", 0.8),
            ]
            .into_iter()
            .map(|(ext, w)| (ext.to_string(), w))
            .collect(),
            minimum_changes: 3,
            minimum_lines: 10,
            significance_threshold: 12.0,
            dedup_window_hours: 24,
        }
    }
}

/// Overlay a user-supplied JSON object onto the defaults.
///
/// Keys are replaced whole (no deep merge of `file_weight`). Keys that are
/// missing or `null` keep their default value; unknown keys are ignored. A key
/// whose value has the wrong type is logged and dropped without affecting the
/// others. Integral floats such as `10.0` are accepted for count fields.
pub fn merge_config(loaded: &Value) -> anyhow::Result<FilterConfig> {
    let overrides = loaded
        .as_object()
        .context("filter file is not a JSON object")?;
    let Value::Object(mut merged) = serde_json::to_value(FilterConfig::default())? else {
        anyhow::bail!("default filters did not serialize to an object");
    };
    for (key, value) in overrides {
        let Some(default) = merged.get(key) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let value = coerce_integral(default, value);
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        match serde_json::from_value::<FilterConfig>(Value::Object(candidate)) {
            Ok(_) => {
                merged.insert(key.clone(), value);
            }
            Err(e) => tracing::warn!(key = key.as_str(), "ignoring filter override: {e}"),
        }
    }
    Ok(serde_json::from_value(Value::Object(merged))?)
}

/// `10.0` where the default is an unsigned integer becomes `10`.
fn coerce_integral(default: &Value, value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if default.is_u64() && value.is_f64() && f >= 0.0 && f.fract() == 0.0 => {
            Value::from(f as u64)
        }
        _ => value.clone(),
    }
}

/// Load the filter catalog, falling back to defaults on any problem.
///
/// A missing file is the normal case and is not reported. An unreadable or
/// malformed file is logged and ignored.
pub fn load_catalog(path: Option<&Path>) -> FilterCatalog {
    let Some(path) = path else {
        return FilterCatalog::default();
    };
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no filter file, using defaults");
            return FilterCatalog::default();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "error loading filters: {e}");
            return FilterCatalog::default();
        }
    };
    let config = serde_json::from_str::<Value>(&content)
        .map_err(anyhow::Error::from)
        .and_then(|v| merge_config(&v));
    match config {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded filter overrides");
            FilterCatalog::compile(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "error loading filters: {e:#}");
            FilterCatalog::default()
        }
    }
}

/// Compiled, ready-to-evaluate filter rules.
#[derive(Debug, Clone)]
pub struct FilterCatalog {
    trivial: Vec<Regex>,
    sensitive: Vec<Regex>,
    significant: Vec<(String, Regex)>,
    file_weight: IndexMap<String, f64>,
    pub minimum_changes: usize,
    pub minimum_lines: u64,
    pub significance_threshold: f64,
    pub dedup_window_hours: u64,
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::compile(FilterConfig::default())
    }
}

impl FilterCatalog {
    /// Compile a config. Patterns that are not valid regexes are dropped and
    /// negative file weights count as zero.
    pub fn compile(config: FilterConfig) -> Self {
        let significant = config
            .significant_patterns
            .iter()
            .filter_map(|p| compile_pattern(p, true).map(|re| (p.clone(), re)))
            .collect();
        Self {
            trivial: compile_all(&config.trivial_patterns, false),
            sensitive: compile_all(&config.sensitive_patterns, true),
            significant,
            file_weight: config
                .file_weight
                .into_iter()
                .map(|(ext, w)| (ext, w.max(0.0)))
                .collect(),
            minimum_changes: config.minimum_changes,
            minimum_lines: config.minimum_lines,
            significance_threshold: config.significance_threshold,
            dedup_window_hours: config.dedup_window_hours,
        }
    }

    /// Noise path (build output, caches, lockfiles).
    pub fn is_trivial(&self, path: &str) -> bool {
        path.trim().is_empty() || self.trivial.iter().any(|re| re.is_match(path))
    }

    /// Path whose name or extension may disclose a secret.
    pub fn is_sensitive(&self, path: &str) -> bool {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        self.sensitive
            .iter()
            .any(|re| re.is_match(path) || (!ext.is_empty() && re.is_match(ext)))
    }

    /// First weight-table entry whose suffix ends `path`.
    pub fn weight_for(&self, path: &str) -> Option<(&str, f64)> {
        self.file_weight
            .iter()
            .find(|(ext, _)| path.ends_with(ext.as_str()))
            .map(|(ext, w)| (ext.as_str(), *w))
    }

    /// First significant-commit pattern matching `commit`, as written in the config.
    pub fn significant_match(&self, commit: &str) -> Option<&str> {
        self.significant
            .iter()
            .find(|(_, re)| re.is_match(commit))
            .map(|(src, _)| src.as_str())
    }

    pub fn moderate_cutoff(&self) -> f64 {
        self.significance_threshold * 1.4
    }

    pub fn major_cutoff(&self) -> f64 {
        self.significance_threshold * 2.0
    }

    pub fn level_for(&self, score: f64) -> SignificanceLevel {
        if score >= self.major_cutoff() {
            SignificanceLevel::Major
        } else if score >= self.moderate_cutoff() {
            SignificanceLevel::Moderate
        } else {
            SignificanceLevel::Minor
        }
    }
}

fn compile_all(patterns: &[String], case_insensitive: bool) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| compile_pattern(p, case_insensitive))
        .collect()
}

fn compile_pattern(pattern: &str, case_insensitive: bool) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern, "skipping invalid filter pattern: {e}");
            None
        }
    }
}
