use std::path::PathBuf;

/// Per-user scripts directory shared with the session hooks: `~/.claude/scripts/`.
pub fn scripts_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".claude").join("scripts"),
        None => PathBuf::from(".claude").join("scripts"),
    }
}

/// Default memory queue: `~/.claude/scripts/memory-queue.jsonl`.
pub fn default_queue_file() -> PathBuf {
    scripts_dir().join("memory-queue.jsonl")
}

/// Default filter catalog: `~/.claude/scripts/memory-filters.json`.
pub fn default_filters_file() -> PathBuf {
    scripts_dir().join("memory-filters.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_in_scripts_dir() {
        let dir = scripts_dir();
        assert!(dir.ends_with(".claude/scripts"));
        assert_eq!(default_queue_file(), dir.join("memory-queue.jsonl"));
        assert_eq!(default_filters_file(), dir.join("memory-filters.json"));
    }
}
