use fs2::FileExt;
use mneme_core::MemoryRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Bytes read per backward step when tailing the queue.
const TAIL_CHUNK: u64 = 8 * 1024;

/// The append-only memory queue backed by a JSONL file.
///
/// Records are only ever appended; existing lines are never rewritten. The
/// downstream drain owns truncation.
#[derive(Debug, Clone)]
pub struct Queue {
    path: PathBuf,
}

impl Queue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    ///
    /// The line is serialized up front and written with one `write_all` under
    /// an exclusive lock, so concurrent sessions never interleave partial
    /// lines.
    pub fn append(&self, record: &MemoryRecord) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| anyhow::anyhow!("cannot open queue {}: {e}", self.path.display()))?;
        file.lock_exclusive()?;
        let written = file.write_all(line.as_bytes()).and_then(|_| file.flush());
        let _ = FileExt::unlock(&file);
        written?;
        Ok(())
    }

    /// The last `n` non-empty lines, oldest first. Missing queue → empty.
    ///
    /// Reads backwards from the end of the file, so the cost is bounded by the
    /// size of the returned lines, not the queue. Bytes that are not UTF-8 are
    /// replaced rather than failing the read.
    pub fn tail(&self, n: usize) -> anyhow::Result<Vec<String>> {
        let Some(mut file) = self.open_existing()? else {
            return Ok(Vec::new());
        };
        if n == 0 {
            return Ok(Vec::new());
        }
        let mut pos = file.seek(SeekFrom::End(0))?;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let step = pos.min(TAIL_CHUNK);
            pos -= step;
            file.seek(SeekFrom::Start(pos))?;
            let mut chunk = vec![0u8; step as usize];
            file.read_exact(&mut chunk)?;
            chunk.extend_from_slice(&buf);
            buf = chunk;

            let lines = complete_lines(&buf, pos == 0);
            if pos == 0 || lines.len() >= n {
                let skip = lines.len().saturating_sub(n);
                return Ok(lines[skip..]
                    .iter()
                    .map(|l| String::from_utf8_lossy(l).into_owned())
                    .collect());
            }
        }
    }

    /// Number of non-empty lines in the queue.
    pub fn len(&self) -> anyhow::Result<usize> {
        let Some(file) = self.open_existing()? else {
            return Ok(0);
        };
        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        let mut count = 0;
        while reader.read_until(b'\n', &mut line)? > 0 {
            if !line.trim_ascii().is_empty() {
                count += 1;
            }
            line.clear();
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.len()? == 0)
    }

    fn open_existing(&self) -> anyhow::Result<Option<File>> {
        match File::open(&self.path) {
            Ok(f) => Ok(Some(f)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Non-blank lines of `buf`. Unless `buf` starts at the beginning of the
/// file, its first piece may be a partial line and is dropped.
fn complete_lines(buf: &[u8], from_start: bool) -> Vec<&[u8]> {
    let mut pieces = buf.split(|b| *b == b'\n');
    if !from_start {
        pieces.next();
    }
    pieces.filter(|l| !l.trim_ascii().is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> MemoryRecord {
        MemoryRecord::now(content, serde_json::json!({"tags": ["automated"]}))
    }

    #[test]
    fn append_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = Queue::new(tmp.path().join("nested/dir/memory-queue.jsonl"));
        queue.append(&record("first")).unwrap();
        assert!(queue.path().exists());
        assert_eq!(queue.len().unwrap(), 1);
    }

    #[test]
    fn appended_lines_parse_independently() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = Queue::new(tmp.path().join("memory-queue.jsonl"));
        queue.append(&record("one")).unwrap();
        queue.append(&record("two\nwith newline")).unwrap();

        let content = fs::read_to_string(queue.path()).unwrap();
        assert!(content.ends_with('\n'));
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            let obj = v.as_object().unwrap();
            let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["content", "metadata", "timestamp"]);
            assert!(obj["timestamp"].as_str().unwrap().ends_with('Z'));
        }
    }

    #[test]
    fn append_never_rewrites_existing_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("memory-queue.jsonl");
        fs::write(&path, "not json but kept\n").unwrap();
        let queue = Queue::new(&path);
        queue.append(&record("new")).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("not json but kept\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn append_to_unwritable_path_fails() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory where the queue file should be.
        let path = tmp.path().join("memory-queue.jsonl");
        fs::create_dir_all(&path).unwrap();
        assert!(Queue::new(&path).append(&record("x")).is_err());
    }

    #[test]
    fn tail_returns_last_n_oldest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("memory-queue.jsonl");
        let body: String = (0..30).map(|i| format!("line {i}\n\n")).collect();
        fs::write(&path, body).unwrap();
        let tail = Queue::new(&path).tail(20).unwrap();
        assert_eq!(tail.len(), 20);
        assert_eq!(tail[0], "line 10");
        assert_eq!(tail[19], "line 29");
    }

    #[test]
    fn tail_spans_multiple_chunks() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("memory-queue.jsonl");
        let filler = "x".repeat(1000);
        let body: String = (0..40).map(|i| format!("{i} {filler}\n")).collect();
        fs::write(&path, body).unwrap();
        let tail = Queue::new(&path).tail(20).unwrap();
        assert_eq!(tail.len(), 20);
        assert!(tail[0].starts_with("20 "));
        assert!(tail[19].starts_with("39 "));
    }

    #[test]
    fn tail_and_len_tolerate_invalid_utf8() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("memory-queue.jsonl");
        let mut body = b"\xff\xfe garbage\n".to_vec();
        body.extend_from_slice(b"ok 1\nok 2\n");
        fs::write(&path, body).unwrap();
        let queue = Queue::new(&path);
        assert_eq!(queue.tail(2).unwrap(), vec!["ok 1", "ok 2"]);
        assert_eq!(queue.tail(10).unwrap().len(), 3);
        assert_eq!(queue.len().unwrap(), 3);
    }

    #[test]
    fn tail_of_missing_queue_is_empty() {
        let queue = Queue::new("/nonexistent/memory-queue.jsonl");
        assert!(queue.tail(20).unwrap().is_empty());
        assert!(queue.is_empty().unwrap());
    }
}
