//! Best-effort journaling of generation attempts.
//!
//! Records are advisory: a sink that fails to append never affects the
//! attempt it describes, so callers swallow append errors.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// One generation attempt, written before its network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Endpoint the attempt targets, e.g. "images" or "content".
    pub endpoint: String,
    /// Model identifier used for the attempt.
    pub model: String,
    /// Requested resolution as `WIDTHxHEIGHT`.
    pub resolution: String,
    /// The prompt sent.
    pub prompt: String,
    /// RFC 3339 timestamp taken when the record was created.
    pub timestamp: String,
    /// Who initiated the run, e.g. "auto" or "manual".
    pub source: String,
}

impl AttemptRecord {
    /// Creates a record stamped with the current UTC time.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        resolution: impl Into<String>,
        prompt: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            resolution: resolution.into(),
            prompt: prompt.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: source.into(),
        }
    }
}

/// Destination for attempt records.
pub trait AttemptSink: Send + Sync {
    /// Appends one record.
    fn append(&self, record: &AttemptRecord) -> io::Result<()>;
}

/// Appends records to a file, one JSON object per line.
///
/// The file is opened in append mode for every record, so concurrent
/// writers interleave whole lines rather than bytes.
#[derive(Debug, Clone)]
pub struct FileAttemptLog {
    path: PathBuf,
}

impl FileAttemptLog {
    /// Creates a log writing to `path`. Parent directories are created on
    /// first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this log appends to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl AttemptSink for FileAttemptLog {
    fn append(&self, record: &AttemptRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let line = serde_json::to_string(record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

/// Captures records in memory, for tests and embedders.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AttemptRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything appended so far.
    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl AttemptSink for MemorySink {
    fn append(&self, record: &AttemptRecord) -> io::Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "sink poisoned"))?;
        records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(endpoint: &str) -> AttemptRecord {
        AttemptRecord::new(
            endpoint,
            "gemini-2.5-flash-image",
            "2560x1440",
            "a quiet harbor at dawn",
            "manual",
        )
    }

    #[test]
    fn test_file_log_appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("attempts.log");
        let log = FileAttemptLog::new(&path);

        log.append(&sample("images")).unwrap();
        log.append(&sample("content")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AttemptRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.endpoint, "images");
        let second: AttemptRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.endpoint, "content");
        assert_eq!(second.source, "manual");
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = sample("images");
        let line = serde_json::to_string(&record).unwrap();
        let back: AttemptRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_memory_sink_captures_in_order() {
        let sink = MemorySink::new();
        sink.append(&sample("images")).unwrap();
        sink.append(&sample("content")).unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].endpoint, "images");
        assert_eq!(records[1].endpoint, "content");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let record = sample("images");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }
}
