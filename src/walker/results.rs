//! Result collector
//!
//! Append-only list of discovered repositories, shared by every worker.
//! Records are kept in the order workers inserted them.

use crate::metadata::Metadata;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;

/// A discovered repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRecord {
    /// Path relative to the scan root
    #[serde(rename = "path")]
    pub relative_path: PathBuf,

    /// Metadata, if the lookup succeeded
    #[serde(flatten)]
    pub metadata: Option<Metadata>,
}

impl RepoRecord {
    /// Branch name, if known
    pub fn branch(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.branch.as_str())
    }
}

/// Thread-safe collector for repository records
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Mutex<Vec<RepoRecord>>,
}

impl ResultCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record
    pub fn record(&self, relative_path: PathBuf, metadata: Option<Metadata>) {
        self.records.lock().push(RepoRecord {
            relative_path,
            metadata,
        });
    }

    /// Number of records so far
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of the records collected so far
    pub fn snapshot(&self) -> Vec<RepoRecord> {
        self.records.lock().clone()
    }

    /// Take the records, consuming the collector
    pub fn into_records(self) -> Vec<RepoRecord> {
        self.records.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_and_snapshot() {
        let collector = ResultCollector::new();
        assert!(collector.is_empty());

        collector.record(PathBuf::from("libA"), Some(Metadata::new("main")));
        collector.record(PathBuf::from("tools/x"), None);

        let records = collector.snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].relative_path, PathBuf::from("libA"));
        assert_eq!(records[0].branch(), Some("main"));
        assert_eq!(records[1].branch(), None);
    }

    #[test]
    fn test_concurrent_inserts_are_not_lost() {
        let collector = Arc::new(ResultCollector::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let collector = Arc::clone(&collector);
                thread::spawn(move || {
                    for i in 0..250 {
                        collector.record(PathBuf::from(format!("w{t}/r{i}")), None);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let collector = Arc::try_unwrap(collector).unwrap();
        let mut paths: Vec<_> = collector
            .into_records()
            .into_iter()
            .map(|r| r.relative_path)
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 2000);
    }
}
