//! Append-only JSONL record of accepted accounts. Doubles as the
//! resumption source: replaying it at startup rebuilds the visited set,
//! which is the only crawl state that survives a restart.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;

use followscout_common::{AccountId, AcceptedRecord, FollowscoutError};

pub struct ResultSink {
    file: Mutex<File>,
}

impl ResultSink {
    /// Open the sink for appending, creating it if absent.
    pub fn open(path: &Path) -> Result<Self, FollowscoutError> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| FollowscoutError::Sink(format!("open {}: {e}", path.display())))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Replay an existing sink into the set of already-accepted identities.
    /// A missing file is an empty crawl history; corrupt lines are skipped
    /// (at worst the record that was in flight when a prior run died).
    pub fn replay(path: &Path) -> Result<HashSet<AccountId>, FollowscoutError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(FollowscoutError::Sink(format!(
                    "replay {}: {e}",
                    path.display()
                )))
            }
        };

        let mut identities = HashSet::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.map_err(|e| FollowscoutError::Sink(format!("replay {}: {e}", path.display())))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AcceptedRecord>(&line) {
                Ok(record) => {
                    identities.insert(record.username);
                }
                Err(e) => {
                    warn!(line = lineno + 1, error = %e, "Skipping corrupt sink line");
                }
            }
        }
        Ok(identities)
    }

    /// Append one accepted record and flush synchronously. A crash loses
    /// at most the record in flight, never prior ones.
    pub fn append(&self, record: &AcceptedRecord) -> Result<(), FollowscoutError> {
        let line = serde_json::to_string(record)
            .map_err(|e| FollowscoutError::Sink(format!("serialize record: {e}")))?;
        let mut file = self.file.lock().unwrap();
        writeln!(file, "{line}").map_err(|e| FollowscoutError::Sink(format!("append: {e}")))?;
        file.flush()
            .map_err(|e| FollowscoutError::Sink(format!("flush: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> AcceptedRecord {
        AcceptedRecord {
            username: AccountId::new(name),
            info: json!({"about_profile": {"account_based_in": "China"}}),
        }
    }

    #[test]
    fn replay_of_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.jsonl");
        assert!(ResultSink::replay(&path).unwrap().is_empty());
    }

    #[test]
    fn appended_records_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.jsonl");

        let sink = ResultSink::open(&path).unwrap();
        sink.append(&record("alice")).unwrap();
        sink.append(&record("bob")).unwrap();
        drop(sink);

        let identities = ResultSink::replay(&path).unwrap();
        assert_eq!(identities.len(), 2);
        assert!(identities.contains(&AccountId::new("alice")));
        assert!(identities.contains(&AccountId::new("bob")));
    }

    #[test]
    fn reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.jsonl");

        ResultSink::open(&path).unwrap().append(&record("alice")).unwrap();
        ResultSink::open(&path).unwrap().append(&record("bob")).unwrap();

        assert_eq!(ResultSink::replay(&path).unwrap().len(), 2);
    }

    #[test]
    fn corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.jsonl");

        let sink = ResultSink::open(&path).unwrap();
        sink.append(&record("alice")).unwrap();
        {
            let mut file = sink.file.lock().unwrap();
            writeln!(file, "{{\"username\": \"trunc").unwrap();
        }
        sink.append(&record("bob")).unwrap();

        let identities = ResultSink::replay(&path).unwrap();
        assert_eq!(identities.len(), 2);
    }

    #[test]
    fn sink_lines_keep_renderer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.jsonl");

        ResultSink::open(&path).unwrap().append(&record("alice")).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw.trim()).unwrap();
        assert_eq!(value["username"], json!("alice"));
        assert!(value["info"]["about_profile"]["account_based_in"].is_string());
    }
}
