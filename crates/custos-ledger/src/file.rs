//! Durable JSONL implementation of `LedgerStore`.
//!
//! `JsonlLedgerStore` persists one serialized record per line in an
//! append-only file, flushed on every commit, and keeps an in-memory index
//! of all records for reads.  Opening an existing file loads and re-indexes
//! every line, so a process restart resumes the chain where it left off.
//!
//! The file is only ever opened in append mode and the type exposes no way
//! to rewrite or truncate it.  A record that disappears from the file was
//! removed by something outside this API — which is precisely what the
//! verifier's gap detection reports.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use custos_contracts::{
    error::{LedgerError, LedgerResult},
    record::{AuditRecord, TailPointer},
};
use custos_core::traits::LedgerStore;

/// Interior state: the append handle plus the index of committed records.
#[derive(Debug)]
struct FileState {
    file: File,
    records: Vec<AuditRecord>,
}

/// A file-backed, append-only record store (one JSON record per line).
#[derive(Debug)]
pub struct JsonlLedgerStore {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl JsonlLedgerStore {
    /// Open (or create) the ledger file at `path` and index its records.
    ///
    /// Any unparsable line fails the open with `LedgerError::Storage` —
    /// a half-written or corrupted file must be inspected by an operator,
    /// not silently skipped over.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::Storage {
                reason: format!("failed to create ledger directory: {}", e),
            })?;
        }

        let mut records = Vec::new();
        if path.exists() {
            let reader = BufReader::new(File::open(&path).map_err(|e| LedgerError::Storage {
                reason: format!("failed to open ledger file '{}': {}", path.display(), e),
            })?);

            for (line_num, line) in reader.lines().enumerate() {
                let line = line.map_err(|e| LedgerError::Storage {
                    reason: format!("failed to read ledger line {}: {}", line_num + 1, e),
                })?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: AuditRecord =
                    serde_json::from_str(&line).map_err(|e| LedgerError::Storage {
                        reason: format!(
                            "failed to parse ledger record at line {}: {}",
                            line_num + 1,
                            e
                        ),
                    })?;
                records.push(record);
            }
            records.sort_by_key(|r| r.sequence);
            info!(
                path = %path.display(),
                record_count = records.len(),
                "ledger file loaded"
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::Storage {
                reason: format!("failed to open ledger file '{}': {}", path.display(), e),
            })?;

        Ok(Self {
            path,
            state: Mutex::new(FileState { file, records }),
        })
    }

    /// The path this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, FileState>> {
        self.state.lock().map_err(|_| LedgerError::Storage {
            reason: "ledger file lock poisoned".to_string(),
        })
    }
}

impl LedgerStore for JsonlLedgerStore {
    fn tail(&self) -> LedgerResult<Option<TailPointer>> {
        Ok(self.lock()?.records.last().map(TailPointer::of))
    }

    fn get(&self, sequence: u64) -> LedgerResult<Option<AuditRecord>> {
        let state = self.lock()?;
        Ok(state
            .records
            .binary_search_by_key(&sequence, |r| r.sequence)
            .ok()
            .map(|idx| state.records[idx].clone()))
    }

    fn scan(&self, start: u64, end: u64) -> LedgerResult<Vec<AuditRecord>> {
        let state = self.lock()?;
        let lo = state.records.partition_point(|r| r.sequence < start);
        let hi = state.records.partition_point(|r| r.sequence <= end);
        Ok(state.records[lo..hi].to_vec())
    }

    fn record_count(&self) -> LedgerResult<u64> {
        Ok(self.lock()?.records.len() as u64)
    }

    /// Append `record` iff the current tail matches `expected_tail`.
    ///
    /// The line is written and flushed before the index advances; a failed
    /// write leaves the index untouched, and the damaged file line is
    /// caught on the next open instead of being served as a record.
    fn commit(
        &self,
        record: AuditRecord,
        expected_tail: Option<&TailPointer>,
    ) -> LedgerResult<()> {
        let mut state = self.lock()?;

        let current = state.records.last().map(TailPointer::of);
        let matches = match (&current, expected_tail) {
            (None, None) => true,
            (Some(c), Some(e)) => c.sequence == e.sequence && c.record_hash == e.record_hash,
            _ => false,
        };
        if !matches {
            return Err(LedgerError::TailConflict {
                expected: expected_tail.map(|t| t.sequence).unwrap_or(0),
                found: current.map(|t| t.sequence).unwrap_or(0),
            });
        }

        let next_sequence = state.records.last().map(|r| r.sequence + 1).unwrap_or(1);
        if record.sequence != next_sequence {
            return Err(LedgerError::Storage {
                reason: format!(
                    "out-of-order commit: got sequence {}, expected {}",
                    record.sequence, next_sequence
                ),
            });
        }

        let mut line = serde_json::to_string(&record).map_err(|e| LedgerError::Storage {
            reason: format!("failed to serialize record: {}", e),
        })?;
        line.push('\n');

        state
            .file
            .write_all(line.as_bytes())
            .map_err(|e| LedgerError::Storage {
                reason: format!("failed to write ledger record: {}", e),
            })?;
        state.file.flush().map_err(|e| LedgerError::Storage {
            reason: format!("failed to flush ledger file: {}", e),
        })?;

        debug!(
            sequence = record.sequence,
            event_type = %record.event_type,
            path = %self.path.display(),
            "record committed to ledger file"
        );
        state.records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use custos_contracts::{
        record::{ChainId, GENESIS_HASH},
        secret::SecretEpoch,
    };

    fn make_record(chain_id: ChainId, sequence: u64, prev_hash: &str) -> AuditRecord {
        AuditRecord {
            chain_id,
            sequence,
            timestamp: Utc::now(),
            event_type: "test".to_string(),
            actor: "tester".to_string(),
            details: format!("record {}", sequence),
            secret_epoch: SecretEpoch(1),
            prev_hash: prev_hash.to_string(),
            record_hash: format!("{:064x}", sequence),
        }
    }

    fn commit_chain(store: &JsonlLedgerStore, chain_id: ChainId, count: u64) {
        let mut prev = GENESIS_HASH.to_string();
        for seq in 1..=count {
            let record = make_record(chain_id, seq, &prev);
            prev = record.record_hash.clone();
            let tail = store.tail().unwrap();
            store.commit(record, tail.as_ref()).unwrap();
        }
    }

    #[test]
    fn commits_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");
        let chain_id = ChainId::new();

        {
            let store = JsonlLedgerStore::open(&path).unwrap();
            commit_chain(&store, chain_id, 3);
        }

        let reopened = JsonlLedgerStore::open(&path).unwrap();
        assert_eq!(reopened.record_count().unwrap(), 3);
        assert_eq!(reopened.tail().unwrap().unwrap().sequence, 3);
        assert_eq!(reopened.get(2).unwrap().unwrap().details, "record 2");

        // Appending continues the persisted chain.
        let tail = reopened.tail().unwrap();
        let record = make_record(chain_id, 4, &tail.as_ref().unwrap().record_hash);
        reopened.commit(record, tail.as_ref()).unwrap();
        assert_eq!(reopened.record_count().unwrap(), 4);
    }

    #[test]
    fn stale_tail_commit_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");
        let chain_id = ChainId::new();

        let store = JsonlLedgerStore::open(&path).unwrap();
        commit_chain(&store, chain_id, 2);

        let err = store
            .commit(make_record(chain_id, 1, GENESIS_HASH), None)
            .unwrap_err();
        assert!(matches!(err, LedgerError::TailConflict { .. }));
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn corrupted_line_fails_the_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.jsonl");
        let chain_id = ChainId::new();

        {
            let store = JsonlLedgerStore::open(&path).unwrap();
            commit_chain(&store, chain_id, 2);
        }

        // Simulate on-disk corruption of the second line.
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        lines[1] = "{not json";
        std::fs::write(&path, lines.join("\n")).unwrap();

        let err = JsonlLedgerStore::open(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Storage { .. }));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn open_on_fresh_path_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/chain.jsonl");

        let store = JsonlLedgerStore::open(&path).unwrap();
        assert_eq!(store.record_count().unwrap(), 0);
        assert!(store.tail().unwrap().is_none());
        assert_eq!(store.path(), path.as_path());
    }
}
