//! In-memory implementation of `LedgerStore`.
//!
//! `MemoryLedgerStore` keeps all records in a `Vec` behind a `Mutex`.  The
//! commit path re-checks the tail under the same lock that guards the push,
//! so readers only ever observe fully committed records and a second writer
//! racing the appender gets `TailConflict` instead of a forked chain.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use custos_contracts::{
    error::{LedgerError, LedgerResult},
    record::{AuditRecord, TailPointer},
};
use custos_core::traits::LedgerStore;

/// An in-memory, append-only record store.
///
/// There is no way to remove or modify a record through this type.  Tests
/// that need a damaged chain build one with [`MemoryLedgerStore::from_records`]
/// — the same constructor an operator would use to load a persisted
/// snapshot — which is exactly how out-of-band tampering reaches real
/// storage too: around the API, not through it.
pub struct MemoryLedgerStore {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Create a store holding `records`, sorted by sequence.
    ///
    /// No chain validation happens here — judging integrity is the
    /// verifier's job, and pre-validating would mask the very breaks it
    /// exists to report.
    pub fn from_records(mut records: Vec<AuditRecord>) -> Self {
        records.sort_by_key(|r| r.sequence);
        Self {
            records: Mutex::new(records),
        }
    }

    /// A copy of every committed record, in sequence order.
    pub fn snapshot(&self) -> LedgerResult<Vec<AuditRecord>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, Vec<AuditRecord>>> {
        self.records.lock().map_err(|_| LedgerError::Storage {
            reason: "memory store lock poisoned".to_string(),
        })
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn tail(&self) -> LedgerResult<Option<TailPointer>> {
        Ok(self.lock()?.last().map(TailPointer::of))
    }

    fn get(&self, sequence: u64) -> LedgerResult<Option<AuditRecord>> {
        let records = self.lock()?;
        Ok(records
            .binary_search_by_key(&sequence, |r| r.sequence)
            .ok()
            .map(|idx| records[idx].clone()))
    }

    fn scan(&self, start: u64, end: u64) -> LedgerResult<Vec<AuditRecord>> {
        let records = self.lock()?;
        let lo = records.partition_point(|r| r.sequence < start);
        let hi = records.partition_point(|r| r.sequence <= end);
        Ok(records[lo..hi].to_vec())
    }

    fn record_count(&self) -> LedgerResult<u64> {
        Ok(self.lock()?.len() as u64)
    }

    /// Append `record` iff the current tail matches `expected_tail`.
    ///
    /// The tail check and the push happen under one lock acquisition, which
    /// is what makes this a compare-and-commit rather than a blind append.
    /// In the conflict error, sequence 0 stands for "empty chain".
    fn commit(
        &self,
        record: AuditRecord,
        expected_tail: Option<&TailPointer>,
    ) -> LedgerResult<()> {
        let mut records = self.lock()?;

        let current = records.last().map(TailPointer::of);
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

        let next_sequence = records.last().map(|r| r.sequence + 1).unwrap_or(1);
        if record.sequence != next_sequence {
            return Err(LedgerError::Storage {
                reason: format!(
                    "out-of-order commit: got sequence {}, expected {}",
                    record.sequence, next_sequence
                ),
            });
        }

        debug!(
            sequence = record.sequence,
            event_type = %record.event_type,
            "record committed to memory store"
        );
        records.push(record);
        Ok(())
    }
}
