//! The single-writer append path.
//!
//! `ChainAppender` is the only component that writes records.  Concurrent
//! producers may call `append` freely; the appender's writer mutex makes
//! "read tail → fetch secret → compute hash → commit" one indivisible
//! operation, so no two records are ever computed against the same
//! `prev_hash`.  The store's compare-and-commit backs this up at the
//! storage layer.
//!
//! Fail-closed: every check happens before the commit, and the commit is
//! atomic — an append that fails for any reason leaves zero trace.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, warn};

use custos_contracts::{
    error::{LedgerError, LedgerResult},
    event::AuditEvent,
    record::{AppendReceipt, AuditRecord, ChainId, GENESIS_HASH},
};
use custos_core::traits::{LedgerStore, SecretProvider};

use crate::{config::LedgerConfig, hash};

/// The exclusive writer for one chain.
///
/// Construct exactly one appender per chain instance and share it (it is
/// `Send + Sync`); a second appender over the same store cannot corrupt the
/// chain — the store's tail check turns the race into `TailConflict` — but
/// it will make appends spuriously fail, so don't.
pub struct ChainAppender {
    chain_id: ChainId,
    store: Arc<dyn LedgerStore>,
    secrets: Arc<dyn SecretProvider>,
    config: LedgerConfig,
    /// The single logical writer lane.  Held across tail read, secret
    /// fetch, hash computation, and commit.
    write_lane: Mutex<()>,
}

impl ChainAppender {
    /// Build an appender for `chain_id` over the given store and secrets.
    pub fn new(
        chain_id: ChainId,
        store: Arc<dyn LedgerStore>,
        secrets: Arc<dyn SecretProvider>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            chain_id,
            store,
            secrets,
            config,
            write_lane: Mutex::new(()),
        }
    }

    /// The chain this appender writes to.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Append one event to the chain.
    ///
    /// On success the event is committed as the new tail record and its
    /// sequence and hash are returned.  On any error — oversized payload,
    /// unavailable secret, storage failure — nothing is written and the
    /// tail does not advance; callers retry with backoff.
    pub fn append(&self, event: AuditEvent) -> LedgerResult<AppendReceipt> {
        let payload_len = event.payload_len();
        if payload_len > self.config.max_payload_bytes {
            warn!(
                chain_id = %self.chain_id,
                payload_len,
                limit = self.config.max_payload_bytes,
                "append rejected: payload too large"
            );
            return Err(LedgerError::PayloadTooLarge {
                actual: payload_len,
                limit: self.config.max_payload_bytes,
            });
        }

        let _lane = self.write_lane.lock().map_err(|_| LedgerError::Storage {
            reason: "appender writer lane poisoned".to_string(),
        })?;

        let tail = self.store.tail()?;

        // Fetch the secret before constructing anything: no secret, no
        // record, no partial state.
        let secret = self.secrets.active_secret()?;

        let (sequence, prev_hash) = match &tail {
            Some(t) => (t.sequence + 1, t.record_hash.clone()),
            None => (1, GENESIS_HASH.to_string()),
        };

        // Chain timestamps are non-decreasing even if the wall clock steps
        // backwards between appends.
        let now = Utc::now();
        let timestamp = match &tail {
            Some(t) if now < t.timestamp => t.timestamp,
            _ => now,
        };

        let record_hash = hash::hash_fields(
            &secret.key,
            self.chain_id,
            sequence,
            secret.epoch,
            timestamp,
            &event.event_type,
            &event.actor,
            &event.details,
            &prev_hash,
        );

        let record = AuditRecord {
            chain_id: self.chain_id,
            sequence,
            timestamp,
            event_type: event.event_type,
            actor: event.actor,
            details: event.details,
            secret_epoch: secret.epoch,
            prev_hash,
            record_hash: record_hash.clone(),
        };

        self.store.commit(record, tail.as_ref())?;

        debug!(
            chain_id = %self.chain_id,
            sequence,
            epoch = %secret.epoch,
            "event appended"
        );

        Ok(AppendReceipt {
            sequence,
            record_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::MemoryLedgerStore, secret::StaticSecretProvider};
    use custos_contracts::secret::{SecretEpoch, SecretHandle};

    fn make_appender(store: Arc<MemoryLedgerStore>) -> ChainAppender {
        ChainAppender::new(
            ChainId::new(),
            store,
            Arc::new(StaticSecretProvider::new(b"appender-test-key".to_vec())),
            LedgerConfig::default(),
        )
    }

    /// A provider that always fails, for exercising the fail-closed path.
    struct FailingSecretProvider;

    impl SecretProvider for FailingSecretProvider {
        fn active_secret(&self) -> LedgerResult<SecretHandle> {
            Err(LedgerError::SecretUnavailable {
                reason: "provider offline".to_string(),
            })
        }

        fn secret_for_epoch(&self, epoch: SecretEpoch) -> LedgerResult<SecretHandle> {
            Err(LedgerError::UnknownSecretEpoch { epoch: epoch.0 })
        }
    }

    #[test]
    fn sequential_appends_link_and_number_records() {
        let store = Arc::new(MemoryLedgerStore::new());
        let appender = make_appender(store.clone());

        let r1 = appender
            .append(AuditEvent::new("login", "alice", "ok"))
            .unwrap();
        let r2 = appender
            .append(AuditEvent::new("record_accessed", "alice", "p-100"))
            .unwrap();
        let r3 = appender
            .append(AuditEvent::new("logout", "alice", "ok"))
            .unwrap();

        assert_eq!((r1.sequence, r2.sequence, r3.sequence), (1, 2, 3));

        let records = store.snapshot().unwrap();
        assert_eq!(records[0].prev_hash, GENESIS_HASH);
        assert_eq!(records[1].prev_hash, records[0].record_hash);
        assert_eq!(records[2].prev_hash, records[1].record_hash);
        assert_eq!(records[2].record_hash, r3.record_hash);
    }

    #[test]
    fn oversized_payload_is_rejected_before_any_write() {
        let store = Arc::new(MemoryLedgerStore::new());
        let appender = ChainAppender::new(
            ChainId::new(),
            store.clone(),
            Arc::new(StaticSecretProvider::new(b"k".to_vec())),
            LedgerConfig {
                max_payload_bytes: 16,
                ..LedgerConfig::default()
            },
        );

        let err = appender
            .append(AuditEvent::new("x", "y", "z".repeat(32)))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::PayloadTooLarge {
                actual: 34,
                limit: 16
            }
        ));
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn secret_failure_leaves_no_trace() {
        let store = Arc::new(MemoryLedgerStore::new());
        let appender = ChainAppender::new(
            ChainId::new(),
            store.clone(),
            Arc::new(FailingSecretProvider),
            LedgerConfig::default(),
        );

        let err = appender
            .append(AuditEvent::new("login", "alice", "ok"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::SecretUnavailable { .. }));
        assert_eq!(store.record_count().unwrap(), 0);
        assert!(store.tail().unwrap().is_none());
    }

    #[test]
    fn timestamps_never_decrease_along_the_chain() {
        let store = Arc::new(MemoryLedgerStore::new());
        let appender = make_appender(store.clone());

        for i in 0..20 {
            appender
                .append(AuditEvent::new("tick", "clock", i.to_string()))
                .unwrap();
        }

        let records = store.snapshot().unwrap();
        for pair in records.windows(2) {
            assert!(pair[1].timestamp >= pair[0].timestamp);
        }
    }

    #[test]
    fn concurrent_appends_build_one_linear_chain() {
        let store = Arc::new(MemoryLedgerStore::new());
        let appender = Arc::new(make_appender(store.clone()));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let appender = Arc::clone(&appender);
                std::thread::spawn(move || {
                    appender
                        .append(AuditEvent::new("burst", format!("writer-{}", i), "x"))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = store.snapshot().unwrap();
        assert_eq!(records.len(), 50);

        // Sequences 1..=50 contiguous, every prev_hash equals the previous
        // record_hash, and no two records share a prev_hash (no fork).
        let mut prev_hashes = std::collections::HashSet::new();
        let mut expected_prev = GENESIS_HASH.to_string();
        for (idx, record) in records.iter().enumerate() {
            assert_eq!(record.sequence, idx as u64 + 1);
            assert_eq!(record.prev_hash, expected_prev);
            assert!(prev_hashes.insert(record.prev_hash.clone()));
            expected_prev = record.record_hash.clone();
        }
    }
}
