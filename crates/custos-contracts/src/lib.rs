//! # custos-contracts
//!
//! Shared types and error contracts for the CUSTOS audit ledger.
//!
//! All crates in the workspace import from here.  No ledger logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod event;
pub mod record;
pub mod report;
pub mod secret;

pub use error::{LedgerError, LedgerResult};
pub use event::AuditEvent;
pub use record::{AppendReceipt, AuditRecord, ChainId, TailPointer, GENESIS_HASH};
pub use report::{BreakKind, ChainBreak, VerificationReport};
pub use secret::{SecretEpoch, SecretHandle};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_record() -> AuditRecord {
        AuditRecord {
            chain_id: ChainId::new(),
            sequence: 7,
            timestamp: Utc::now(),
            event_type: "record_accessed".to_string(),
            actor: "nurse-42".to_string(),
            details: "{\"patient\":\"p-100\"}".to_string(),
            secret_epoch: SecretEpoch(1),
            prev_hash: "ab".repeat(32),
            record_hash: "cd".repeat(32),
        }
    }

    // ── Record types ─────────────────────────────────────────────────────────

    #[test]
    fn chain_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| ChainId::new().to_string()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn audit_record_round_trips_through_json() {
        let original = sample_record();
        let json = serde_json::to_string(&original).unwrap();
        let decoded: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn genesis_hash_is_sixty_four_zeros() {
        assert_eq!(GENESIS_HASH.len(), 64);
        assert!(GENESIS_HASH.chars().all(|c| c == '0'));
    }

    #[test]
    fn tail_pointer_of_mirrors_the_record() {
        let record = sample_record();
        let tail = TailPointer::of(&record);
        assert_eq!(tail.sequence, record.sequence);
        assert_eq!(tail.record_hash, record.record_hash);
        assert_eq!(tail.timestamp, record.timestamp);
    }

    #[test]
    fn audit_event_payload_len_sums_all_fields() {
        let event = AuditEvent::new("abc", "de", "fghi");
        assert_eq!(event.payload_len(), 9);
    }

    // ── Secret handle ────────────────────────────────────────────────────────

    #[test]
    fn secret_handle_debug_never_prints_key_bytes() {
        let handle = SecretHandle::new(SecretEpoch(3), b"super-secret-key".to_vec());
        let debug = format!("{:?}", handle);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("super-secret-key"));
    }

    // ── Verification report ──────────────────────────────────────────────────

    #[test]
    fn report_broken_at_returns_first_break() {
        let report = VerificationReport {
            intact: false,
            complete: true,
            verified_count: 4,
            breaks: vec![
                ChainBreak {
                    sequence: 5,
                    kind: BreakKind::HashMismatch,
                    detail: "stored hash does not match recomputed hash".to_string(),
                },
                ChainBreak {
                    sequence: 9,
                    kind: BreakKind::MissingRecord,
                    detail: "no record at sequence 9".to_string(),
                },
            ],
        };
        assert_eq!(report.broken_at(), Some(5));
        assert!(report.reason().unwrap().contains("stored hash"));
        assert!(report.summary().contains("sequence 5"));
    }

    #[test]
    fn incomplete_report_summary_is_not_a_clean_bill() {
        let report = VerificationReport {
            intact: true,
            complete: false,
            verified_count: 10,
            breaks: vec![],
        };
        assert!(report.summary().contains("incomplete"));
        assert!(!report.summary().contains("chain intact"));
    }

    #[test]
    fn break_kind_display_distinguishes_gap_from_mismatch() {
        assert_eq!(BreakKind::HashMismatch.to_string(), "hash mismatch");
        assert_eq!(BreakKind::MissingRecord.to_string(), "missing record / gap");
        assert_ne!(
            BreakKind::HashMismatch.to_string(),
            BreakKind::MissingRecord.to_string()
        );
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_payload_too_large_display() {
        let err = LedgerError::PayloadTooLarge {
            actual: 70_000,
            limit: 65_536,
        };
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65536"));
    }

    #[test]
    fn error_secret_unavailable_display() {
        let err = LedgerError::SecretUnavailable {
            reason: "provider timed out".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("secret unavailable"));
        assert!(msg.contains("provider timed out"));
    }

    #[test]
    fn error_tail_conflict_display() {
        let err = LedgerError::TailConflict {
            expected: 12,
            found: 13,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("13"));
    }

    #[test]
    fn error_unknown_epoch_display() {
        let err = LedgerError::UnknownSecretEpoch { epoch: 2 };
        assert!(err.to_string().contains("epoch 2"));
    }
}
