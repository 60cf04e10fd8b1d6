//! The chain-integrity verification walk.
//!
//! `ChainVerifier` is a read-only walker: it takes a committed snapshot of
//! the requested range, recomputes every record's keyed hash from the
//! predecessor's stored hash and the record's own fields, and reports each
//! discrepancy.  It never writes, and it never "repairs" — silently fixing
//! a broken chain would defeat the tamper-evidence guarantee.
//!
//! Two integrity rules, straight from the chain construction:
//!
//! 1. **Linkage** — each record's `prev_hash` equals its predecessor's
//!    stored `record_hash` (or the genesis sentinel at sequence 1).
//! 2. **Hash correctness** — each record's `record_hash` equals the value
//!    recomputed under the secret of the record's own epoch.
//!
//! A sequence physically absent from storage is a third, distinct finding:
//! it indicates deletion rather than modification.

use std::sync::Arc;

use tracing::{debug, info, warn};

use custos_contracts::{
    error::LedgerResult,
    record::GENESIS_HASH,
    report::{BreakKind, ChainBreak, VerificationReport},
};
use custos_core::traits::{LedgerStore, SecretProvider};
use custos_ledger::hash::expected_hash;

use crate::options::VerifyOptions;

/// The read-only chain verifier.
///
/// Shares the store and secret provider with the appender but holds no
/// state of its own; walks do not block writers.
pub struct ChainVerifier {
    store: Arc<dyn LedgerStore>,
    secrets: Arc<dyn SecretProvider>,
}

impl ChainVerifier {
    /// Build a verifier over the given store and secret provider.
    pub fn new(store: Arc<dyn LedgerStore>, secrets: Arc<dyn SecretProvider>) -> Self {
        Self { store, secrets }
    }

    /// Verify the entire chain with default options (stop at first break).
    pub fn verify_all(&self) -> LedgerResult<VerificationReport> {
        self.verify(&VerifyOptions::default())
    }

    /// Walk the requested range and report every discrepancy found.
    ///
    /// Integrity findings land in the returned report; an `Err` from this
    /// method is always operational (storage failure, missing secret epoch)
    /// and says nothing about chain integrity either way.
    pub fn verify(&self, opts: &VerifyOptions) -> LedgerResult<VerificationReport> {
        let Some(tail) = self.store.tail()? else {
            // An empty chain is trivially intact.
            return Ok(VerificationReport {
                intact: true,
                complete: true,
                verified_count: 0,
                breaks: Vec::new(),
            });
        };

        let start = opts.range_start.unwrap_or(1).max(1);
        let committed_tail = if opts.include_in_flight {
            tail.sequence
        } else {
            tail.sequence.saturating_sub(opts.tail_exclusion)
        };
        // An explicitly requested end is honored even past the stored tail:
        // sequences the caller names that are absent from storage are
        // deletions to report, not a reason to shrink the walk.  Ends inside
        // the in-flight window still clamp down to the committed tail.
        let end = match opts.range_end {
            Some(requested) if requested <= tail.sequence => requested.min(committed_tail),
            Some(requested) => requested,
            None => committed_tail,
        };
        if end < start {
            return Ok(VerificationReport {
                intact: true,
                complete: true,
                verified_count: 0,
                breaks: Vec::new(),
            });
        }

        debug!(start, end, "verification walk starting");
        let records = self.store.scan(start, end)?;

        let mut breaks: Vec<ChainBreak> = Vec::new();
        let mut verified_count: u64 = 0;
        let mut complete = true;

        // Anchor: the hash every in-range record chain must start from.
        // `None` means "no trusted anchor" — linkage cannot be checked until
        // the next record re-establishes one.
        let mut expected_prev: Option<String> = if start == 1 {
            Some(GENESIS_HASH.to_string())
        } else {
            match self.store.get(start - 1)? {
                Some(predecessor) => Some(predecessor.record_hash),
                None => {
                    breaks.push(ChainBreak {
                        sequence: start - 1,
                        kind: BreakKind::MissingRecord,
                        detail: format!(
                            "no committed record at sequence {} to anchor the range",
                            start - 1
                        ),
                    });
                    None
                }
            }
        };

        let mut expected_seq = start;
        let mut halted = !opts.continue_on_break && !breaks.is_empty();

        if !halted {
            'walk: for record in &records {
                if let Some(flag) = &opts.cancel {
                    if flag.is_cancelled() {
                        complete = false;
                        break 'walk;
                    }
                }

                // A jump in sequence numbers means records were deleted.
                if record.sequence > expected_seq {
                    let gap_end = record.sequence - 1;
                    warn!(
                        from = expected_seq,
                        to = gap_end,
                        "sequence gap: committed records missing from storage"
                    );
                    breaks.push(gap_break(expected_seq, gap_end));
                    if !opts.continue_on_break {
                        halted = true;
                        break 'walk;
                    }
                    // Past a gap there is no trusted anchor to link against.
                    expected_prev = None;
                    expected_seq = record.sequence;
                }

                let mut record_ok = true;

                if let Some(prev) = &expected_prev {
                    if record.prev_hash != *prev {
                        warn!(sequence = record.sequence, "prev-hash link mismatch");
                        breaks.push(ChainBreak {
                            sequence: record.sequence,
                            kind: BreakKind::LinkMismatch,
                            detail: if record.sequence == 1 {
                                "prev_hash does not match the genesis sentinel".to_string()
                            } else {
                                format!(
                                    "prev_hash does not match record {}'s stored hash",
                                    record.sequence - 1
                                )
                            },
                        });
                        record_ok = false;
                        if !opts.continue_on_break {
                            halted = true;
                            break 'walk;
                        }
                    }
                }

                let secret = self.secrets.secret_for_epoch(record.secret_epoch)?;
                let recomputed = expected_hash(&secret.key, record);
                if recomputed != record.record_hash {
                    warn!(
                        sequence = record.sequence,
                        epoch = %record.secret_epoch,
                        "record hash mismatch"
                    );
                    breaks.push(ChainBreak {
                        sequence: record.sequence,
                        kind: BreakKind::HashMismatch,
                        detail: format!(
                            "stored hash does not match hash recomputed under epoch {}",
                            record.secret_epoch
                        ),
                    });
                    record_ok = false;
                    if !opts.continue_on_break {
                        halted = true;
                        break 'walk;
                    }
                }

                if record_ok {
                    verified_count += 1;
                }
                // The stored hash is the anchor for the next record even
                // when this record failed — its successor committed to the
                // stored value, not to the recomputed one.
                expected_prev = Some(record.record_hash.clone());
                expected_seq = record.sequence + 1;
            }
        }

        // Records missing at the end of the range leave the walk short.
        if complete && !halted && expected_seq <= end {
            warn!(
                from = expected_seq,
                to = end,
                "sequence gap at range end: committed records missing from storage"
            );
            breaks.push(gap_break(expected_seq, end));
        }

        let report = VerificationReport {
            intact: breaks.is_empty(),
            complete,
            verified_count,
            breaks,
        };
        info!(
            intact = report.intact,
            complete = report.complete,
            verified_count = report.verified_count,
            break_count = report.breaks.len(),
            "verification walk finished"
        );
        Ok(report)
    }
}

/// Build the break entry for a contiguous run of missing sequences.
fn gap_break(from: u64, to: u64) -> ChainBreak {
    let detail = if from == to {
        format!("no committed record at sequence {}", from)
    } else {
        format!("no committed records at sequences {}..={}", from, to)
    };
    ChainBreak {
        sequence: from,
        kind: BreakKind::MissingRecord,
        detail,
    }
}
