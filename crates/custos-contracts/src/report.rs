//! Verification findings.
//!
//! A `VerificationReport` is the ephemeral product of one verifier walk.
//! It is never written back to the ledger, and it contains no wall-clock
//! fields: verifying an unchanged chain twice yields identical reports.

use serde::{Deserialize, Serialize};

/// How a chain was found to be broken at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    /// The record's stored `record_hash` does not match the hash recomputed
    /// from its own fields — the record was modified in place.
    HashMismatch,

    /// No record exists at this sequence — a committed record was removed
    /// from storage.
    MissingRecord,

    /// The record's stored `prev_hash` does not equal its predecessor's
    /// stored `record_hash` — the linkage itself was rewritten.
    LinkMismatch,
}

impl std::fmt::Display for BreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakKind::HashMismatch => write!(f, "hash mismatch"),
            BreakKind::MissingRecord => write!(f, "missing record / gap"),
            BreakKind::LinkMismatch => write!(f, "prev-hash link mismatch"),
        }
    }
}

/// One detected break in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBreak {
    /// Sequence of the first record affected by this break.  For a
    /// `MissingRecord` break this is the sequence that should exist but
    /// does not.
    pub sequence: u64,
    /// What kind of break was found.
    pub kind: BreakKind,
    /// Deterministic human-readable detail for incident response.
    pub detail: String,
}

/// The outcome of one verification walk.
///
/// `intact` is only conclusive when `complete` is true: a cancelled walk
/// that found no break so far reports `intact = true, complete = false`,
/// which callers must treat as "no evidence yet", never as a clean bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True when no break was found in the walked range.
    pub intact: bool,
    /// True when the walk covered the entire requested range.  False after
    /// cancellation mid-walk.
    pub complete: bool,
    /// Number of records that passed every check.
    pub verified_count: u64,
    /// All breaks found, in chain order.  Holds at most one element unless
    /// the caller asked to continue past the first break.
    pub breaks: Vec<ChainBreak>,
}

impl VerificationReport {
    /// Sequence of the first break, if any.
    pub fn broken_at(&self) -> Option<u64> {
        self.breaks.first().map(|b| b.sequence)
    }

    /// Detail string of the first break, if any.
    pub fn reason(&self) -> Option<&str> {
        self.breaks.first().map(|b| b.detail.as_str())
    }

    /// One-line human-readable summary for report consumers.
    pub fn summary(&self) -> String {
        match (self.complete, self.intact) {
            (true, true) => format!("chain intact ({} records verified)", self.verified_count),
            (false, true) => format!(
                "verification incomplete ({} records verified, no break found so far)",
                self.verified_count
            ),
            (_, false) => {
                let first = self
                    .breaks
                    .first()
                    .map(|b| format!("first break at sequence {}: {}", b.sequence, b.detail))
                    .unwrap_or_else(|| "break detail unavailable".to_string());
                format!(
                    "chain broken ({} records verified, {} break(s); {})",
                    self.verified_count,
                    self.breaks.len(),
                    first
                )
            }
        }
    }
}
