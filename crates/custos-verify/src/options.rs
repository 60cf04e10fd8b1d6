//! Verification options and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag for cancelling a verification walk in progress.
///
/// Cheap to clone; the verifier polls it once per record.  A cancelled walk
/// returns its partial result with `complete = false`.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.  Takes effect at the next record boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Caller-selectable parameters for one verification walk.
///
/// The default verifies the whole chain and stops at the first break — the
/// cheapest, most actionable signal.  Forensic callers flip
/// `continue_on_break` to collect every break in one pass; it is a mode of
/// the same walk, not a second algorithm.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// First sequence to verify (default: 1).
    pub range_start: Option<u64>,

    /// Last sequence to verify, inclusive (default: the chain tail).
    pub range_end: Option<u64>,

    /// Keep walking after a break and collect all of them.
    pub continue_on_break: bool,

    /// How many records at the tail to leave out, shielding the walk from
    /// records a weakly-isolated store might expose mid-commit.  Ignored
    /// when `include_in_flight` is set.
    pub tail_exclusion: u64,

    /// Verify all the way to the tail even when a `tail_exclusion` window
    /// is configured.
    pub include_in_flight: bool,

    /// Optional cancellation flag, polled once per record.
    pub cancel: Option<CancelFlag>,
}

impl VerifyOptions {
    /// Options for a full-chain walk that collects every break.
    pub fn forensic() -> Self {
        Self {
            continue_on_break: true,
            ..Self::default()
        }
    }
}
