//! Committed ledger records and chain position types.
//!
//! `AuditRecord` is the atomic, immutable unit of the ledger.  Once the
//! appender commits one, no application path ever mutates or deletes it —
//! tamper evidence rests entirely on that immutability plus the hash links
//! between consecutive records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::secret::SecretEpoch;

/// Unique identifier for one chain instance.
///
/// Every record carries the chain it belongs to, and the id participates in
/// the record hash so records can never be replayed into a different chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub uuid::Uuid);

impl ChainId {
    /// Create a new, unique chain ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The sentinel `prev_hash` of the first record in every chain.
///
/// 64 hex zeros — a value that can never be the HMAC of real data, making
/// "start of chain" unambiguous and distinct from "missing predecessor".
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A single committed entry in the hash chain.
///
/// Each record commits to its predecessor via `prev_hash`, forming an
/// append-only chain.  Modifying any field of a committed record — payload,
/// timestamp, even the epoch tag — invalidates `record_hash` and is
/// detected by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The chain this record belongs to.
    pub chain_id: ChainId,

    /// Position in the chain.  Starts at 1, contiguous, never reused.
    pub sequence: u64,

    /// Wall-clock append time (UTC).  Non-decreasing across the chain;
    /// the appender clamps when the clock steps backwards.
    pub timestamp: DateTime<Utc>,

    /// Application-defined event discriminant (e.g. "record_accessed").
    pub event_type: String,

    /// The identity that caused the event.  Opaque to the ledger core.
    pub actor: String,

    /// Free-form event payload.  Opaque, size-bounded at append time.
    pub details: String,

    /// Epoch of the signing secret that was active when this record was
    /// written.  The verifier uses it to select the correct historical key
    /// after a rotation.
    pub secret_epoch: SecretEpoch,

    /// `record_hash` of the preceding record, or [`GENESIS_HASH`] for the
    /// first record.  64 lowercase hex chars.
    pub prev_hash: String,

    /// Keyed hash (HMAC-SHA256, hex) over this record's canonical content.
    ///
    /// Computed by the appender inside the commit critical section; never
    /// client-supplied.
    pub record_hash: String,
}

/// The current end of a chain: the last committed sequence and its hash.
///
/// The tail is the only shared mutable state in the subsystem.  It is read
/// and advanced exclusively by the appender, under the store's
/// compare-and-commit primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailPointer {
    /// Sequence of the last committed record.
    pub sequence: u64,
    /// `record_hash` of the last committed record.
    pub record_hash: String,
    /// Timestamp of the last committed record, used by the appender to
    /// keep chain timestamps non-decreasing.
    pub timestamp: DateTime<Utc>,
}

impl TailPointer {
    /// Build the tail pointer corresponding to `record`.
    pub fn of(record: &AuditRecord) -> Self {
        Self {
            sequence: record.sequence,
            record_hash: record.record_hash.clone(),
            timestamp: record.timestamp,
        }
    }
}

/// What a successful append returns to the event producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReceipt {
    /// Sequence assigned to the committed record.
    pub sequence: u64,
    /// The committed record's hash — a compact commitment the producer can
    /// retain to later prove its event is in the chain.
    pub record_hash: String,
}
