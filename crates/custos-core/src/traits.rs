//! Core trait definitions for the CUSTOS audit ledger.
//!
//! These two traits define the subsystem's trust boundary:
//!
//! - `LedgerStore`    — durable, append-only record storage (trusted sink)
//! - `SecretProvider` — source of the keyed-hash secret (external collaborator)
//!
//! The appender and verifier are generic over both, so production storage
//! and test doubles plug in without touching the chain logic.

use custos_contracts::{
    error::LedgerResult,
    record::{AuditRecord, TailPointer},
    secret::{SecretEpoch, SecretHandle},
};

/// Durable, append-only storage of ordered records for one chain.
///
/// Implementations must only ever expose fully committed records: a record
/// returned by `get`/`scan`/`tail` is complete, immutable, and will be
/// returned by every later call.  There is deliberately no delete or update
/// operation — removal of a committed record is exactly the tampering the
/// verifier exists to detect, so the storage layer refuses to express it.
pub trait LedgerStore: Send + Sync {
    /// The current tail of the chain, or `None` when the chain is empty.
    fn tail(&self) -> LedgerResult<Option<TailPointer>>;

    /// Fetch the record at `sequence`, or `None` if no such record exists.
    fn get(&self, sequence: u64) -> LedgerResult<Option<AuditRecord>>;

    /// All committed records with `start <= sequence <= end`, in sequence
    /// order, as one consistent snapshot.
    ///
    /// A physically absent sequence inside the range is simply not in the
    /// result — gap detection is the verifier's job, not the store's.
    fn scan(&self, start: u64, end: u64) -> LedgerResult<Vec<AuditRecord>>;

    /// Number of committed records.
    fn record_count(&self) -> LedgerResult<u64>;

    /// Append `record` if and only if the store's current tail matches
    /// `expected_tail` (`None` = the chain must be empty).
    ///
    /// This compare-and-commit is the store-level half of the single-writer
    /// guarantee: even if two appenders raced past the appender mutex, only
    /// one could commit against a given tail.  The check and the write are
    /// one atomic unit — on `TailConflict` (or any other error) nothing is
    /// persisted and the tail does not advance.
    fn commit(&self, record: AuditRecord, expected_tail: Option<&TailPointer>)
        -> LedgerResult<()>;
}

/// Supplier of the keyed-hash secret.  May rotate over time.
///
/// Rotation is owned entirely by the implementation; the ledger core only
/// reads.  Both methods fail closed: an error here aborts the append or
/// verification that needed the key, with no partial effects.
pub trait SecretProvider: Send + Sync {
    /// The secret to key new records with, tagged with its epoch.
    ///
    /// The appender stamps the returned epoch onto the record it commits.
    fn active_secret(&self) -> LedgerResult<SecretHandle>;

    /// The secret that was active for `epoch`, for verifying historical
    /// records written before a rotation.
    ///
    /// Returns `LedgerError::UnknownSecretEpoch` when the provider no
    /// longer holds that era's key.
    fn secret_for_epoch(&self, epoch: SecretEpoch) -> LedgerResult<SecretHandle>;
}
