//! Error types for the CUSTOS audit ledger.
//!
//! All fallible ledger operations return `LedgerResult<T>`.  Every variant
//! here is an **operational** error — recoverable, retryable by the caller,
//! and guaranteed to leave the chain untouched.  Integrity violations
//! (hash mismatches, sequence gaps) are deliberately NOT errors: they are
//! findings inside a `VerificationReport`, because a broken chain is a
//! conclusive result the verifier must report, not a condition to retry.

use thiserror::Error;

/// The unified error type for the CUSTOS ledger crates.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The event payload exceeds the configured size bound.
    ///
    /// Returned before any storage or secret access happens.
    #[error("payload of {actual} bytes exceeds the {limit}-byte limit")]
    PayloadTooLarge { actual: usize, limit: usize },

    /// The secret provider could not supply the active signing secret.
    ///
    /// Fail-closed: an append that cannot be keyed is refused outright.
    /// The caller is expected to retry with backoff, never to proceed
    /// without audit coverage.
    #[error("signing secret unavailable: {reason}")]
    SecretUnavailable { reason: String },

    /// The secret provider no longer holds the secret for a historical epoch.
    ///
    /// Surfaces during verification of records written under a rotated-out
    /// key.  This is an operational failure of the provider, not evidence
    /// of tampering.
    #[error("no secret available for epoch {epoch}")]
    UnknownSecretEpoch { epoch: u32 },

    /// The store's tail moved between the appender reading it and the
    /// commit attempt.
    ///
    /// Cannot occur while all writes go through one `ChainAppender`; the
    /// store still enforces it so a misbehaving second writer can never
    /// fork the chain.
    #[error("tail conflict: expected tail at sequence {expected}, store is at {found}")]
    TailConflict { expected: u64, found: u64 },

    /// The underlying store failed to read or persist a record.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// The caller is not authorized for this operation.
    ///
    /// Enforcement belongs to the external access-control collaborator;
    /// this variant exists so its findings share the ledger error surface.
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the CUSTOS crates.
pub type LedgerResult<T> = Result<T, LedgerError>;
