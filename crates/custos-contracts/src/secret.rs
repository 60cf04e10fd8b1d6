//! Signing-secret handle types.
//!
//! The secret itself is owned and rotated by an external collaborator; the
//! ledger core only ever reads it.  `SecretHandle` pairs key bytes with the
//! epoch they belong to so every record can be tagged with the epoch that
//! keyed its hash.

use serde::{Deserialize, Serialize};

/// Monotonically increasing identifier for one key era.
///
/// Rotation bumps the epoch; verification of a historical record looks up
/// the key for the epoch stamped on that record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SecretEpoch(pub u32);

impl std::fmt::Display for SecretEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Key material for one epoch.
///
/// The `Debug` impl never prints key bytes — handles flow through tracing
/// spans and error paths, and a leaked signing key defeats the whole
/// tamper-evidence guarantee.
#[derive(Clone)]
pub struct SecretHandle {
    /// The epoch this key belongs to.
    pub epoch: SecretEpoch,
    /// Raw key bytes for the keyed hash.
    pub key: Vec<u8>,
}

impl SecretHandle {
    /// Build a handle for `epoch` from raw key bytes.
    pub fn new(epoch: SecretEpoch, key: impl Into<Vec<u8>>) -> Self {
        Self {
            epoch,
            key: key.into(),
        }
    }
}

impl std::fmt::Debug for SecretHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretHandle")
            .field("epoch", &self.epoch)
            .field("key", &"<redacted>")
            .finish()
    }
}
