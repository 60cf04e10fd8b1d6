//! Bundled `SecretProvider` implementations.
//!
//! Production deployments are expected to adapt their own key-management
//! collaborator to the `SecretProvider` trait.  The two providers here
//! cover the common cases: a fixed key, and in-process rotation that
//! retains historical epochs so old records remain verifiable.

use std::collections::BTreeMap;
use std::sync::RwLock;

use custos_contracts::{
    error::{LedgerError, LedgerResult},
    secret::{SecretEpoch, SecretHandle},
};
use custos_core::traits::SecretProvider;

/// A provider with one fixed key that never rotates.
pub struct StaticSecretProvider {
    handle: SecretHandle,
}

impl StaticSecretProvider {
    /// Epoch assigned to the first key of any provider.
    pub const INITIAL_EPOCH: SecretEpoch = SecretEpoch(1);

    /// Build a provider holding `key` under [`Self::INITIAL_EPOCH`].
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            handle: SecretHandle::new(Self::INITIAL_EPOCH, key),
        }
    }
}

impl SecretProvider for StaticSecretProvider {
    fn active_secret(&self) -> LedgerResult<SecretHandle> {
        Ok(self.handle.clone())
    }

    fn secret_for_epoch(&self, epoch: SecretEpoch) -> LedgerResult<SecretHandle> {
        if epoch == self.handle.epoch {
            Ok(self.handle.clone())
        } else {
            Err(LedgerError::UnknownSecretEpoch { epoch: epoch.0 })
        }
    }
}

/// Interior state of a `RotatingSecretProvider`.
struct RotatingState {
    active: SecretEpoch,
    keys: BTreeMap<SecretEpoch, Vec<u8>>,
}

/// A provider whose key can be rotated at runtime.
///
/// Every historical epoch is retained, so records written under an earlier
/// key keep verifying after any number of rotations.  Dropping old epochs
/// would turn historical verification into `UnknownSecretEpoch` failures —
/// an operational problem the operator owns, never an integrity finding.
pub struct RotatingSecretProvider {
    state: RwLock<RotatingState>,
}

impl RotatingSecretProvider {
    /// Build a provider whose first key is `key`, at epoch 1.
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        let mut keys = BTreeMap::new();
        let active = StaticSecretProvider::INITIAL_EPOCH;
        keys.insert(active, key.into());
        Self {
            state: RwLock::new(RotatingState { active, keys }),
        }
    }

    /// Install `key` as the new active secret and return its epoch.
    ///
    /// The previous key stays available through `secret_for_epoch`.
    pub fn rotate(&self, key: impl Into<Vec<u8>>) -> LedgerResult<SecretEpoch> {
        let mut state = self.state.write().map_err(|_| LedgerError::SecretUnavailable {
            reason: "secret provider lock poisoned".to_string(),
        })?;
        let next = SecretEpoch(state.active.0 + 1);
        state.keys.insert(next, key.into());
        state.active = next;
        Ok(next)
    }
}

impl SecretProvider for RotatingSecretProvider {
    fn active_secret(&self) -> LedgerResult<SecretHandle> {
        let state = self.state.read().map_err(|_| LedgerError::SecretUnavailable {
            reason: "secret provider lock poisoned".to_string(),
        })?;
        let key = state
            .keys
            .get(&state.active)
            .ok_or_else(|| LedgerError::SecretUnavailable {
                reason: format!("active epoch {} has no key", state.active),
            })?;
        Ok(SecretHandle::new(state.active, key.clone()))
    }

    fn secret_for_epoch(&self, epoch: SecretEpoch) -> LedgerResult<SecretHandle> {
        let state = self.state.read().map_err(|_| LedgerError::SecretUnavailable {
            reason: "secret provider lock poisoned".to_string(),
        })?;
        let key = state
            .keys
            .get(&epoch)
            .ok_or(LedgerError::UnknownSecretEpoch { epoch: epoch.0 })?;
        Ok(SecretHandle::new(epoch, key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_serves_one_epoch() {
        let provider = StaticSecretProvider::new(b"key-bytes".to_vec());
        let active = provider.active_secret().unwrap();
        assert_eq!(active.epoch, SecretEpoch(1));
        assert_eq!(active.key, b"key-bytes");

        assert!(provider.secret_for_epoch(SecretEpoch(1)).is_ok());
        assert!(matches!(
            provider.secret_for_epoch(SecretEpoch(2)),
            Err(LedgerError::UnknownSecretEpoch { epoch: 2 })
        ));
    }

    #[test]
    fn rotation_advances_epoch_and_keeps_history() {
        let provider = RotatingSecretProvider::new(b"first".to_vec());
        assert_eq!(provider.active_secret().unwrap().epoch, SecretEpoch(1));

        let second = provider.rotate(b"second".to_vec()).unwrap();
        assert_eq!(second, SecretEpoch(2));
        assert_eq!(provider.active_secret().unwrap().key, b"second");

        // The first era's key is still resolvable for historical records.
        let historical = provider.secret_for_epoch(SecretEpoch(1)).unwrap();
        assert_eq!(historical.key, b"first");
    }

    #[test]
    fn unknown_epoch_is_an_operational_error() {
        let provider = RotatingSecretProvider::new(b"only".to_vec());
        assert!(matches!(
            provider.secret_for_epoch(SecretEpoch(9)),
            Err(LedgerError::UnknownSecretEpoch { epoch: 9 })
        ));
    }
}
