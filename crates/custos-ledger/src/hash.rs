//! Keyed record hashing.
//!
//! Every record hash is an HMAC-SHA256 keyed with the epoch's secret, so a
//! party without the key cannot forge a record that verifies.  Every field
//! that contributes to the hash is listed explicitly so nothing is
//! accidentally omitted.
//!
//! Hash input layout (bytes, in order; `\x00` terminates each
//! variable-length payload field to keep the encoding unambiguous):
//!
//!   1. chain_id as hyphenated-UUID UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. secret_epoch as 4-byte little-endian
//!   4. timestamp as RFC 3339 UTC with fixed nanosecond precision, UTF-8
//!   5. event_type bytes, then `\x00`
//!   6. actor bytes, then `\x00`
//!   7. details bytes, then `\x00`
//!   8. prev_hash as UTF-8 bytes (64 ASCII hex chars)

use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use custos_contracts::{
    record::{AuditRecord, ChainId},
    secret::SecretEpoch,
};

type HmacSha256 = Hmac<Sha256>;

/// Compute the keyed hash for one record's fields.
///
/// Returns a lowercase 64-character hex string.  The same inputs and key
/// always produce the same output — determinism is what lets the verifier
/// recompute and compare.
///
/// # Panics
///
/// Never in practice: HMAC-SHA256 accepts keys of any length.
#[allow(clippy::too_many_arguments)]
pub fn hash_fields(
    key: &[u8],
    chain_id: ChainId,
    sequence: u64,
    epoch: SecretEpoch,
    timestamp: DateTime<Utc>,
    event_type: &str,
    actor: &str,
    details: &str,
    prev_hash: &str,
) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");

    mac.update(chain_id.to_string().as_bytes());
    mac.update(&sequence.to_le_bytes());
    mac.update(&epoch.0.to_le_bytes());
    mac.update(
        timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    mac.update(event_type.as_bytes());
    mac.update(b"\x00");
    mac.update(actor.as_bytes());
    mac.update(b"\x00");
    mac.update(details.as_bytes());
    mac.update(b"\x00");
    mac.update(prev_hash.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Recompute the expected `record_hash` of a committed record.
///
/// Used by the verifier: the result is compared against the stored
/// `record_hash`, and any difference means the record (or its link) was
/// modified after commit.
pub fn expected_hash(key: &[u8], record: &AuditRecord) -> String {
    hash_fields(
        key,
        record.chain_id,
        record.sequence,
        record.secret_epoch,
        record.timestamp,
        &record.event_type,
        &record.actor,
        &record.details,
        &record.prev_hash,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use custos_contracts::record::GENESIS_HASH;

    const KEY: &[u8] = b"test-signing-key";

    fn fixed_inputs() -> (ChainId, DateTime<Utc>) {
        (ChainId::new(), Utc::now())
    }

    /// Same inputs, same key, same hash — always.
    #[test]
    fn hash_is_deterministic() {
        let (chain_id, ts) = fixed_inputs();
        let a = hash_fields(
            KEY, chain_id, 1, SecretEpoch(1), ts, "login", "alice", "ok", GENESIS_HASH,
        );
        let b = hash_fields(
            KEY, chain_id, 1, SecretEpoch(1), ts, "login", "alice", "ok", GENESIS_HASH,
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Changing any single input changes the hash.
    #[test]
    fn hash_commits_to_every_field() {
        let (chain_id, ts) = fixed_inputs();
        let base = hash_fields(
            KEY, chain_id, 1, SecretEpoch(1), ts, "login", "alice", "ok", GENESIS_HASH,
        );

        let variants = [
            hash_fields(KEY, chain_id, 2, SecretEpoch(1), ts, "login", "alice", "ok", GENESIS_HASH),
            hash_fields(KEY, chain_id, 1, SecretEpoch(2), ts, "login", "alice", "ok", GENESIS_HASH),
            hash_fields(KEY, chain_id, 1, SecretEpoch(1), ts, "logout", "alice", "ok", GENESIS_HASH),
            hash_fields(KEY, chain_id, 1, SecretEpoch(1), ts, "login", "mallory", "ok", GENESIS_HASH),
            hash_fields(KEY, chain_id, 1, SecretEpoch(1), ts, "login", "alice", "no", GENESIS_HASH),
            hash_fields(KEY, chain_id, 1, SecretEpoch(1), ts, "login", "alice", "ok", &"ff".repeat(32)),
        ];
        for variant in variants {
            assert_ne!(base, variant);
        }
    }

    /// A different key produces a different hash — forgery without the
    /// secret is not possible.
    #[test]
    fn hash_depends_on_key() {
        let (chain_id, ts) = fixed_inputs();
        let a = hash_fields(
            KEY, chain_id, 1, SecretEpoch(1), ts, "login", "alice", "ok", GENESIS_HASH,
        );
        let b = hash_fields(
            b"other-key", chain_id, 1, SecretEpoch(1), ts, "login", "alice", "ok", GENESIS_HASH,
        );
        assert_ne!(a, b);
    }

    /// Field boundaries are unambiguous: shifting bytes between adjacent
    /// payload fields must not collide.
    #[test]
    fn field_separators_prevent_boundary_shifts() {
        let (chain_id, ts) = fixed_inputs();
        let a = hash_fields(
            KEY, chain_id, 1, SecretEpoch(1), ts, "ab", "c", "d", GENESIS_HASH,
        );
        let b = hash_fields(
            KEY, chain_id, 1, SecretEpoch(1), ts, "a", "bc", "d", GENESIS_HASH,
        );
        assert_ne!(a, b);
    }
}
