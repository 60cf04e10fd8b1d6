//! The producer-facing event payload.
//!
//! `AuditEvent` is what the rest of the application hands to the appender.
//! The ledger core treats every field as an uninterpreted blob — it bounds
//! the total size and binds the bytes into the record hash, nothing more.

use serde::{Deserialize, Serialize};

/// An audit event submitted for appending.
///
/// The three fields become the payload of exactly one `AuditRecord`.
/// Sequence, timestamp, epoch, and both hashes are assigned by the appender
/// at commit time and can never be supplied by the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event discriminant (e.g. "record_accessed", "consent_revoked").
    pub event_type: String,
    /// The identity that caused the event.
    pub actor: String,
    /// Free-form payload.
    pub details: String,
}

impl AuditEvent {
    /// Build an event from anything string-like.
    pub fn new(
        event_type: impl Into<String>,
        actor: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            actor: actor.into(),
            details: details.into(),
        }
    }

    /// Total payload size in bytes, as counted against the configured bound.
    pub fn payload_len(&self) -> usize {
        self.event_type.len() + self.actor.len() + self.details.len()
    }
}
