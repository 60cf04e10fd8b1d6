//! # custos-ledger
//!
//! The write path of the CUSTOS tamper-evident audit ledger.
//!
//! ## Overview
//!
//! Every audit event the application emits becomes exactly one
//! `AuditRecord`, keyed-hashed (HMAC-SHA256) over its own payload and its
//! predecessor's hash.  The `ChainAppender` is the only writer: it serializes
//! concurrent producers through one writer lane and commits via the store's
//! append-if-tail-matches primitive, so the chain can never fork.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use custos_contracts::{AuditEvent, ChainId};
//! use custos_ledger::{ChainAppender, LedgerConfig, MemoryLedgerStore, StaticSecretProvider};
//!
//! let store = Arc::new(MemoryLedgerStore::new());
//! let secrets = Arc::new(StaticSecretProvider::new(key_bytes));
//! let appender = ChainAppender::new(ChainId::new(), store, secrets, LedgerConfig::default());
//! let receipt = appender.append(AuditEvent::new("consent_revoked", "patient-7", "{}"))?;
//! ```

pub mod appender;
pub mod config;
pub mod file;
pub mod hash;
pub mod memory;
pub mod secret;

pub use appender::ChainAppender;
pub use config::LedgerConfig;
pub use file::JsonlLedgerStore;
pub use hash::{expected_hash, hash_fields};
pub use memory::MemoryLedgerStore;
pub use secret::{RotatingSecretProvider, StaticSecretProvider};

// ── Tests ─────────────────────────────────────────────────────────────────────
