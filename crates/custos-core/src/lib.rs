//! # custos-core
//!
//! Trait seams for the CUSTOS audit ledger.
//!
//! This crate provides the two traits every other component is generic over:
//! `LedgerStore` (durable append-only storage) and `SecretProvider` (the
//! keyed-hash secret source).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_core::traits::{LedgerStore, SecretProvider};
//! ```

pub mod traits;

pub use traits::{LedgerStore, SecretProvider};
