//! # custos-verify
//!
//! Chain-integrity verification for the CUSTOS audit ledger.
//!
//! ## Overview
//!
//! The verifier walks a committed snapshot of the chain, recomputes every
//! record's keyed hash from its predecessor's stored hash and its own
//! fields, and pinpoints the exact sequence where the chain breaks — with
//! distinct findings for in-place modification (hash mismatch), link
//! rewriting, and deletion (sequence gap).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use custos_verify::{ChainVerifier, VerifyOptions};
//!
//! let verifier = ChainVerifier::new(store, secrets);
//! let report = verifier.verify_all()?;
//! if !report.intact {
//!     println!("{}", report.summary());
//! }
//! ```

pub mod engine;
pub mod options;

pub use engine::ChainVerifier;
pub use options::{CancelFlag, VerifyOptions};

// ── Tests ─────────────────────────────────────────────────────────────────────
