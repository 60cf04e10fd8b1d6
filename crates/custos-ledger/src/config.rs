//! Ledger configuration.
//!
//! `LedgerConfig` carries the deployment-level knobs: the payload size
//! bound enforced by the appender and the in-flight window the operator
//! wants verification to skip.  Loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use custos_contracts::error::{LedgerError, LedgerResult};

/// Default payload bound: 64 KiB across `event_type` + `actor` + `details`.
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Tunable parameters for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum combined payload size accepted by the appender, in bytes.
    /// Oversized events fail with `PayloadTooLarge` before any I/O.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// How many records at the tail the verifier should skip by default.
    ///
    /// Both bundled stores expose only fully committed records, so 0 is
    /// correct for them; deployments whose storage has weaker read
    /// isolation set a positive window to avoid false positives from
    /// mid-commit records.
    #[serde(default)]
    pub tail_exclusion: u64,
}

fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            tail_exclusion: 0,
        }
    }
}

impl LedgerConfig {
    /// Parse `s` as a TOML configuration document.
    ///
    /// Returns `LedgerError::Config` if the TOML is malformed or does not
    /// match the expected fields.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        toml::from_str(s).map_err(|e| LedgerError::Config {
            reason: format!("failed to parse ledger config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
