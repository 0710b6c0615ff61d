//! Configuration
//!
//! Static options for a [`HyperZone`](crate::zone::HyperZone). They can be built
//! in code or read from JSON, and every field has a default so partial documents
//! are accepted.
//!
//! ```rust,ignore
//! let config = HyperZoneConfig::from_json(r#"{ "debug": { "strict_fragments": false } }"#)?;
//! assert!(config.debug.report_errors);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for a hyperzone dispatcher and the renderers built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperZoneConfig {
    pub debug: DebugConfig,
}

/// Diagnostic switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log dispatch misses at `error` level before returning the error.
    pub report_errors: bool,

    /// Reject props passed to a fragment instead of ignoring them.
    ///
    /// Defaults to on in debug builds only.
    pub strict_fragments: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            report_errors: true,
            strict_fragments: cfg!(debug_assertions),
        }
    }
}

impl HyperZoneConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
