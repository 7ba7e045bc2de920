//! Bridge configuration

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// What to do with an argument that contains a NUL byte
///
/// A NUL cannot appear inside a C string, so such an argument can either be
/// refused or cut at the first NUL (what a `strlen`-based copy would do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NulPolicy {
    #[default]
    Reject,
    Truncate,
}

impl NulPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NulPolicy::Reject => "reject",
            NulPolicy::Truncate => "truncate",
        }
    }
}

/// Configuration for an [`ArgvBridge`](crate::ArgvBridge)
///
/// # Example
/// ```
/// use argv_bridge::{BridgeConfig, NulPolicy};
///
/// let config = BridgeConfig::from_json(r#"{"nul_policy": "truncate"}"#).unwrap();
/// assert_eq!(config.nul_policy, NulPolicy::Truncate);
/// assert!(config.catch_panics);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub nul_policy: NulPolicy,
    /// Turn a panicking Rust entry point into `EntryPointPanicked`
    pub catch_panics: bool,
    /// Log every marshalled argument at trace level
    pub log_arguments: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            nul_policy: NulPolicy::Reject,
            catch_panics: true,
            log_arguments: false,
        }
    }
}

impl BridgeConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(json).map_err(|e| BridgeError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(|e| BridgeError::InvalidConfig(e.to_string()))
    }
}
