//! Guard configuration

use serde::{Deserialize, Serialize};

use crate::open::OpenPolicy;

/// What a denial does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    /// Reject the mutation
    #[default]
    Enforce,
    /// Log the violation and let the mutation through
    Report,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("open() interception cannot be enabled: its behavior is unresolved")]
    OpenPolicyUnresolved,
}

/// Guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub mode: EnforcementMode,
    pub open_policy: OpenPolicy,
    /// Index of the top realm of the isolation boundary
    pub top_realm: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: EnforcementMode::Enforce,
            open_policy: OpenPolicy::Disabled,
            top_realm: 0,
        }
    }
}

impl GuardConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GuardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.open_policy {
            OpenPolicy::Disabled => Ok(()),
            OpenPolicy::Enabled => Err(ConfigError::OpenPolicyUnresolved),
        }
    }

    pub fn is_report_only(&self) -> bool {
        self.mode == EnforcementMode::Report
    }
}
