//! Registry configuration via `sessionhold.toml`
//!
//! Collaborators that create registries load one config at startup and
//! apply it to every builder with [`SessionRegistryBuilder::config`].
//!
//! [`SessionRegistryBuilder::config`]: crate::SessionRegistryBuilder::config

use serde::{Deserialize, Serialize};
use sessionhold_core::{Error, ExecutionStrategy, Result};
use std::path::Path;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "sessionhold.toml";

/// What commit does after a session fails to commit
///
/// Close ignores this and always attempts every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit every session, then report all failures
    #[default]
    AttemptAll,
    /// Stop at the first failing session
    StopOnFirstFailure,
}

/// Registry configuration loaded from `sessionhold.toml`.
///
/// # Example
///
/// ```toml
/// commit_policy = "attempt_all"
/// default_strategy = "simple"
/// # timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Behaviour of commit after a failure.
    #[serde(default)]
    pub commit_policy: CommitPolicy,
    /// Strategy used when the builder is not given one.
    #[serde(default)]
    pub default_strategy: ExecutionStrategy,
    /// Transaction timeout applied to new holders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl RegistryConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# sessionhold registry configuration
#
# Commit policy when a session fails to commit:
#   "attempt_all"            = commit every session, report all failures (default)
#   "stop_on_first_failure"  = stop at the first failing session
# Close always attempts every session regardless of this setting.
commit_policy = "attempt_all"

# Strategy of the default session when none is given: "simple", "reuse" or "batch"
default_strategy = "simple"

# Transaction timeout in seconds applied to new holders (default: none)
# timeout_secs = 30
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the text is not valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::InvalidArgument(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `InvalidArgument` if it
    /// cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::InvalidArgument(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidArgument(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
