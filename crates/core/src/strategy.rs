//! Execution strategy tags
//!
//! A session executes statements under exactly one strategy. The set is
//! closed; numeric codes outside it only ever surface through
//! [`display_name`], which maps them to [`UNKNOWN_STRATEGY_NAME`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display name returned for any code outside the known strategy set
pub const UNKNOWN_STRATEGY_NAME: &str = "UNKNOWN";

/// How a database session executes statements
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ExecutionStrategy {
    /// A fresh statement per execution
    #[default]
    Simple = 0,
    /// Prepared statements are reused across executions
    Reuse = 1,
    /// Statements are batched and flushed together
    Batch = 2,
}

impl ExecutionStrategy {
    /// Every known strategy, in code order
    pub const ALL: [ExecutionStrategy; 3] = [
        ExecutionStrategy::Simple,
        ExecutionStrategy::Reuse,
        ExecutionStrategy::Batch,
    ];

    /// Stable numeric code of this strategy
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a strategy by its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ExecutionStrategy::Simple),
            1 => Some(ExecutionStrategy::Reuse),
            2 => Some(ExecutionStrategy::Batch),
            _ => None,
        }
    }

    /// Upper-case display name (`SIMPLE`, `REUSE`, `BATCH`)
    pub fn name(self) -> &'static str {
        display_name(self.code())
    }
}

/// Map a strategy code to its display name
///
/// Total over `u8`: codes without a known strategy yield
/// [`UNKNOWN_STRATEGY_NAME`].
pub fn display_name(code: u8) -> &'static str {
    match code {
        0 => "SIMPLE",
        1 => "REUSE",
        2 => "BATCH",
        _ => UNKNOWN_STRATEGY_NAME,
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ExecutionStrategy::Simple),
            "reuse" => Ok(ExecutionStrategy::Reuse),
            "batch" => Ok(ExecutionStrategy::Batch),
            "" => Err(Error::InvalidArgument(
                "execution strategy must not be empty".to_string(),
            )),
            other => Err(Error::InvalidArgument(format!(
                "unknown execution strategy '{}', expected simple, reuse or batch",
                other
            ))),
        }
    }
}
