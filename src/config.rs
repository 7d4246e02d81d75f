//! Scenario configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default null-sentinel token for scenario tables.
pub const DEFAULT_NULL_SENTINEL: &str = "NULL";

/// Per-scenario configuration, cloned from the environment's base
/// configuration at scenario start so per-scenario changes never leak back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Token standing in for a true null in scenario tables
    #[serde(default = "default_null_sentinel")]
    pub null_sentinel: String,

    /// Command timeout in seconds, applied to opened connections
    #[serde(default)]
    pub command_timeout_secs: Option<i64>,

    /// Echo executed SQL text via tracing; no effect on execution semantics
    #[serde(default)]
    pub debug_sql: bool,
}

fn default_null_sentinel() -> String {
    DEFAULT_NULL_SENTINEL.to_string()
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            null_sentinel: default_null_sentinel(),
            command_timeout_secs: None,
            debug_sql: false,
        }
    }
}

impl ScenarioConfig {
    /// The configured command timeout, if any.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs
            .and_then(|secs| u64::try_from(secs).ok())
            .map(Duration::from_secs)
    }

    /// Set the command timeout from a duration string like "300", "300s",
    /// "30m", or "1h".
    pub fn set_command_timeout_str(&mut self, value: &str) -> anyhow::Result<()> {
        self.command_timeout_secs = Some(parse_duration_to_secs(value)?);
        Ok(())
    }
}

/// Parse a duration string like "1h", "30m", "300s", "300" into seconds.
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
pub fn parse_duration_to_secs(s: &str) -> anyhow::Result<i64> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    // Check for suffix
    if let Some(num_str) = s.strip_suffix('h') {
        let hours: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid hours value: {num_str}"))?;
        return Ok(hours * 3600);
    }
    if let Some(num_str) = s.strip_suffix('m') {
        let minutes: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid minutes value: {num_str}"))?;
        return Ok(minutes * 60);
    }
    if let Some(num_str) = s.strip_suffix('s') {
        let secs: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid seconds value: {num_str}"))?;
        return Ok(secs);
    }

    // No suffix - treat as seconds
    s.parse::<i64>()
        .with_context(|| format!("Invalid duration value: {s}"))
}
