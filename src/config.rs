//! Reporter configuration
//!
//! Read from a flat TOML document or from `PW_REPORTER_*`
//! environment variables. Defaults: compact NDJSON on stdout, phase-failure
//! channel off.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{ReporterError, Result};
use crate::event::WireFormat;

pub const ENV_OUTPUT: &str = "PW_REPORTER_OUTPUT";
pub const ENV_PRETTY: &str = "PW_REPORTER_PRETTY";
pub const ENV_PHASE_FAILURES: &str = "PW_REPORTER_PHASE_FAILURES";

/// Reporter configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReporterConfig {
    /// Where the event stream goes
    #[serde(default)]
    pub output: OutputTarget,

    /// Indented multi-line records instead of NDJSON
    #[serde(default)]
    pub pretty: bool,

    /// Emit an extra `onStepEnd` for every failing setup/call/teardown phase
    #[serde(default)]
    pub phase_failures: bool,
}

/// Output channel of the event stream
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(from = "String")]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    File(PathBuf),
}

impl From<String> for OutputTarget {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "-" | "stdout" => Self::Stdout,
            "stderr" => Self::Stderr,
            _ => Self::File(PathBuf::from(value)),
        }
    }
}

impl ReporterConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read `PW_REPORTER_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(output) = lookup(ENV_OUTPUT) {
            config.output = OutputTarget::from(output);
        }
        if let Some(pretty) = lookup(ENV_PRETTY) {
            config.pretty = parse_flag(ENV_PRETTY, &pretty)?;
        }
        if let Some(phase) = lookup(ENV_PHASE_FAILURES) {
            config.phase_failures = parse_flag(ENV_PHASE_FAILURES, &phase)?;
        }
        Ok(config)
    }

    pub fn wire_format(&self) -> WireFormat {
        if self.pretty {
            WireFormat::Pretty
        } else {
            WireFormat::Compact
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ReporterError::Config {
            reason: format!("{} must be a boolean, got '{}'", key, other),
        }),
    }
}
