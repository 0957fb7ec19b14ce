//! Error types with fix suggestions
//!
//! Reporting failures never reach test code: the sink and installer log and
//! swallow them. `ReporterError` covers the places where the caller asked for
//! something explicit (building a sink from config, dispatching a call through
//! [`TargetRef`](crate::surface::TargetRef)).

use thiserror::Error;

use crate::surface::{CallingConvention, TargetKind};

pub type Result<T> = std::result::Result<T, ReporterError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("PWR-001: {target} has no operation '{name}'")]
    UnknownOperation { target: TargetKind, name: String },

    #[error("PWR-002: {target}.{name} is {actual}, but was called as {expected}")]
    ConventionMismatch {
        target: TargetKind,
        name: String,
        expected: CallingConvention,
        actual: CallingConvention,
    },

    #[error("PWR-010: Invalid reporter config: {reason}")]
    Config { reason: String },

    #[error("PWR-011: Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("PWR-020: IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PWR-021: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixSuggestion for ReporterError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ReporterError::UnknownOperation { .. } => {
                Some("Register the operation on the target type before calling it")
            }
            ReporterError::ConventionMismatch { .. } => {
                Some("Use call() for blocking operations and call_async() for suspending ones")
            }
            ReporterError::Config { .. } => {
                Some("Use output = \"stdout\", \"stderr\" or a file path")
            }
            ReporterError::ConfigParse(_) => Some("Check TOML syntax and key names"),
            ReporterError::Io(_) => Some("Check the output path exists and is writable"),
            ReporterError::Json(_) => None,
        }
    }
}
