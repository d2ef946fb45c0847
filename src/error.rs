//! Error types
//!
//! None of these escape a simulation tick. Asset failures are recovered with
//! placeholders, transition errors are logged and ignored by the UI path.

use std::fmt;
use std::path::PathBuf;

use crate::sim::GamePhase;

/// Failure to load or validate a JSON configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// A texture that could not be produced by an asset source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    NotFound { name: String, url: String },
    Decode { name: String, reason: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name, url } => write!(f, "asset '{name}' not found at {url}"),
            Self::Decode { name, reason } => write!(f, "asset '{name}' could not be decoded: {reason}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// A requested session state change that the state machine does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    Invalid { from: GamePhase, to: GamePhase },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { from, to } => write!(f, "no transition from {from:?} to {to:?}"),
        }
    }
}

impl std::error::Error for TransitionError {}
