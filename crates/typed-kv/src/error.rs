//! Error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by a typed database handle.
#[derive(Debug, Error)]
pub enum Error {
    /// A read or write was issued on a handle with no open connection.
    #[error("Database is not open")]
    NotOpen,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the engine reported the key as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Engine(EngineError::NotFound))
    }

    /// True when the stored bytes could not be decoded as the requested type.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

/// Status reported by the storage engine, passed through untouched.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not found")]
    NotFound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corruption: {0}")]
    Corruption(String),

    #[error("Engine error: {0}")]
    Other(String),
}

/// Stored bytes did not decode into the requested type.
#[derive(Debug, Error)]
#[error("Parse failed for {target}: {reason}")]
pub struct ParseError {
    target: &'static str,
    reason: String,
}

impl ParseError {
    pub fn new(target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            target,
            reason: reason.into(),
        }
    }

    /// Name of the type the bytes were decoded as.
    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The record serializer refused a value. Nothing is written when this occurs.
#[derive(Debug, Error)]
#[error("Encode failed for {target}: {reason}")]
pub struct EncodeError {
    target: &'static str,
    reason: String,
}

impl EncodeError {
    pub fn new(target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            target,
            reason: reason.into(),
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
