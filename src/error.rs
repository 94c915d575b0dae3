//! Engine error types.
//!
//! Every failure is fatal to the request that triggered it. Callers map
//! [`ErrorKind`] to a user-facing status; nothing here is retried internally.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while synthesizing a load profile.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No historical trace exists for the requested family, level or unit count.
    #[error("configuration not found: {0}")]
    ConfigurationNotFound(String),

    /// The historical trace is malformed.
    #[error("corrupt trace {path}: {message}")]
    CorruptTrace { path: String, message: String },

    /// The trace file exists but could not be read.
    #[error("cannot read trace {}: {source}", path.display())]
    TraceIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The requested window cannot be mapped onto the reference year.
    #[error("date mapping failed: {0}")]
    DateMapping(String),

    /// No samples fall inside the requested window.
    #[error("no data: {0}")]
    EmptyInput(String),

    /// `end <= start`, or a timestamp that does not parse.
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Request payload or appliance parameters that cannot be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A generator failed; tagged with the appliance family it ran for.
    #[error("{family}: {source}")]
    Appliance {
        family: String,
        #[source]
        source: Box<EngineError>,
    },
}

/// Flat classification of [`EngineError`], ignoring appliance tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationNotFound,
    CorruptTrace,
    TraceIo,
    DateMapping,
    EmptyInput,
    InvalidWindow,
    InvalidRequest,
}

impl EngineError {
    /// Returns the kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigurationNotFound(_) => ErrorKind::ConfigurationNotFound,
            EngineError::CorruptTrace { .. } => ErrorKind::CorruptTrace,
            EngineError::TraceIo { .. } => ErrorKind::TraceIo,
            EngineError::DateMapping(_) => ErrorKind::DateMapping,
            EngineError::EmptyInput(_) => ErrorKind::EmptyInput,
            EngineError::InvalidWindow(_) => ErrorKind::InvalidWindow,
            EngineError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            EngineError::Appliance { source, .. } => source.kind(),
        }
    }

    /// Returns the appliance family this error was raised for, if any.
    pub fn family(&self) -> Option<&str> {
        match self {
            EngineError::Appliance { family, .. } => Some(family),
            _ => None,
        }
    }

    /// Wraps `self` with the appliance family that produced it.
    pub fn for_family(self, family: &str) -> Self {
        EngineError::Appliance {
            family: family.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn corrupt(path: impl fmt::Display, message: impl Into<String>) -> Self {
        EngineError::CorruptTrace {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ConfigurationNotFound => "ConfigurationNotFoundError",
            ErrorKind::CorruptTrace => "CorruptTraceError",
            ErrorKind::TraceIo => "TraceIoError",
            ErrorKind::DateMapping => "DateMappingError",
            ErrorKind::EmptyInput => "EmptyInputError",
            ErrorKind::InvalidWindow => "InvalidWindowError",
            ErrorKind::InvalidRequest => "InvalidRequestError",
        };
        f.write_str(name)
    }
}
