//! Host Error Types
//!
//! Fatal failures of a host run. Conditions that are normal during a run
//! (missing directories, no persisted manifest, a failed engine shutdown) are
//! not represented here; they are logged and reported through return values.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Engine status code (HRESULT convention: non-negative means success)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub i32);

impl Status {
    pub fn succeeded(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)
    }
}

/// Why a manifest line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    ExpectedQuote,
    MissingSeparator,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::ExpectedQuote => write!(f, "expected opening quote"),
            ParseFailure::MissingSeparator => write!(f, "missing field separator"),
        }
    }
}

/// Errors that abort a host run.
#[derive(Debug, Error)]
pub enum HostError {
    /// The persisted manifest exists but could not be opened or read.
    #[error("Unable to read TPA file {path}: {source}")]
    ManifestOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the persisted manifest is malformed.
    #[error("Invalid TPA file {path} at line {line}: {reason}")]
    ManifestParse {
        path: PathBuf,
        line: usize,
        reason: ParseFailure,
    },

    /// The engine shared library could not be loaded.
    #[error("Failed to load {path}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A required engine entry point is missing.
    #[error("Failed to bind {symbol}: {source}")]
    SymbolBind {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("Failed to initialize CoreCLR, HRESULT: {0}")]
    Initialize(Status),

    #[error("Failed to execute managed app, HRESULT: {0}")]
    Execute(Status),

    /// A string handed to the engine contains an interior NUL.
    #[error("Invalid argument for the engine: {0}")]
    InvalidArgument(String),
}

impl HostError {
    /// Exit code reported to the calling process for this failure
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// A specialized Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_convention() {
        assert!(Status(0).succeeded());
        assert!(Status(1).succeeded());
        assert!(!Status(-1).succeeded());
        assert!(!Status(0x8000_4005_u32 as i32).succeeded());
    }

    #[test]
    fn test_status_renders_as_hex() {
        assert_eq!(Status(0x8000_4005_u32 as i32).to_string(), "0x80004005");
        assert_eq!(Status(0).to_string(), "0x00000000");
    }

    #[test]
    fn test_parse_error_message() {
        let err = HostError::ManifestParse {
            path: PathBuf::from("app.tpa"),
            line: 3,
            reason: ParseFailure::MissingSeparator,
        };
        assert_eq!(
            err.to_string(),
            "Invalid TPA file app.tpa at line 3: missing field separator"
        );
        assert_eq!(err.exit_code(), 1);
    }
}
