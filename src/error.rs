//! Global error handling for blobfs
//!
//! One error type covers both pipelines. Export errors abort the whole run;
//! import errors are caught per entry by the restorer and recorded as a
//! disposition instead of being propagated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for blobfs operations
#[derive(Error, Debug)]
pub enum BlobFsError {
    /// A selected file could not be read or is not valid UTF-8
    #[error("Failed to collect {}: {source}", .path.display())]
    Collection {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The blob does not follow the marker format (strict mode only)
    #[error("Format error: {0}")]
    Format(String),

    /// An ancestor directory of an import target could not be created
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A confirmed import target could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A declared path cannot be placed under the base directory
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),


    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Specialized Result type for blobfs operations
pub type Result<T> = std::result::Result<T, BlobFsError>;

/// Creates a BlobFsError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::BlobFsError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

impl BlobFsError {
    /// Short label used in disposition tables
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Collection { .. } => "collection",
            Self::Format(_) => "format",
            Self::DirectoryCreation { .. } => "directory",
            Self::Write { .. } => "write",
            Self::InvalidPath(_) => "path",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Json(_) => "json",
        }
    }
}

// main() returns io::Result, keep the conversion close to the error type
impl From<BlobFsError> for io::Error {
    fn from(err: BlobFsError) -> Self {
        match err {
            BlobFsError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
