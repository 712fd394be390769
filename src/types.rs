/*!
 * Core types shared by the export and import pipelines
 */

use std::path::PathBuf;

use serde::Serialize;
use strum::{AsRefStr, Display};

/// A declared path paired with its text content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Bare file name on export, declared relative path on import
    pub path: String,
    /// Complete text content of the file
    pub content: String,
}

impl FileRecord {
    /// Create a new record
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// How content lines are rendered inside a blob
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Raw content; any line starting with `//` reads back as a marker
    #[default]
    Plain,
    /// Content lines starting with `//` or `\` carry one extra leading `\`
    Escaped,
}

/// Answer given for a single import target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    /// Write the file
    Accept,
    /// Leave the file as it is
    Reject,
    /// Leave this file and every remaining one as they are
    Stop,
}

/// Outcome of one entry of an import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(tag = "status", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Disposition {
    /// The file was written
    Updated,
    /// The operator declined the write
    Skipped,
    /// The entry failed; the message names the cause
    Error {
        /// Error category
        kind: String,
        /// Human readable description
        message: String,
    },
    /// A stop decision was given at or before this entry
    Aborted,
}

/// Per-file line of an import report
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    /// Path as declared in the blob
    pub declared: String,
    /// Target path on disk (base directory joined with the declared path)
    pub target: PathBuf,
    /// What happened to this entry
    #[serde(flatten)]
    pub disposition: Disposition,
}

/// Result of a full import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// One entry per parsed record, in blob order
    pub entries: Vec<EntryReport>,
}

impl ImportReport {
    /// Count entries with the given outcome label
    pub fn count(&self, label: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.disposition.as_ref() == label)
            .count()
    }

    /// True if any entry ended in an error
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.disposition, Disposition::Error { .. }))
    }

    /// Disposition recorded for a declared path
    pub fn disposition_of(&self, declared: &str) -> Option<&Disposition> {
        self.entries
            .iter()
            .find(|e| e.declared == declared)
            .map(|e| &e.disposition)
    }
}
