/*!
 * blobfs - Flatten a source tree into a delimited text blob and restore it
 *
 * Export walks a folder, reads every file with a given extension and joins
 * them into one text blob where each file starts with a `// <name>` marker
 * line. Import parses such a blob back into a path to content mapping and
 * writes each file under a base folder after asking for confirmation.
 */

pub mod clipboard;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod report;
pub mod restorer;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


use std::path::Path;

// Re-export main components for easier access
pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use config::{ExportConfig, ImportConfig};
pub use error::{BlobFsError, Result};
pub use parser::{parse, FileMap, Parser};
pub use report::{ExportReport, ReportFormat, Reporter};
pub use restorer::{Announced, AssumeYes, Confirm, Restorer, TerminalPrompt};
pub use scanner::Collector;
pub use types::{Decision, Dialect, Disposition, EntryReport, FileRecord, ImportReport};
pub use writer::{serialize, BlobWriter, Exported};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `blob` and write its entries under `base_dir`, asking `confirm` for each.
///
/// Fails only when `parser` is strict and the blob is malformed; per-file
/// failures are part of the returned report.
pub fn import<C>(blob: &str, base_dir: &Path, parser: Parser, confirm: &mut C) -> Result<ImportReport>
where
    C: Confirm + ?Sized,
{
    let files = parser.parse(blob)?;
    Ok(Restorer::new(base_dir).restore(&files, confirm))
}
