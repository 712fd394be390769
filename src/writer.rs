/*!
 * Blob serialization and the export sink
 */

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::{info, warn};

use crate::clipboard::Clipboard;
use crate::config::ExportConfig;
use crate::error::Result;
use crate::types::{Dialect, FileRecord};

/// Prefix that opens a record
pub const MARKER_PREFIX: &str = "//";

/// Escape character of the escaped dialect
pub const ESCAPE: char = '\\';

/// Append one record to `out`.
///
/// The record is rendered as `// <path>`, a blank line, the content and a
/// separating blank line. Content that does not end with a newline gets one
/// so that the separator stays on a line of its own.
pub fn render_record(out: &mut String, record: &FileRecord, dialect: Dialect) {
    out.push_str(MARKER_PREFIX);
    out.push(' ');
    out.push_str(&record.path);
    out.push_str("\n\n");

    if record.content.is_empty() {
        return;
    }

    match dialect {
        Dialect::Plain => out.push_str(&record.content),
        Dialect::Escaped => {
            for line in record.content.split_inclusive('\n') {
                if line.starts_with(MARKER_PREFIX) || line.starts_with(ESCAPE) {
                    out.push(ESCAPE);
                }
                out.push_str(line);
            }
        }
    }

    if !record.content.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
}

/// Join records into one blob, stopping at the first failed record
pub fn serialize<I>(records: I, dialect: Dialect) -> Result<String>
where
    I: IntoIterator<Item = Result<FileRecord>>,
{
    let mut blob = String::new();
    for record in records {
        render_record(&mut blob, &record?, dialect);
    }
    Ok(blob)
}

/// Summary of a finished export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exported {
    /// Number of records in the blob
    pub records: usize,
    /// Size of the blob in bytes
    pub bytes: usize,
    /// Whether the blob reached the clipboard
    pub copied: bool,
}

/// Writes a blob to the output file and optionally to the clipboard
pub struct BlobWriter {
    /// Writer configuration
    config: ExportConfig,
}

impl BlobWriter {
    /// Create a new blob writer
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Serialize `records` and persist the result.
    ///
    /// Nothing is written unless every record was collected. A clipboard
    /// failure is logged and reported through [`Exported::copied`], the
    /// output file is kept either way.
    pub fn export<I>(&self, records: I, clipboard: Option<&dyn Clipboard>) -> Result<Exported>
    where
        I: IntoIterator<Item = Result<FileRecord>>,
    {
        let mut count = 0;
        let blob = serialize(
            records.into_iter().inspect(|r| count += r.is_ok() as usize),
            self.config.dialect,
        )?;

        self.write(&blob)?;

        let copied = match clipboard {
            Some(clipboard) => match clipboard.copy_to_clipboard(&blob) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "failed to copy blob to clipboard");
                    false
                }
            },
            None => false,
        };

        Ok(Exported {
            records: count,
            bytes: blob.len(),
            copied,
        })
    }

    /// Write the blob to the output file, replacing any previous content
    pub fn write(&self, blob: &str) -> Result<()> {
        let file = File::create(&self.config.output_file)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(blob.as_bytes())?;
        writer.flush()?;

        info!(
            path = %self.config.output_file.display(),
            bytes = blob.len(),
            "blob written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardError, Result as ClipboardResult};
    use crate::error::BlobFsError;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingClipboard {
        copied: RefCell<Option<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn copy_to_clipboard(&self, text: &str) -> ClipboardResult<()> {
            *self.copied.borrow_mut() = Some(text.to_string());
            Ok(())
        }
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn copy_to_clipboard(&self, _text: &str) -> ClipboardResult<()> {
            Err(ClipboardError::NoClipboardFound)
        }
    }

    #[test]
    fn test_render_matches_wire_format() {
        let blob = serialize(
            vec![
                Ok(FileRecord::new("a.txt", "hello\n")),
                Ok(FileRecord::new("c.txt", "world\n")),
            ],
            Dialect::Plain,
        )
        .unwrap();
        assert_eq!(blob, "// a.txt\n\nhello\n\n// c.txt\n\nworld\n\n");
    }

    #[test]
    fn test_render_closes_unterminated_last_line() {
        let mut out = String::new();
        render_record(&mut out, &FileRecord::new("x.dart", "int x = 1;"), Dialect::Plain);
        assert_eq!(out, "// x.dart\n\nint x = 1;\n\n");
    }

    #[test]
    fn test_render_empty_content() {
        let mut out = String::new();
        render_record(&mut out, &FileRecord::new("empty.dart", ""), Dialect::Plain);
        assert_eq!(out, "// empty.dart\n\n");
    }

    #[test]
    fn test_plain_dialect_keeps_comment_lines_raw() {
        let mut out = String::new();
        render_record(&mut out, &FileRecord::new("m.dart", "// comment\ncode\n"), Dialect::Plain);
        assert_eq!(out, "// m.dart\n\n// comment\ncode\n\n");
    }

    #[test]
    fn test_escaped_dialect_prefixes_marker_like_lines() {
        let mut out = String::new();
        let record = FileRecord::new("m.dart", "// comment\n\\raw\ncode // trailing\n");
        render_record(&mut out, &record, Dialect::Escaped);
        assert_eq!(out, "// m.dart\n\n\\// comment\n\\\\raw\ncode // trailing\n\n");
    }

    #[test]
    fn test_serialize_stops_at_first_error() {
        let records = vec![
            Ok(FileRecord::new("a.txt", "a\n")),
            Err(BlobFsError::Collection {
                path: PathBuf::from("b.txt"),
                source: io::Error::new(io::ErrorKind::InvalidData, "bad utf-8"),
            }),
        ];
        assert!(matches!(
            serialize(records, Dialect::Plain),
            Err(BlobFsError::Collection { .. })
        ));
    }

    #[test]
    fn test_export_writes_file_and_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.txt");
        fs::write(&output, "stale").unwrap();

        let writer = BlobWriter::new(ExportConfig::new(dir.path(), &output, ".txt"));
        let clipboard = RecordingClipboard::default();
        let exported = writer
            .export(vec![Ok(FileRecord::new("a.txt", "a\n"))], Some(&clipboard))
            .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "// a.txt\n\na\n\n");
        assert_eq!(clipboard.copied.borrow().as_deref(), Some(written.as_str()));
        assert_eq!(
            exported,
            Exported {
                records: 1,
                bytes: written.len(),
                copied: true
            }
        );
    }

    #[test]
    fn test_export_failure_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.txt");
        fs::write(&output, "previous blob").unwrap();

        let writer = BlobWriter::new(ExportConfig::new(dir.path(), &output, ".txt"));
        let records = vec![
            Ok(FileRecord::new("a.txt", "a\n")),
            Err(BlobFsError::Collection {
                path: dir.path().join("b.txt"),
                source: io::Error::new(io::ErrorKind::InvalidData, "bad utf-8"),
            }),
        ];
        assert!(writer.export(records, None).is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous blob");
    }

    #[test]
    fn test_clipboard_failure_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output.txt");

        let writer = BlobWriter::new(ExportConfig::new(dir.path(), &output, ".txt"));
        let exported = writer
            .export(vec![Ok(FileRecord::new("a.txt", "a\n"))], Some(&BrokenClipboard))
            .unwrap();

        assert!(!exported.copied);
        assert!(output.exists());
    }
}
