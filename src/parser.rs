/*!
 * Blob parsing
 *
 * A line starting with `//` opens a new record; its title is the rest of the
 * line, trimmed. Every following line, up to the next marker or the end of
 * the input, belongs to that record. The rule is purely prefix based, so a
 * content line such as `// TODO` in plain dialect is read as a new marker.
 * The escaped dialect exists for blobs that need to carry such lines.
 */

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{Dialect, FileRecord};
use crate::writer::{ESCAPE, MARKER_PREFIX};

/// Declared path to content, in the order paths first appear in the blob
pub type FileMap = IndexMap<String, String>;

/// Blob parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    dialect: Dialect,
    strict: bool,
}

impl Parser {
    /// Create a lenient parser for the given dialect
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            strict: false,
        }
    }

    /// Reject blobs without markers and markers without a title
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse a blob into a path to content mapping.
    ///
    /// Text before the first marker is dropped. When a title repeats, the
    /// later content wins but the entry keeps its first position.
    pub fn parse(&self, blob: &str) -> Result<FileMap> {
        let mut files = FileMap::new();
        let mut current: Option<(String, String)> = None;
        let mut preamble_lines = 0usize;

        for (index, line) in blob.split_inclusive('\n').enumerate() {
            if line.starts_with(MARKER_PREFIX) {
                if let Some((title, body)) = current.take() {
                    self.finish(&mut files, title, body);
                }

                let title = marker_title(line);
                if self.strict {
                    crate::ensure!(
                        !title.is_empty(),
                        Format,
                        "marker without a title on line {}",
                        index + 1
                    );
                }
                current = Some((title, String::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push_str(self.unescape(line));
                if !line.ends_with('\n') {
                    body.push('\n');
                }
            } else {
                preamble_lines += 1;
            }
        }

        if let Some((title, body)) = current.take() {
            self.finish(&mut files, title, body);
        }

        if preamble_lines > 0 {
            debug!(lines = preamble_lines, "dropped text before the first marker");
        }

        if self.strict {
            crate::ensure!(!files.is_empty(), Format, "no marker lines found");
        }

        Ok(files)
    }

    /// Parse a blob into records, in mapping order
    pub fn records(&self, blob: &str) -> Result<Vec<FileRecord>> {
        Ok(self
            .parse(blob)?
            .into_iter()
            .map(|(path, content)| FileRecord::new(path, content))
            .collect())
    }

    fn unescape<'a>(&self, line: &'a str) -> &'a str {
        match self.dialect {
            Dialect::Plain => line,
            Dialect::Escaped => line.strip_prefix(ESCAPE).unwrap_or(line),
        }
    }

    fn finish(&self, files: &mut FileMap, title: String, body: String) {
        let content = strip_framing(body);
        // IndexMap::insert keeps the original slot for an existing key
        if let Some(previous) = files.insert(title.clone(), content) {
            warn!(
                path = %title,
                replaced_bytes = previous.len(),
                "duplicate marker, keeping the later content"
            );
        }
    }
}

/// Parse a plain-dialect blob leniently
pub fn parse(blob: &str) -> FileMap {
    // the lenient parser has no failure path
    Parser::default().parse(blob).unwrap_or_default()
}

/// Title carried by a marker line
fn marker_title(line: &str) -> String {
    let trimmed = line.trim();
    trimmed
        .strip_prefix(MARKER_PREFIX)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Drop the blank line after the marker and the blank line separating records
fn strip_framing(body: String) -> String {
    let lead = if body.starts_with("\r\n") {
        2
    } else if body.starts_with('\n') {
        1
    } else {
        0
    };
    let mut content = body[lead..].to_string();

    if content.ends_with("\n\r\n") {
        content.truncate(content.len() - 2);
    } else if content.ends_with("\n\n") {
        content.pop();
    }
    content
}
