/*!
 * Writing parsed records back to disk
 *
 * Every entry is handled on its own: its folders are created, the operator is
 * asked, and the file is written or left alone. A failure is recorded against
 * that entry and the run moves on to the next one.
 */

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BlobFsError, Result};
use crate::parser::FileMap;
use crate::types::{Decision, Disposition, EntryReport, ImportReport};

/// Source of the per-file decision
pub trait Confirm {
    /// Decide whether `target` should be written
    fn confirm(&mut self, target: &Path) -> Decision;

    /// Called once the outcome of an entry is known
    fn report(&mut self, _entry: &EntryReport) {}
}

impl<F> Confirm for F
where
    F: FnMut(&Path) -> Decision,
{
    fn confirm(&mut self, target: &Path) -> Decision {
        self(target)
    }
}

/// Accepts every write
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _target: &Path) -> Decision {
        Decision::Accept
    }
}

/// Asks on a terminal, `Update <path>? [y/N]`.
///
/// Only `y` is affirmative. Anything else skips the file, except `q`, which
/// stops the run. End of input stops the run since no further answer can arrive.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Prompt on arbitrary streams
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalPrompt<R, W> {
    fn confirm(&mut self, target: &Path) -> Decision {
        // A broken terminal only loses the prompt text, the answer still decides
        let _ = write!(self.output, "Update {}? [y/N] ", target.display());
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => Decision::Stop,
            Ok(_) => parse_answer(&answer),
            Err(e) => {
                warn!(error = %e, "failed to read confirmation");
                Decision::Stop
            }
        }
    }

    fn report(&mut self, entry: &EntryReport) {
        let _ = writeln!(self.output, "{}", outcome_line(entry));
    }
}

/// Wraps another source of decisions and prints each outcome to `output`.
///
/// Used with [`AssumeYes`] so unattended runs still list what they wrote.
pub struct Announced<C, W> {
    inner: C,
    output: W,
}

impl<C: Confirm, W: Write> Announced<C, W> {
    /// Announce the outcomes of `inner` on `output`
    pub fn new(inner: C, output: W) -> Self {
        Self { inner, output }
    }
}

impl<C: Confirm, W: Write> Confirm for Announced<C, W> {
    fn confirm(&mut self, target: &Path) -> Decision {
        self.inner.confirm(target)
    }

    fn report(&mut self, entry: &EntryReport) {
        self.inner.report(entry);
        let _ = writeln!(self.output, "{}", outcome_line(entry));
    }
}

/// One human readable line for an entry outcome
pub fn outcome_line(entry: &EntryReport) -> String {
    let path = entry.target.display();
    match &entry.disposition {
        Disposition::Updated => format!("Updated `{}`", path),
        Disposition::Skipped => format!("Skipped updating `{}`", path),
        Disposition::Error { message, .. } => format!("Failed to update `{}`: {}", path, message),
        Disposition::Aborted => format!("Stopped before `{}`", path),
    }
}

/// Map a typed answer to a decision
pub fn parse_answer(answer: &str) -> Decision {
    match answer.trim() {
        "y" | "Y" => Decision::Accept,
        "q" | "Q" => Decision::Stop,
        _ => Decision::Reject,
    }
}

/// Writes records under a base folder
pub struct Restorer {
    /// Folder the declared paths are relative to
    base_dir: PathBuf,
}

impl Restorer {
    /// Create a new restorer
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Handle every entry of `files` in order and report what happened to each
    pub fn restore<C>(&self, files: &FileMap, confirm: &mut C) -> ImportReport
    where
        C: Confirm + ?Sized,
    {
        let mut report = ImportReport::default();
        let mut stopped = false;

        for (declared, content) in files {
            let target = self.base_dir.join(declared);
            let disposition = if stopped {
                Disposition::Aborted
            } else {
                match self.restore_one(declared, content, confirm) {
                    Ok(Decision::Accept) => Disposition::Updated,
                    Ok(Decision::Reject) => Disposition::Skipped,
                    Ok(Decision::Stop) => {
                        stopped = true;
                        Disposition::Aborted
                    }
                    Err(e) => {
                        warn!(path = %target.display(), error = %e, "entry failed");
                        Disposition::Error {
                            kind: e.kind().to_string(),
                            message: e.to_string(),
                        }
                    }
                }
            };

            debug!(path = %target.display(), status = %disposition, "entry done");

            let entry = EntryReport {
                declared: declared.clone(),
                target,
                disposition,
            };
            confirm.report(&entry);
            report.entries.push(entry);
        }

        report
    }

    /// Create folders, ask, write. Returns the decision that was acted on.
    fn restore_one<C>(&self, declared: &str, content: &str, confirm: &mut C) -> Result<Decision>
    where
        C: Confirm + ?Sized,
    {
        let target = self.target_path(declared)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BlobFsError::DirectoryCreation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let decision = confirm.confirm(&target);
        if decision == Decision::Accept {
            fs::write(&target, content).map_err(|source| BlobFsError::Write {
                path: target.clone(),
                source,
            })?;
        }

        Ok(decision)
    }

    /// Join a declared path onto the base folder, refusing paths that leave it
    pub fn target_path(&self, declared: &str) -> Result<PathBuf> {
        crate::ensure!(!declared.is_empty(), InvalidPath, "empty path");

        let path = Path::new(declared);
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => {
                    crate::bail!(InvalidPath, "`{}` leaves the base directory", declared)
                }
                Component::RootDir | Component::Prefix(_) => {
                    crate::bail!(InvalidPath, "`{}` is not a relative path", declared)
                }
            }
        }

        Ok(self.base_dir.join(path))
    }
}
