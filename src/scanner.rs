/*!
 * Recursive collection of the files that go into a blob
 */

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glob_match::glob_match;
use ignore::WalkBuilder;
use indicatif::ProgressBar;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::ExportConfig;
use crate::error::{BlobFsError, Result};
use crate::types::FileRecord;
use crate::utils::DEFAULT_IGNORE;

/// Per-file figures kept for the export report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Number of lines in the file
    pub lines: usize,
    /// Size of the content in bytes
    pub bytes: usize,
}

/// Collector statistics
#[derive(Debug, Clone, Default)]
pub struct CollectorStatistics {
    /// Number of files read
    pub files_collected: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of bytes
    pub total_bytes: usize,
    /// Details for each file, keyed by path relative to the root
    pub file_details: BTreeMap<String, FileStats>,
}

/// Walks a root folder and reads every file whose name ends with the configured extension
pub struct Collector {
    /// Export configuration
    config: ExportConfig,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Output file, resolved once so it can be left out of the walk
    output_file: Option<PathBuf>,
    /// Collector statistics
    statistics: RefCell<CollectorStatistics>,
}

impl Collector {
    /// Create a new collector
    pub fn new(config: ExportConfig, progress: Arc<ProgressBar>) -> Self {
        let output_file = fs::canonicalize(&config.output_file).ok();
        Self {
            config,
            progress,
            output_file,
            statistics: RefCell::new(CollectorStatistics::default()),
        }
    }

    /// Get collector statistics
    pub fn get_statistics(&self) -> CollectorStatistics {
        self.statistics.borrow().clone()
    }

    /// Lazily read every matching file as a record named by its bare file name.
    ///
    /// Files are read one at a time as the iterator is advanced. A file that
    /// cannot be read, or is not valid UTF-8, yields an error carrying its path.
    pub fn records(&self) -> impl Iterator<Item = Result<FileRecord>> + '_ {
        self.matching_paths()
            .map(move |entry| entry.and_then(|path| self.read_record(&path)))
    }

    /// Paths of every file selected for export, in walk order
    pub fn matching_paths(&self) -> Box<dyn Iterator<Item = Result<PathBuf>> + '_> {
        let root = self.config.target_dir.clone();

        if self.config.respect_gitignore {
            let mut walker = WalkBuilder::new(&root);
            walker
                .require_git(false)
                .sort_by_file_name(|a, b| a.cmp(b));

            // Use custom gitignore file if specified
            if let Some(gitignore_path) = &self.config.gitignore_path {
                if let Some(err) = walker.add_ignore(gitignore_path) {
                    debug!(path = %gitignore_path.display(), error = %err, "partial gitignore");
                }
            }

            // filter_entry needs an owned 'static predicate
            let patterns = self.config.ignore_patterns.clone();
            let use_defaults = self.config.default_ignores;
            let walk = walker
                .filter_entry(move |entry| {
                    entry.depth() == 0
                        || !ignored_name(&entry.file_name().to_string_lossy(), &patterns, use_defaults)
                })
                .build();

            Box::new(walk.filter_map(move |entry| match entry {
                Ok(entry) => {
                    let is_file = entry
                        .file_type()
                        .map_or(false, |ft| is_file_or_file_link(ft, entry.path()));
                    (is_file && self.selects(entry.path())).then(|| Ok(entry.into_path()))
                }
                Err(err) => Some(Err(BlobFsError::Collection {
                    path: root.clone(),
                    source: io::Error::new(io::ErrorKind::Other, err.to_string()),
                })),
            }))
        } else {
            let walk = WalkDir::new(&root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(move |entry| entry.depth() == 0 || !self.should_ignore(entry.path()));

            Box::new(walk.filter_map(move |entry| match entry {
                Ok(entry) => {
                    (is_file_or_file_link(entry.file_type(), entry.path())
                        && self.selects(entry.path()))
                        .then(|| Ok(entry.into_path()))
                }
                Err(err) => {
                    let path = err.path().map_or_else(|| root.clone(), Path::to_path_buf);
                    Some(Err(BlobFsError::Collection {
                        path,
                        source: io::Error::from(err),
                    }))
                }
            }))
        }
    }

    /// Check if an entry should be skipped based on patterns and defaults
    pub fn should_ignore(&self, path: &Path) -> bool {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        ignored_name(&file_name, &self.config.ignore_patterns, self.config.default_ignores)
    }

    /// Check if a file is selected by the extension filter
    pub fn should_include(&self, path: &Path) -> bool {
        path.file_name()
            .map_or(false, |name| name.to_string_lossy().ends_with(&self.config.extension))
    }

    /// Check whether a path is the blob being written
    fn is_output_file(&self, path: &Path) -> bool {
        let Some(output) = &self.output_file else {
            return false;
        };
        if path.file_name() != output.file_name() {
            return false;
        }
        fs::canonicalize(path).map_or(false, |p| &p == output)
    }

    fn selects(&self, path: &Path) -> bool {
        self.should_include(path) && !self.should_ignore(path) && !self.is_output_file(path)
    }

    /// Read one file and update statistics
    fn read_record(&self, path: &Path) -> Result<FileRecord> {
        self.progress.inc(1);

        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.progress
            .set_message(format!("Current file: {}", file_name));

        let content = fs::read_to_string(path).map_err(|source| BlobFsError::Collection {
            path: path.to_path_buf(),
            source,
        })?;
        trace!(path = %path.display(), bytes = content.len(), "collected");

        let rel_path = path
            .strip_prefix(&self.config.target_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let stats = FileStats {
            lines: content.lines().count(),
            bytes: content.len(),
        };

        {
            let mut statistics = self.statistics.borrow_mut();
            statistics.files_collected += 1;
            statistics.total_lines += stats.lines;
            statistics.total_bytes += stats.bytes;
            statistics.file_details.insert(rel_path, stats);
        }

        Ok(FileRecord::new(file_name, content))
    }
}

/// Regular files, and links that resolve to one. Links to folders are not followed.
fn is_file_or_file_link(file_type: fs::FileType, path: &Path) -> bool {
    file_type.is_file()
        || (file_type.is_symlink() && fs::metadata(path).map_or(false, |m| m.is_file()))
}

/// Match a file or folder name against custom patterns and, optionally, the defaults
fn ignored_name(file_name: &str, patterns: &[String], use_defaults: bool) -> bool {
    if patterns.iter().any(|pattern| glob_match(pattern, file_name)) {
        return true;
    }

    use_defaults
        && DEFAULT_IGNORE
            .iter()
            .any(|&pattern| pattern == file_name || glob_match(pattern, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn collector(config: ExportConfig) -> Collector {
        Collector::new(config, Arc::new(ProgressBar::hidden()))
    }

    #[test]
    fn test_collects_nested_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("main.dart"), "void main() {}\n");
        write(&dir.path().join("models/verse.dart"), "class Verse {}\n");
        write(&dir.path().join("models/deep/chapter.dart"), "class Chapter {}\n");
        write(&dir.path().join("README.md"), "# readme\n");

        let config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), ".dart");
        let collector = collector(config);
        let mut names: Vec<String> = collector
            .records()
            .map(|r| r.unwrap().path)
            .collect();
        names.sort();

        assert_eq!(names, vec!["chapter.dart", "main.dart", "verse.dart"]);

        let stats = collector.get_statistics();
        assert_eq!(stats.files_collected, 3);
        assert_eq!(stats.total_lines, 3);
        assert!(stats.file_details.contains_key("models/deep/chapter.dart"));
    }

    #[test]
    fn test_duplicate_contents_are_not_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a/same.dart"), "x\n");
        write(&dir.path().join("b/same.dart"), "x\n");

        let config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), ".dart");
        let records: Vec<_> = collector(config).records().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.path == "same.dart" && r.content == "x\n"));
    }

    #[test]
    fn test_invalid_utf8_names_offending_file() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("good.dart"), "ok\n");
        let bad = dir.path().join("zz_bad.dart");
        fs::write(&bad, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), ".dart");
        let result: Result<Vec<_>> = collector(config).records().collect();

        match result {
            Err(BlobFsError::Collection { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected collection error, got {:?}", other),
        }
    }

    #[test]
    fn test_ignore_patterns_prune_folders() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("keep.dart"), "k\n");
        write(&dir.path().join("generated/skip.dart"), "s\n");
        write(&dir.path().join("skip.g.dart"), "g\n");

        let mut config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), ".dart");
        config.ignore_patterns = vec!["generated".to_string(), "*.g.dart".to_string()];

        let names: Vec<String> = collector(config).records().map(|r| r.unwrap().path).collect();
        assert_eq!(names, vec!["keep.dart"]);
    }

    #[test]
    fn test_default_ignores_are_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("app.dart"), "a\n");
        write(&dir.path().join(".dart_tool/cache.dart"), "c\n");

        let config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), ".dart");
        assert_eq!(collector(config.clone()).records().count(), 2);

        let mut config = config;
        config.default_ignores = true;
        let names: Vec<String> = collector(config).records().map(|r| r.unwrap().path).collect();
        assert_eq!(names, vec!["app.dart"]);
    }

    #[test]
    fn test_output_file_is_never_collected() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("a.txt"), "a\n");
        write(&dir.path().join("output.txt"), "// a.txt\n\na\n\n");

        let config = ExportConfig::new(dir.path(), dir.path().join("output.txt"), ".txt");
        let names: Vec<String> = collector(config).records().map(|r| r.unwrap().path).collect();
        assert_eq!(names, vec!["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_linked_files_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("lib");
        write(&dir.path().join("outside/real.dart"), "linked\n");
        write(&dir.path().join("outside/nested/deep.dart"), "deep\n");
        write(&root.join("plain.dart"), "plain\n");
        std::os::unix::fs::symlink(dir.path().join("outside/real.dart"), root.join("link.dart")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("outside/nested"), root.join("nested")).unwrap();

        for respect_gitignore in [false, true] {
            let mut config = ExportConfig::new(&root, dir.path().join("out.txt"), ".dart");
            config.respect_gitignore = respect_gitignore;

            let records: Vec<FileRecord> = collector(config).records().collect::<Result<_>>().unwrap();
            assert_eq!(
                records,
                vec![
                    FileRecord::new("link.dart", "linked\n"),
                    FileRecord::new("plain.dart", "plain\n"),
                ]
            );
        }
    }

    #[test]
    fn test_respect_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(".gitignore"), "ignored.dart\n");
        write(&dir.path().join("ignored.dart"), "i\n");
        write(&dir.path().join("kept.dart"), "k\n");

        let mut config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), ".dart");
        config.respect_gitignore = true;

        let names: Vec<String> = collector(config).records().map(|r| r.unwrap().path).collect();
        assert_eq!(names, vec!["kept.dart"]);
    }
}
