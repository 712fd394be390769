/*!
 * Utility functions for blobfs
 */

use std::sync::Arc;

use indicatif::ProgressBar;
use once_cell::sync::Lazy;

use crate::config::ExportConfig;
use crate::scanner::Collector;

/// Count files selected for export, for progress tracking
pub fn count_files(config: &ExportConfig) -> u64 {
    let collector = Collector::new(config.clone(), Arc::new(ProgressBar::hidden()));
    collector
        .matching_paths()
        .filter(|entry| entry.is_ok())
        .count() as u64
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// First `max_chars` characters of `content`, on one line
pub fn content_preview(content: &str, max_chars: usize) -> String {
    content
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Folder and file names skipped by `--default-ignores`
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".svn",
        ".hg",
        ".bzr",
        // OS Files
        ".DS_Store",
        "Thumbs.db",
        // Dependencies
        "node_modules",
        "bower_components",
        "vendor",
        ".pub-cache",
        // Build & Dist
        "dist",
        "build",
        "out",
        "target",
        // Dart & Flutter
        ".dart_tool",
        "*.g.dart",
        "*.freezed.dart",
        // IDEs & Editors
        ".idea",
        ".vscode",
        "*.swp",
        "*~",
        // Caches & Temp
        ".cache",
        "tmp",
    ]
});
