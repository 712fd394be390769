/*!
 * Reporting functionality for blobfs
 *
 * Renders the export summary, the import preview and the per-file import
 * dispositions with the tabled library, or as JSON for scripts.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::parser::FileMap;
use crate::scanner::CollectorStatistics;
use crate::types::{Disposition, ImportReport};
use crate::utils::{content_preview, format_file_size};

/// Figures of a finished export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to collect and write
    pub duration: Duration,
    /// Size of the blob in bytes
    pub blob_bytes: usize,
    /// Whether the blob was copied to the clipboard
    pub copied: bool,
    /// Collector statistics
    pub statistics: CollectorStatistics,
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// JSON document
    Json,
}

/// Report generator
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// One line per parsed entry with the start of its content
    pub fn preview(&self, files: &FileMap, max_chars: usize) -> String {
        let mut out = String::from("Parsed content:\n");
        for (path, content) in files {
            out.push_str(&format!(
                "Filename: {} - Content starts with: {}...\n",
                path,
                content_preview(content, max_chars)
            ));
        }
        out
    }

    /// Generate the export summary
    pub fn export_report(&self, report: &ExportReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let stats = &report.statistics;
        let rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Exported".to_string(),
                value: self.format_number(stats.files_collected),
            },
            SummaryRow {
                key: "📝 Total Lines".to_string(),
                value: self.format_number(stats.total_lines),
            },
            SummaryRow {
                key: "📦 Blob Size".to_string(),
                value: format_file_size(report.blob_bytes as u64),
            },
            SummaryRow {
                key: "📋 Clipboard".to_string(),
                value: if report.copied { "copied" } else { "not copied" }.to_string(),
            },
        ];

        format!("✅  EXPORT COMPLETE\n{}", styled(Table::new(rows)))
    }

    /// Generate the import disposition report
    pub fn import_report(&self, report: &ImportReport) -> Result<String> {
        match self.format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportFormat::ConsoleTable => Ok(self.import_table(report)),
        }
    }

    fn import_table(&self, report: &ImportReport) -> String {
        #[derive(Tabled)]
        struct EntryRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Result")]
            result: String,

            #[tabled(rename = "Detail")]
            detail: String,
        }

        let rows: Vec<EntryRow> = report
            .entries
            .iter()
            .map(|entry| EntryRow {
                path: entry.target.display().to_string(),
                result: entry.disposition.to_string(),
                detail: match &entry.disposition {
                    Disposition::Error { message, .. } => message.clone(),
                    _ => String::new(),
                },
            })
            .collect();

        format!(
            "📋  IMPORT RESULTS ({} updated, {} skipped, {} failed, {} aborted)\n{}",
            report.count("updated"),
            report.count("skipped"),
            report.count("error"),
            report.count("aborted"),
            styled(Table::new(rows))
        )
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}
