/*!
 * Command-line interface for blobfs
 */

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use blobfs::clipboard::{Clipboard, SystemClipboard};
use blobfs::config::{Args, Command, ExportConfig, ImportConfig, OutputFormat};
use blobfs::report::{ExportReport, ReportFormat, Reporter};
use blobfs::restorer::{Announced, AssumeYes, Confirm, Restorer, TerminalPrompt};
use blobfs::scanner::Collector;
use blobfs::utils::count_files;
use blobfs::writer::BlobWriter;
use blobfs::{logging, Result};

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();
    logging::init(args.verbose);

    let outcome = match args.command {
        Command::Export(export) => run_export(ExportConfig::from_args(export)),
        Command::Import(import) => run_import(ImportConfig::from_args(import)),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Args::command(), "blobfs", &mut io::stdout());
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_export(config: ExportConfig) -> Result<bool> {
    config.validate()?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("📊 Setup");
    progress.set_message(format!(
        "📂 Scanning directory: {}",
        config.target_dir.display()
    ));

    // Count files for progress tracking
    let total_files = count_files(&config);
    progress.set_length(total_files);
    progress.set_prefix("📊 Exporting");

    let clipboard = if config.clip {
        match SystemClipboard::detect() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                None
            }
        }
    } else {
        None
    };

    let start_time = Instant::now();
    let collector = Collector::new(config.clone(), Arc::new(progress.clone()));
    let writer = BlobWriter::new(config.clone());
    let exported = writer.export(
        collector.records(),
        clipboard.as_ref().map(|c| c as &dyn Clipboard),
    );
    progress.finish_and_clear();
    let exported = exported?;

    let report = ExportReport {
        output_file: config.output_file.display().to_string(),
        duration: start_time.elapsed(),
        blob_bytes: exported.bytes,
        copied: exported.copied,
        statistics: collector.get_statistics(),
    };
    println!("\n{}", Reporter::new(ReportFormat::ConsoleTable).export_report(&report));

    let destination = if exported.copied {
        "exported and copied to clipboard"
    } else {
        "exported"
    };
    println!("All {} files have been {}.", config.extension, destination);

    Ok(true)
}

fn run_import(config: ImportConfig) -> Result<bool> {
    config.validate()?;

    let blob = match &config.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut blob = String::new();
            io::stdin().read_to_string(&mut blob)?;
            blob
        }
    };

    let parser = blobfs::Parser::new(config.dialect).strict(config.strict);
    let files = parser.parse(&blob)?;

    let reporter = Reporter::new(match config.format {
        OutputFormat::Table => ReportFormat::ConsoleTable,
        OutputFormat::Json => ReportFormat::Json,
    });
    if config.format == OutputFormat::Table {
        print!("{}", reporter.preview(&files, config.preview_len));
    }

    // JSON keeps stdout for the report alone
    let mut confirm: Box<dyn Confirm> = match (config.assume_yes, config.format) {
        (true, OutputFormat::Json) => Box::new(Announced::new(AssumeYes, io::stderr())),
        (true, OutputFormat::Table) => Box::new(Announced::new(AssumeYes, io::stdout())),
        (false, OutputFormat::Json) => Box::new(TerminalPrompt::new(io::stdin().lock(), io::stderr())),
        (false, OutputFormat::Table) => Box::new(TerminalPrompt::stdio()),
    };
    let report = Restorer::new(&config.base_dir).restore(&files, confirm.as_mut());

    println!("{}", reporter.import_report(&report)?);

    Ok(!report.has_errors())
}
