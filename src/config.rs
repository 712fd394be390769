/*!
 * Configuration handling for blobfs
 */

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::types::Dialect;

/// Default extension selected on export
pub const DEFAULT_EXTENSION: &str = ".dart";

/// Value that makes `import` read the blob from standard input
pub const STDIN_MARKER: &str = "-";

/// Output format of the import report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Console table
    #[default]
    Table,
    /// JSON document on stdout
    Json,
}

/// Command-line arguments for blobfs
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "blobfs",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flatten a source tree into a delimited text blob and restore it",
    long_about = "Concatenates every matching file under a folder into one `// <name>` delimited text blob, and parses such a blob back into files, asking before each write."
)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Concatenate matching files under a folder into one blob
    Export(ExportArgs),
    /// Restore files from a blob, confirming each write
    Import(ImportArgs),
    /// Generate shell completions
    Completions {
        /// Target shell
        #[clap(value_enum)]
        shell: Shell,
    },
}

/// Arguments of the export subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    /// Folder to collect files from
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// File receiving the blob
    #[clap(default_value = "output.txt")]
    pub output_file: String,

    /// File name suffix selecting files to export
    #[clap(long, default_value = DEFAULT_EXTENSION)]
    pub ext: String,

    /// Comma-separated list of file name patterns to skip
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Skip well known VCS, dependency and build folders
    #[clap(long)]
    pub default_ignores: bool,

    /// Respect .gitignore files
    #[clap(long)]
    pub respect_gitignore: bool,

    /// Path to custom .gitignore file
    #[clap(long)]
    pub gitignore_path: Option<String>,

    /// Escape content lines that would read back as markers
    #[clap(long)]
    pub escaped: bool,

    /// Copy output to clipboard
    #[clap(long, help = "Copy output to system clipboard")]
    pub clip: bool,
}

/// Arguments of the import subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct ImportArgs {
    /// Blob file to read, `-` for standard input
    #[clap(default_value = STDIN_MARKER)]
    pub input: String,

    /// Folder the declared paths are relative to
    #[clap(long, default_value = "./lib")]
    pub base_dir: String,

    /// Accept every write without prompting
    #[clap(short, long)]
    pub yes: bool,

    /// Reject blobs without markers and markers without a title
    #[clap(long)]
    pub strict: bool,

    /// Read the escaped dialect
    #[clap(long)]
    pub escaped: bool,

    /// Report format
    #[clap(long, value_enum, default_value_t = OutputFormat::default())]
    pub format: OutputFormat,

    /// Number of characters shown per entry in the preview
    #[clap(long, default_value = "30")]
    pub preview_len: usize,
}

/// Export configuration
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Folder to collect files from
    pub target_dir: PathBuf,

    /// File receiving the blob
    pub output_file: PathBuf,

    /// File name suffix selecting files
    pub extension: String,

    /// Patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Whether to apply the built-in ignore list
    pub default_ignores: bool,

    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,

    /// Path to custom .gitignore file
    pub gitignore_path: Option<PathBuf>,

    /// Content rendering
    pub dialect: Dialect,

    /// Copy output to clipboard
    pub clip: bool,
}

impl ExportConfig {
    /// Create configuration from command-line arguments
    pub fn from_args(args: ExportArgs) -> Self {
        Self {
            target_dir: PathBuf::from(args.directory_path),
            output_file: PathBuf::from(args.output_file),
            extension: args.ext,
            ignore_patterns: args.ignore_patterns,
            default_ignores: args.default_ignores,
            respect_gitignore: args.respect_gitignore,
            gitignore_path: args.gitignore_path.map(PathBuf::from),
            dialect: if args.escaped {
                Dialect::Escaped
            } else {
                Dialect::Plain
            },
            clip: args.clip,
        }
    }

    /// Configuration collecting `extension` files under `target_dir` with every filter off
    pub fn new(target_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            target_dir: target_dir.into(),
            output_file: output_file.into(),
            extension: extension.to_string(),
            ignore_patterns: Vec::new(),
            default_ignores: false,
            respect_gitignore: false,
            gitignore_path: None,
            dialect: Dialect::Plain,
            clip: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.target_dir.is_dir(),
            Config,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        crate::ensure!(
            !self.extension.is_empty(),
            Config,
            "Extension filter must not be empty"
        );

        // Check if output file directory exists
        if let Some(parent) = self.output_file.parent() {
            crate::ensure!(
                parent.as_os_str().is_empty() || parent.exists(),
                Config,
                "Output directory not found: {}",
                parent.display()
            );
        }

        if let Some(path) = &self.gitignore_path {
            crate::ensure!(
                path.exists(),
                Config,
                "Custom .gitignore file not found: {}",
                path.display()
            );
        }

        Ok(())
    }
}

/// Import configuration
#[derive(Clone, Debug)]
pub struct ImportConfig {
    /// Blob file, `None` for standard input
    pub input: Option<PathBuf>,

    /// Folder the declared paths are relative to
    pub base_dir: PathBuf,

    /// Accept every write without prompting
    pub assume_yes: bool,

    /// Reject malformed blobs instead of reading them leniently
    pub strict: bool,

    /// Content rendering
    pub dialect: Dialect,

    /// Report format
    pub format: OutputFormat,

    /// Preview length per entry
    pub preview_len: usize,
}

impl ImportConfig {
    /// Create configuration from command-line arguments
    pub fn from_args(args: ImportArgs) -> Self {
        Self {
            input: (args.input != STDIN_MARKER).then(|| PathBuf::from(args.input)),
            base_dir: PathBuf::from(args.base_dir),
            assume_yes: args.yes,
            strict: args.strict,
            dialect: if args.escaped {
                Dialect::Escaped
            } else {
                Dialect::Plain
            },
            format: args.format,
            preview_len: args.preview_len,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.input {
            Some(path) => crate::ensure!(
                path.is_file(),
                Config,
                "Input blob not found: {}",
                path.display()
            ),
            // stdin carries the blob, so it cannot answer prompts as well
            None => crate::ensure!(
                self.assume_yes,
                Config,
                "Reading the blob from standard input requires --yes"
            ),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlobFsError;

    #[test]
    fn test_export_defaults() {
        let args = Args::parse_from(["blobfs", "export"]);
        let Command::Export(export) = args.command else {
            panic!("expected export subcommand");
        };
        let config = ExportConfig::from_args(export);
        assert_eq!(config.target_dir, PathBuf::from("."));
        assert_eq!(config.output_file, PathBuf::from("output.txt"));
        assert_eq!(config.extension, ".dart");
        assert_eq!(config.dialect, Dialect::Plain);
        assert!(!config.respect_gitignore);
        assert!(!config.clip);
    }

    #[test]
    fn test_import_stdin_requires_yes() {
        let args = Args::parse_from(["blobfs", "import"]);
        let Command::Import(import) = args.command else {
            panic!("expected import subcommand");
        };
        let config = ImportConfig::from_args(import);
        assert!(config.input.is_none());
        assert_eq!(config.base_dir, PathBuf::from("./lib"));
        assert!(matches!(config.validate(), Err(BlobFsError::Config(_))));

        let args = Args::parse_from(["blobfs", "import", "-", "--yes", "--escaped"]);
        let Command::Import(import) = args.command else {
            panic!("expected import subcommand");
        };
        let config = ImportConfig::from_args(import);
        assert_eq!(config.dialect, Dialect::Escaped);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_export_validate_missing_dir() {
        let config = ExportConfig::new("/definitely/not/here", "out.txt", ".rs");
        assert!(matches!(config.validate(), Err(BlobFsError::Config(_))));
    }

    #[test]
    fn test_export_validate_empty_extension() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::new(dir.path(), dir.path().join("out.txt"), "");
        assert!(config.validate().is_err());
    }
}
