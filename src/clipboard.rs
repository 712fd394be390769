/*!
 * Clipboard support for blobfs
 *
 * The exporter only needs to hand a finished blob to something that accepts
 * text. [`Clipboard`] is that seam; [`SystemClipboard`] pipes the text into the
 * first clipboard command found on the machine.
 */

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Anything that can receive a copy of the blob
pub trait Clipboard {
    /// Copy text to the clipboard
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Clipboard commands, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    /// tmux paste buffer, only inside a tmux session
    Tmux,
    /// macOS pbcopy
    MacOS,
    /// Wayland wl-copy
    Wayland,
    /// X11 xsel
    Xsel,
    /// X11 xclip
    Xclip,
    /// Windows clip.exe, also reachable from WSL
    Windows,
    /// Termux on Android
    Termux,
}

impl ClipboardProvider {
    const ALL: [ClipboardProvider; 7] = [
        Self::Tmux,
        Self::MacOS,
        Self::Wayland,
        Self::Xsel,
        Self::Xclip,
        Self::Windows,
        Self::Termux,
    ];

    /// Program and arguments reading the text from stdin
    fn command(self) -> (&'static str, Vec<&'static str>) {
        match self {
            Self::Tmux => ("tmux", vec!["load-buffer", "-w", "-"]),
            Self::MacOS => ("pbcopy", vec![]),
            Self::Wayland => ("wl-copy", vec![]),
            Self::Xsel => ("xsel", vec!["-b", "-i"]),
            Self::Xclip => ("xclip", vec!["-selection", "clipboard", "-in"]),
            Self::Windows => ("clip.exe", vec![]),
            Self::Termux => ("termux-clipboard-set", vec![]),
        }
    }

    /// Whether this provider can be used in the current environment
    fn is_available(self) -> bool {
        let (program, _) = self.command();
        match self {
            Self::Tmux => env::var_os("TMUX").is_some() && command_exists(program),
            Self::Wayland => env::var_os("WAYLAND_DISPLAY").is_some() && command_exists(program),
            Self::Xsel | Self::Xclip => env::var_os("DISPLAY").is_some() && command_exists(program),
            _ => command_exists(program),
        }
    }
}

/// Clipboard backed by an external command
#[derive(Debug, Clone, Copy)]
pub struct SystemClipboard {
    provider: ClipboardProvider,
}

impl SystemClipboard {
    /// Use a specific provider
    pub fn new(provider: ClipboardProvider) -> Self {
        Self { provider }
    }

    /// Pick the first provider available on this machine
    pub fn detect() -> Result<Self> {
        let provider = ClipboardProvider::ALL
            .into_iter()
            .find(|p| p.is_available())
            .ok_or(ClipboardError::NoClipboardFound)?;
        debug!(?provider, "clipboard provider selected");
        Ok(Self::new(provider))
    }
}

impl Clipboard for SystemClipboard {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let (program, args) = self.provider.command();
        pipe_to_command(program, &args, text)
    }
}

/// Check if a program can be found on `PATH`
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH").map_or(false, |paths| {
        env::split_paths(&paths).any(|dir| dir.join(command).is_file())
    })
}

/// Spawn `program`, write `text` to its stdin and wait for it to exit
fn pipe_to_command(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", program, e)))?;

    {
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", program))
        })?;
        stdin.write_all(text.as_bytes())?;
    }
    // close stdin so the command sees EOF
    drop(child.stdin.take());

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            program, status
        )))
    }
}
