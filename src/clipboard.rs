//! Clipboard hand-off.
//!
//! On Linux the clipboard content lives only as long as the process that
//! owns it, and the CLI exits right after printing the color. The copy is
//! therefore handed to a detached instance of this binary, which keeps
//! serving the selection until another application replaces it.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;
use thiserror::Error;

/// Hidden subcommand the detached owner is started with.
pub const SERVE_SUBCOMMAND: &str = "serve-clipboard";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to start clipboard owner: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
}

/// Puts `text` on the clipboard so that it survives this process.
pub fn copy_text(text: &str) -> Result<(), ClipboardError> {
    if cfg!(target_os = "linux") {
        let exe = std::env::current_exe().map_err(ClipboardError::Spawn)?;
        let child = owner_command(&exe, text)
            .spawn()
            .map_err(ClipboardError::Spawn)?;
        tracing::debug!(pid = child.id(), text, "clipboard owner started");
        Ok(())
    } else {
        serve(text)
    }
}

/// Command line of the detached clipboard owner.
pub fn owner_command(exe: &Path, text: &str) -> Command {
    let mut command = Command::new(exe);
    command
        .args([OsStr::new(SERVE_SUBCOMMAND), OsStr::new(text)])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Out of the terminal's process group, so Ctrl-C in the shell
        // does not take the selection down with it.
        command.process_group(0);
    }
    command
}

/// Sets `text` and, on Linux, blocks until another owner takes over.
pub fn serve(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new()?;
    #[cfg(target_os = "linux")]
    clipboard.set().wait().text(text.to_owned())?;
    #[cfg(not(target_os = "linux"))]
    clipboard.set_text(text.to_owned())?;
    Ok(())
}
