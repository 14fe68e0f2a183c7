//! External tool invocation.
//!
//! Backends never spawn processes directly; they go through a
//! [`CommandRunner`] so the capture pipelines can be exercised with a fake.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::CommandError;

pub trait CommandRunner: Send + Sync {
    /// Resolves `program` against `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Runs `program` to completion and returns its stdout. A non-zero exit
    /// is an error.
    fn output(&self, program: &str, args: &[&OsStr]) -> Result<String, CommandError>;
}

/// Runs real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn output(&self, program: &str, args: &[&OsStr]) -> Result<String, CommandError> {
        tracing::debug!(program, ?args, "running");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => CommandError::NotFound {
                    program: program.to_string(),
                },
                _ => CommandError::Io {
                    program: program.to_string(),
                    source: err,
                },
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let out = SystemRunner
            .output("sh", &[OsStr::new("-c"), OsStr::new("printf '#ff8040\\n'")])
            .unwrap();
        assert_eq!(out, "#ff8040\n");
    }

    #[test]
    fn non_zero_exit_is_failure() {
        let err = SystemRunner
            .output("sh", &[OsStr::new("-c"), OsStr::new("echo nope >&2; exit 3")])
            .unwrap_err();
        match err {
            CommandError::Failed { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_not_found() {
        let err = SystemRunner
            .output("definitely-not-a-real-tool-4f1c", &[])
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
        assert!(SystemRunner.locate("definitely-not-a-real-tool-4f1c").is_none());
    }
}
