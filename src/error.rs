use std::time::Duration;

use thiserror::Error;

/// Rejection from one of the color text grammars.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("malformed color text: {0:?}")]
    Malformed(String),
}

/// Failure of a single external tool invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} not found in PATH")]
    NotFound { program: String },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Why one backend attempt did not produce a color.
///
/// These stay local to a single attempt: the dispatcher logs them and moves
/// on to the next backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} unavailable: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("{backend}: selection cancelled by the user")]
    UserCancelled { backend: &'static str },

    #[error("{backend}: malformed response: {detail}")]
    MalformedResponse {
        backend: &'static str,
        detail: String,
    },

    #[error("{backend}: no response after {timeout:?}")]
    Timeout {
        backend: &'static str,
        timeout: Duration,
    },
}

impl BackendError {
    pub fn unavailable(backend: &'static str, reason: impl ToString) -> Self {
        BackendError::Unavailable {
            backend,
            reason: reason.to_string(),
        }
    }

    pub fn malformed(backend: &'static str, detail: impl ToString) -> Self {
        BackendError::MalformedResponse {
            backend,
            detail: detail.to_string(),
        }
    }

    /// Maps a tool failure onto the backend taxonomy.
    pub fn from_command(backend: &'static str, err: CommandError) -> Self {
        BackendError::unavailable(backend, err)
    }
}

/// Terminal state once every backend in the chain has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no color picked")]
pub struct NoColorPicked;
