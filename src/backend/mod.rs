//! Backend process-execution service.
//!
//! Sessions never run commands themselves. Each session holds a handle to a
//! shell allocated by an [`ExecBackend`], and every remote command line is
//! forwarded to that backend as an explicit request with its own error type.
//! Callers decide per operation how a failure is treated: spawn failures abort
//! session creation, kill failures are only logged, execution failures are
//! written back into the session's display.

mod local;
#[cfg(test)]
pub(crate) mod testing;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use local::{DEFAULT_EXEC_TIMEOUT_SECS, LocalBackend};

/// Opaque identifier of a backend shell, as returned by [`ExecBackend::spawn`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendHandle(String);

impl BackendHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("working directory does not exist: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("unknown session handle: {0}")]
    UnknownHandle(BackendHandle),

    #[error("command exited with {}: {stderr}", exit_status_label(.code))]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("command timed out after {0}s")]
    Timeout(u64),

    #[error("command interrupted")]
    Interrupted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

fn exit_status_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// The process-execution service consumed by the session registry.
#[async_trait]
pub trait ExecBackend: Send + Sync {
    /// Allocate a new shell rooted at `working_directory`.
    async fn spawn(&self, working_directory: &Path) -> Result<BackendHandle, BackendError>;

    /// Terminate the shell behind `handle`, ending any command it is running.
    async fn kill(&self, handle: &BackendHandle) -> Result<(), BackendError>;

    /// Stop the command `handle` is running; the shell stays usable.
    async fn interrupt(&self, _handle: &BackendHandle) -> Result<(), BackendError> {
        Ok(())
    }

    /// Run `command` with `args` on the shell behind `handle` and return its output.
    async fn execute(
        &self,
        handle: &BackendHandle,
        command: &str,
        args: &[String],
    ) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message_includes_status_and_stderr() {
        let err = BackendError::CommandFailed {
            code: Some(2),
            stderr: "no such file".to_string(),
        };
        assert_eq!(err.to_string(), "command exited with status 2: no such file");

        let err = BackendError::CommandFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_handle_display_is_raw_id() {
        let handle = BackendHandle::new("abc-123");
        assert_eq!(handle.to_string(), "abc-123");
        assert_eq!(handle.as_str(), "abc-123");
    }
}
