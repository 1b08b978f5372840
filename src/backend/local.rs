//! Local process-execution backend.
//!
//! Each handle is a lightweight shell record holding its own working
//! directory. Commands run as child processes of this program in that
//! directory; `cd` is interpreted by the backend so the directory sticks
//! between commands of the same session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{BackendError, BackendHandle, ExecBackend};

/// Default upper bound on a single command's runtime.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
struct ShellRecord {
    cwd: PathBuf,
    /// Fired on interrupt, dropped on kill; running commands watch it.
    cancel: watch::Sender<()>,
}

/// Runs commands as local OS processes, one working directory per handle.
#[derive(Debug)]
pub struct LocalBackend {
    shells: Mutex<HashMap<BackendHandle, ShellRecord>>,
    timeout_secs: u64,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new(DEFAULT_EXEC_TIMEOUT_SECS)
    }
}

impl LocalBackend {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            shells: Mutex::new(HashMap::new()),
            timeout_secs,
        }
    }

    /// Number of live handles.
    pub fn live_handles(&self) -> usize {
        self.shells.lock().map(|shells| shells.len()).unwrap_or(0)
    }

    fn lookup(&self, handle: &BackendHandle) -> Result<(PathBuf, watch::Receiver<()>), BackendError> {
        let shells = self
            .shells
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("shell table lock poisoned: {}", e)))?;
        shells
            .get(handle)
            .map(|record| (record.cwd.clone(), record.cancel.subscribe()))
            .ok_or_else(|| BackendError::UnknownHandle(handle.clone()))
    }

    async fn change_directory(
        &self,
        handle: &BackendHandle,
        cwd: &Path,
        target: Option<&str>,
    ) -> Result<String, BackendError> {
        let requested = resolve_target(cwd, target);
        let resolved = match tokio::fs::canonicalize(&requested).await {
            Ok(path) if path.is_dir() => path,
            _ => return Err(BackendError::InvalidDirectory(requested)),
        };

        let mut shells = self
            .shells
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("shell table lock poisoned: {}", e)))?;
        let record = shells
            .get_mut(handle)
            .ok_or_else(|| BackendError::UnknownHandle(handle.clone()))?;
        debug!(%handle, cwd = %resolved.display(), "Changed working directory");
        record.cwd = resolved;
        Ok(String::new())
    }
}

/// Resolve a `cd` argument against the current directory.
/// No argument and `~` go to `$HOME`; `~/x` is expanded.
fn resolve_target(cwd: &Path, target: Option<&str>) -> PathBuf {
    let home = || {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.to_path_buf())
    };
    match target {
        None | Some("~") => home(),
        Some(t) => match t.strip_prefix("~/") {
            Some(rest) => home().join(rest),
            None => cwd.join(t),
        },
    }
}

#[async_trait]
impl ExecBackend for LocalBackend {
    async fn spawn(&self, working_directory: &Path) -> Result<BackendHandle, BackendError> {
        let is_dir = tokio::fs::metadata(working_directory)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(BackendError::InvalidDirectory(working_directory.to_path_buf()));
        }

        let handle = BackendHandle::new(Uuid::new_v4().to_string());
        let mut shells = self
            .shells
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("shell table lock poisoned: {}", e)))?;
        shells.insert(
            handle.clone(),
            ShellRecord {
                cwd: working_directory.to_path_buf(),
                cancel: watch::channel(()).0,
            },
        );
        info!(%handle, cwd = %working_directory.display(), "Spawned shell");
        Ok(handle)
    }

    async fn kill(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        let mut shells = self
            .shells
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("shell table lock poisoned: {}", e)))?;
        match shells.remove(handle) {
            Some(_) => {
                info!(%handle, "Killed shell");
                Ok(())
            }
            None => Err(BackendError::UnknownHandle(handle.clone())),
        }
    }

    async fn interrupt(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        let shells = self
            .shells
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("shell table lock poisoned: {}", e)))?;
        let record = shells
            .get(handle)
            .ok_or_else(|| BackendError::UnknownHandle(handle.clone()))?;
        record.cancel.send_replace(());
        debug!(%handle, "Interrupted running command");
        Ok(())
    }

    async fn execute(
        &self,
        handle: &BackendHandle,
        command: &str,
        args: &[String],
    ) -> Result<String, BackendError> {
        let (cwd, mut cancel) = self.lookup(handle)?;

        if command == "cd" {
            return self
                .change_directory(handle, &cwd, args.first().map(String::as_str))
                .await;
        }

        debug!(%handle, command, ?args, cwd = %cwd.display(), "Executing command");
        let mut cmd = Command::new(command);
        cmd.args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future kills the child.
        let output = tokio::select! {
            output = tokio::time::timeout(Duration::from_secs(self.timeout_secs), cmd.output()) => output,
            _ = cancel.changed() => {
                debug!(%handle, command, "Command stopped before completion");
                return Err(BackendError::Interrupted);
            }
        };
        let output = output.map_err(|_| BackendError::Timeout(self.timeout_secs))??;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                code: output.status.code(),
                stderr: stderr.trim_end().to_string(),
            });
        }
        if !stderr.is_empty() {
            warn!(%handle, command, "Command stderr: {}", stderr.trim_end());
        }
        Ok(stdout)
    }
}
