//! In-memory backend used by the session and registry tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{BackendError, BackendHandle, ExecBackend};

/// Scripted backend: canned outputs per command line, with every call recorded.
#[derive(Default)]
pub struct ScriptedBackend {
    spawned: AtomicUsize,
    fail_spawn: AtomicBool,
    fail_kill: AtomicBool,
    spawn_dirs: Mutex<Vec<PathBuf>>,
    killed: Mutex<Vec<BackendHandle>>,
    interrupted: Mutex<Vec<BackendHandle>>,
    executed: Mutex<Vec<(BackendHandle, String, Vec<String>)>>,
    replies: Mutex<HashMap<String, Result<String, String>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `line` (program and args joined by single spaces) with `output`.
    pub fn reply(&self, line: &str, output: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(line.to_string(), Ok(output.to_string()));
    }

    /// Reject `line` with a backend error carrying `message`.
    pub fn reject(&self, line: &str, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(line.to_string(), Err(message.to_string()));
    }

    pub fn set_fail_spawn(&self, fail: bool) {
        self.fail_spawn.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_kill(&self, fail: bool) {
        self.fail_kill.store(fail, Ordering::SeqCst);
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    pub fn spawn_dirs(&self) -> Vec<PathBuf> {
        self.spawn_dirs.lock().unwrap().clone()
    }

    pub fn killed(&self) -> Vec<BackendHandle> {
        self.killed.lock().unwrap().clone()
    }

    pub fn interrupted(&self) -> Vec<BackendHandle> {
        self.interrupted.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<(BackendHandle, String, Vec<String>)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecBackend for ScriptedBackend {
    async fn spawn(&self, working_directory: &Path) -> Result<BackendHandle, BackendError> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("spawn refused".to_string()));
        }
        let n = self.spawned.fetch_add(1, Ordering::SeqCst) + 1;
        self.spawn_dirs
            .lock()
            .unwrap()
            .push(working_directory.to_path_buf());
        Ok(BackendHandle::new(format!("shell-{}", n)))
    }

    async fn kill(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        self.killed.lock().unwrap().push(handle.clone());
        if self.fail_kill.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("kill refused".to_string()));
        }
        Ok(())
    }

    async fn interrupt(&self, handle: &BackendHandle) -> Result<(), BackendError> {
        self.interrupted.lock().unwrap().push(handle.clone());
        Ok(())
    }

    async fn execute(
        &self,
        handle: &BackendHandle,
        command: &str,
        args: &[String],
    ) -> Result<String, BackendError> {
        self.executed
            .lock()
            .unwrap()
            .push((handle.clone(), command.to_string(), args.to_vec()));

        let mut line = command.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        let reply = self.replies.lock().unwrap().get(&line).cloned();
        match reply {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(BackendError::Unavailable(message)),
            None => Ok(String::new()),
        }
    }
}
