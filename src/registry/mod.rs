//! Session registry: the set of live terminal sessions and which one is active.
//!
//! Sessions live in an arena keyed by [`SessionId`]; a separate `order` vector
//! holds the tab order, so positions are always recomputed from it. The
//! registry owns both ends of the execution response channel: every remote
//! command runs in its own tokio task that reports back through the channel,
//! and the event loop drains it with [`SessionRegistry::recv_exec_response`].
//!
//! Invariants kept here:
//! - once opened the registry is never empty and exactly one session is active
//! - a backend handle is killed at most once (closing moves it out of the arena)
//! - responses are only applied to the session and request they were issued for

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{debug, error, info, warn};

use crate::backend::{BackendError, BackendHandle, ExecBackend};
use crate::config::{Config, Preferences, ShellKind};
use crate::display::DisplaySink;
use crate::session::{EditEvent, RequestId, SessionId, SessionRequest, TerminalSession};


/// Result of one backend execution, tagged with where it came from.
#[derive(Debug)]
pub struct ExecResponse {
    pub session: SessionId,
    pub request: RequestId,
    pub result: Result<String, BackendError>,
}

/// What happened to a received [`ExecResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Applied(SessionId),
    /// The session is gone or no longer waits for that request.
    Discarded(SessionId),
}

/// One entry of the tab bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: SessionId,
    pub name: String,
    pub active: bool,
    pub busy: bool,
}

/// Actions raised by the panel chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    SelectTab(usize),
    CloseTab(usize),
    NewSession,
    Refresh,
    SetShellKind(ShellKind),
}

pub struct SessionRegistry<D> {
    backend: Arc<dyn ExecBackend>,
    sessions: HashMap<SessionId, TerminalSession<D>>,
    /// Tab order, creation order preserved.
    order: Vec<SessionId>,
    active: Option<SessionId>,
    next_id: SessionId,
    next_ordinal: u64,
    next_request: RequestId,
    exec_tx: Sender<ExecResponse>,
    exec_rx: Receiver<ExecResponse>,
    working_directory: PathBuf,
    prompt: String,
    size: Option<(u16, u16)>,
    shell_kind: ShellKind,
    preferences_path: Option<PathBuf>,
}

impl<D: DisplaySink + Default> SessionRegistry<D> {
    /// Channel buffer size for execution responses
    const EXEC_CHANNEL_BUFFER: usize = 64;

    /// Build an empty registry. Callers normally want [`SessionRegistry::open`].
    pub fn new(backend: Arc<dyn ExecBackend>, config: &Config) -> Self {
        let (exec_tx, exec_rx) = tokio::sync::mpsc::channel(Self::EXEC_CHANNEL_BUFFER);
        Self {
            backend,
            sessions: HashMap::new(),
            order: Vec::new(),
            active: None,
            next_id: 1,
            next_ordinal: 1,
            next_request: 1,
            exec_tx,
            exec_rx,
            working_directory: config.working_directory.clone(),
            prompt: config.prompt.clone(),
            size: None,
            shell_kind: config.shell_kind,
            preferences_path: config.preferences_path.clone(),
        }
    }

    /// Build the registry and its first session.
    pub async fn open(backend: Arc<dyn ExecBackend>, config: &Config) -> Result<Self, BackendError> {
        let mut registry = Self::new(backend, config);
        registry.create().await?;
        Ok(registry)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active
    }

    pub fn active_session(&self) -> Option<&TerminalSession<D>> {
        self.sessions.get(&self.active?)
    }

    pub fn session(&self, id: SessionId) -> Option<&TerminalSession<D>> {
        self.sessions.get(&id)
    }

    /// Position of the active tab.
    pub fn active_position(&self) -> Option<usize> {
        self.position_of(self.active?)
    }

    pub fn position_of(&self, id: SessionId) -> Option<usize> {
        self.order.iter().position(|&s| s == id)
    }

    /// Session ids in tab order.
    pub fn ids(&self) -> &[SessionId] {
        &self.order
    }

    pub fn tabs(&self) -> Vec<TabInfo> {
        self.order
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .map(|s| TabInfo {
                id: s.id(),
                name: s.display_name().to_string(),
                active: self.active == Some(s.id()),
                busy: s.is_busy(),
            })
            .collect()
    }

    pub fn shell_kind(&self) -> ShellKind {
        self.shell_kind
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Spawn a backend shell and add a session bound to it, making it active.
    ///
    /// On spawn failure nothing changes and the error is returned.
    pub async fn create(&mut self) -> Result<SessionId, BackendError> {
        let handle = match self.backend.spawn(&self.working_directory).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(
                    "Failed to spawn shell in {}: {}",
                    self.working_directory.display(),
                    e
                );
                return Err(e);
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        let name = format!("Terminal {}", self.next_ordinal);
        self.next_ordinal += 1;

        let mut display = D::default();
        if let Some((rows, cols)) = self.size {
            display.resize(rows, cols);
        }
        let mut session = TerminalSession::new(id, name, handle, display, self.prompt.clone());
        session.open();

        info!(session = id, handle = %session.backend_handle(), "Created {}", session.display_name());
        self.sessions.insert(id, session);
        self.order.push(id);
        self.active = Some(id);
        Ok(id)
    }

    /// Create a session on behalf of the UI; failures are logged and dropped.
    pub async fn new_session(&mut self) -> Option<SessionId> {
        match self.create().await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("New session not created: {}", e);
                None
            }
        }
    }

    /// Close a session. Unknown ids are ignored.
    ///
    /// Closing the last session first creates its replacement. If that spawn
    /// fails the close is abandoned and the session reports the error inline.
    pub async fn close(&mut self, id: SessionId) {
        let Some(position) = self.position_of(id) else {
            debug!(session = id, "Close ignored: unknown session");
            return;
        };

        if self.order.len() == 1 {
            if let Err(e) = self.create().await {
                if let Some(session) = self.sessions.get_mut(&id) {
                    session.write_error(&format!("cannot close the last session: {}", e));
                    session.write_prompt();
                }
                return;
            }
        }

        self.order.remove(position);
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        info!(session = id, "Closed {}", session.display_name());
        self.spawn_kill(session.into_backend_handle());

        if self.active == Some(id) {
            let idx = position.min(self.order.len().saturating_sub(1));
            self.active = self.order.get(idx).copied();
        }
    }

    pub async fn close_active(&mut self) {
        if let Some(id) = self.active {
            self.close(id).await;
        }
    }

    /// Kill every backend shell and empty the registry. Used on quit.
    pub async fn shutdown(&mut self) {
        self.active = None;
        for id in std::mem::take(&mut self.order) {
            let Some(session) = self.sessions.remove(&id) else {
                continue;
            };
            let handle = session.into_backend_handle();
            if let Err(e) = self.backend.kill(&handle).await {
                warn!(handle = %handle, "Failed to kill shell on shutdown: {}", e);
            }
        }
    }

    fn spawn_kill(&self, handle: BackendHandle) {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.kill(&handle).await {
                warn!(handle = %handle, "Failed to kill shell: {}", e);
            }
        });
    }

    fn spawn_interrupt(&self, handle: BackendHandle) {
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.interrupt(&handle).await {
                warn!(handle = %handle, "Failed to interrupt command: {}", e);
            }
        });
    }

    // ---------------------------------------------------------------------
    // Navigation and panel actions
    // ---------------------------------------------------------------------

    pub fn switch_to(&mut self, id: SessionId) -> bool {
        if self.sessions.contains_key(&id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    pub fn select_position(&mut self, position: usize) -> bool {
        match self.order.get(position).copied() {
            Some(id) => self.switch_to(id),
            None => false,
        }
    }

    pub async fn close_position(&mut self, position: usize) {
        if let Some(id) = self.order.get(position).copied() {
            self.close(id).await;
        }
    }

    /// Activate the tab after the active one, wrapping around.
    pub fn select_next(&mut self) {
        if let Some(pos) = self.active_position() {
            let next = (pos + 1) % self.order.len();
            self.select_position(next);
        }
    }

    /// Clear the active display and redraw banner, prompt and pending input.
    pub fn refresh(&mut self) {
        if let Some(session) = self.active.and_then(|id| self.sessions.get_mut(&id)) {
            session.refresh();
        }
    }

    /// Store the shell-kind preference. Live sessions are unaffected.
    pub fn set_shell_kind(&mut self, kind: ShellKind) {
        self.shell_kind = kind;
        info!("Shell kind set to {}", kind);
        if let Some(path) = &self.preferences_path {
            let prefs = Preferences { shell_kind: kind };
            if let Err(e) = prefs.save(path) {
                warn!("Failed to save preferences: {:#}", e);
            }
        }
    }

    /// Forward a size change to every display and remember it for new ones.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.size = Some((rows, cols));
        for session in self.sessions.values_mut() {
            session.resize(rows, cols);
        }
    }

    pub async fn apply(&mut self, action: PanelAction) {
        debug!(?action, "Panel action");
        match action {
            PanelAction::SelectTab(pos) => {
                self.select_position(pos);
            }
            PanelAction::CloseTab(pos) => self.close_position(pos).await,
            PanelAction::NewSession => {
                self.new_session().await;
            }
            PanelAction::Refresh => self.refresh(),
            PanelAction::SetShellKind(kind) => self.set_shell_kind(kind),
        }
    }

    // ---------------------------------------------------------------------
    // Input and execution
    // ---------------------------------------------------------------------

    /// Route one edit event to the active session.
    pub async fn handle_key(&mut self, event: EditEvent) {
        if let Some(id) = self.active {
            self.feed(id, event).await;
        }
    }

    /// Apply `event` to session `id`, then keep replaying keys it queued while
    /// busy until it becomes busy again or the queue runs dry.
    async fn feed(&mut self, id: SessionId, event: EditEvent) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let Some(session) = self.sessions.get_mut(&id) else {
                return;
            };
            match session.handle_event(event) {
                None => {}
                Some(SessionRequest::Exit) => {
                    self.close(id).await;
                    // An abandoned close keeps the session; its queue still replays.
                    if !self.sessions.contains_key(&id) {
                        return;
                    }
                }
                Some(SessionRequest::Execute { program, args }) => {
                    self.issue(id, program, args);
                }
                Some(SessionRequest::Interrupt) => {
                    let handle = session.backend_handle().clone();
                    self.spawn_interrupt(handle);
                }
            }
            next = self.sessions.get_mut(&id).and_then(|s| s.take_queued());
        }
    }

    fn issue(&mut self, id: SessionId, program: String, args: Vec<String>) {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };
        let request = self.next_request;
        self.next_request += 1;
        session.begin_request(request);

        let handle = session.backend_handle().clone();
        let backend = Arc::clone(&self.backend);
        let exec_tx = self.exec_tx.clone();
        debug!(session = id, request, %program, ?args, "Dispatching command");

        tokio::spawn(async move {
            let result = backend.execute(&handle, &program, &args).await;
            let response = ExecResponse {
                session: id,
                request,
                result,
            };
            if let Err(e) = exec_tx.send(response).await {
                error!("Failed to deliver exec response: {:?}", e);
            }
        });
    }

    /// Wait for the next execution response and apply it.
    pub async fn recv_exec_response(&mut self) -> Option<Delivery> {
        let response = self.next_exec_response().await?;
        Some(self.deliver(response).await)
    }

    /// Wait for the next execution response without applying it.
    ///
    /// Cancel safe, unlike [`Self::recv_exec_response`], so this is the one to
    /// race in a `tokio::select!`; pass the result to [`Self::deliver`].
    pub async fn next_exec_response(&mut self) -> Option<ExecResponse> {
        self.exec_rx.recv().await
    }

    /// Apply a response to the session that issued it, then replay keys the
    /// session queued while waiting.
    pub async fn deliver(&mut self, response: ExecResponse) -> Delivery {
        let ExecResponse {
            session: id,
            request,
            result,
        } = response;

        let Some(session) = self.sessions.get_mut(&id) else {
            debug!(session = id, request, "Discarding response for closed session");
            return Delivery::Discarded(id);
        };
        if !session.complete_request(request, result) {
            debug!(session = id, request, "Discarding response for abandoned request");
            return Delivery::Discarded(id);
        }

        if let Some(event) = session.take_queued() {
            self.feed(id, event).await;
        }
        Delivery::Applied(id)
    }
}
