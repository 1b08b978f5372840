//! A single terminal session: one line editor, one history, one backend
//! shell handle and one display.
//!
//! The session interprets its own key stream and runs built-ins locally.
//! Anything that needs the backend or the registry (remote execution,
//! closing itself) is handed back to the caller as a [`SessionRequest`].

pub mod editor;
pub mod history;

use std::collections::VecDeque;

use tracing::debug;

use crate::backend::{BackendError, BackendHandle};
use crate::dispatch::{Command, HELP_TEXT};
use crate::display::{DisplayOp, DisplaySink, ERROR_STYLE, RESET_STYLE, normalize_newlines};

pub use editor::{EditEvent, EditOutcome, LineEditor};
pub use history::{History, HistoryCursor};

/// Locally generated session identifier, unique for the process lifetime.
pub type SessionId = u64;

/// Identifier of one execution request issued by a session.
pub type RequestId = u64;

/// Work a session needs its owner to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRequest {
    Execute { program: String, args: Vec<String> },
    /// Stop the command still running for an abandoned request.
    Interrupt,
    Exit,
}

pub struct TerminalSession<D> {
    id: SessionId,
    display_name: String,
    backend_handle: BackendHandle,
    editor: LineEditor,
    display: D,
    prompt: String,
    /// Request whose response the session is waiting for.
    in_flight: Option<RequestId>,
    /// Keys typed while busy, replayed once the response is written.
    queued: VecDeque<EditEvent>,
}

impl<D: DisplaySink> TerminalSession<D> {
    pub fn new(
        id: SessionId,
        display_name: impl Into<String>,
        backend_handle: BackendHandle,
        display: D,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            backend_handle,
            editor: LineEditor::new(),
            display,
            prompt: prompt.into(),
            in_flight: None,
            queued: VecDeque::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn backend_handle(&self) -> &BackendHandle {
        &self.backend_handle
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// The uncommitted input line.
    pub fn line(&self) -> &str {
        self.editor.line()
    }

    pub fn history(&self) -> &History {
        self.editor.history()
    }

    /// Whether an execution request is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub(crate) fn into_backend_handle(self) -> BackendHandle {
        self.backend_handle
    }

    /// Greet a freshly created session.
    pub fn open(&mut self) {
        self.write_banner();
        self.render(&[DisplayOp::Prompt]);
    }

    /// Apply one edit event.
    pub fn handle_event(&mut self, event: EditEvent) -> Option<SessionRequest> {
        if let Some(request) = self.in_flight {
            if event == EditEvent::Cancel {
                debug!(session = self.id, request, "Abandoning in-flight request");
                self.in_flight = None;
                self.queued.clear();
                let outcome = self.editor.apply(EditEvent::Cancel);
                self.render(&outcome.ops);
                return Some(SessionRequest::Interrupt);
            }
            self.queued.push_back(event);
            return None;
        }

        let outcome = self.editor.apply(event);
        self.render(&outcome.ops);
        let line = outcome.submitted?;
        self.dispatch(&line)
    }

    fn dispatch(&mut self, line: &str) -> Option<SessionRequest> {
        match Command::parse(line) {
            None => {
                self.render(&[DisplayOp::Prompt]);
                None
            }
            Some(Command::Help) => {
                self.display.write(&normalize_newlines(HELP_TEXT));
                self.render(&[DisplayOp::Prompt]);
                None
            }
            Some(Command::Clear) => {
                self.display.clear();
                self.render(&[DisplayOp::Prompt]);
                None
            }
            Some(Command::Exit) => Some(SessionRequest::Exit),
            Some(Command::Remote { program, args }) => {
                self.editor.record(line);
                Some(SessionRequest::Execute { program, args })
            }
        }
    }

    /// Mark `request` as the one this session is waiting on.
    pub(crate) fn begin_request(&mut self, request: RequestId) {
        self.in_flight = Some(request);
    }

    /// Write the outcome of `request` and redraw the prompt.
    ///
    /// Returns `false`, writing nothing, when the session is not waiting on
    /// `request` (it was cancelled or superseded).
    pub fn complete_request(
        &mut self,
        request: RequestId,
        result: Result<String, BackendError>,
    ) -> bool {
        if self.in_flight != Some(request) {
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(output) => self.write_output(&output),
            Err(err) => self.write_error(&err.to_string()),
        }
        self.render(&[DisplayOp::Prompt]);
        true
    }

    /// Next key typed while the session was busy, once it no longer is.
    pub fn take_queued(&mut self) -> Option<EditEvent> {
        if self.is_busy() {
            return None;
        }
        self.queued.pop_front()
    }

    /// Clear the screen and redraw banner, prompt and the pending line.
    pub fn refresh(&mut self) {
        self.display.clear();
        self.write_banner();
        if !self.is_busy() {
            let pending = self.editor.line().to_string();
            self.render(&[DisplayOp::Prompt, DisplayOp::Echo(pending)]);
        }
    }

    /// Write command output, making sure the prompt starts on a fresh line.
    pub fn write_output(&mut self, output: &str) {
        if output.is_empty() {
            return;
        }
        let mut text = normalize_newlines(output);
        if !text.ends_with('\n') {
            text.push_str("\r\n");
        }
        self.display.write(&text);
    }

    /// Write an error-styled line.
    pub fn write_error(&mut self, message: &str) {
        let text = format!(
            "{}Error: {}{}\r\n",
            ERROR_STYLE,
            normalize_newlines(message.trim_end()),
            RESET_STYLE
        );
        self.display.write(&text);
    }

    pub fn write_prompt(&mut self) {
        self.render(&[DisplayOp::Prompt]);
    }

    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.display.resize(rows, cols);
    }

    fn write_banner(&mut self) {
        let banner = format!(
            "shell-tabs {} - {}\r\nType 'help' for built-in commands.\r\n",
            env!("CARGO_PKG_VERSION"),
            self.display_name
        );
        self.display.write(&banner);
    }

    fn render(&mut self, ops: &[DisplayOp]) {
        for op in ops {
            let text = op.to_text(&self.prompt);
            if !text.is_empty() {
                self.display.write(&text);
            }
        }
    }
}
