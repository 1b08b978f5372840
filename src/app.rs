//! Application state and the main event loop.
//!
//! The App owns the session registry and the user event stream. Keys go to
//! the active session unless `Ctrl+B` put the app in command mode, in which
//! case the next key is a panel command.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use tokio::sync::mpsc::Receiver;
use tracing::debug;

use crate::backend::{ExecBackend, LocalBackend};
use crate::config::Config;
use crate::display::Screen;
use crate::event::terminal::interpret_key;
use crate::event::{UserEvent, init_user_event};
use crate::registry::{PanelAction, SessionRegistry};
use crate::ui::PanelLayout;

pub struct App {
    registry: SessionRegistry<Screen>,

    exit: bool,         // Should the app exit?
    command_mode: bool, // Is the app in the command mode?

    // Last area the session screens were sized for
    terminal_area: Rect,

    user_events: Receiver<std::io::Result<UserEvent>>,
}

impl App {
    /// Start the app with a local backend and its first session.
    pub async fn new(config: &Config) -> Result<Self> {
        let backend: Arc<dyn ExecBackend> = Arc::new(LocalBackend::new(config.exec_timeout_secs));
        let registry = SessionRegistry::open(backend, config)
            .await
            .context("Failed to start the first terminal session")?;
        Ok(Self::with_registry(registry, init_user_event()))
    }

    pub fn with_registry(
        registry: SessionRegistry<Screen>,
        user_events: Receiver<std::io::Result<UserEvent>>,
    ) -> Self {
        Self {
            registry,
            exit: false,
            command_mode: false,
            terminal_area: Rect::default(),
            user_events,
        }
    }

    pub fn registry(&self) -> &SessionRegistry<Screen> {
        &self.registry
    }

    pub fn get_command_mode(&self) -> bool {
        self.command_mode
    }

    pub fn set_command_mode(&mut self, flag: bool) {
        self.command_mode = flag;
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.exit {
                self.registry.shutdown().await;
                break Ok(());
            }
            tokio::select! {
                res = self.user_events.recv() => {
                    let usr_evt = res.with_context(|| anyhow::anyhow!("User event stream is ended."))?;
                    self.handle_user_event(usr_evt?).await;
                }
                response = self.registry.next_exec_response() => {
                    if let Some(response) = response {
                        let delivery = self.registry.deliver(response).await;
                        debug!(?delivery, "Exec response");
                    }
                }
            }
            self.draw(terminal)?;
        }
    }

    pub fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            let area = frame.area();
            self.fit_to(area);

            use ratatui::widgets::Widget;
            (&*self).render(area, frame.buffer_mut());
        })?;

        self.update_cursor_position(terminal)?;
        Ok(())
    }

    /// Resize every session screen when the panel's terminal area changed.
    fn fit_to(&mut self, area: Rect) {
        let inner = PanelLayout::new(area).terminal;
        if inner.width != self.terminal_area.width || inner.height != self.terminal_area.height {
            debug!(rows = inner.height, cols = inner.width, "Resizing session screens");
            self.registry.resize(inner.height, inner.width);
        }
        self.terminal_area = inner;
    }

    fn update_cursor_position(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let session = match self.registry.active_session() {
            Some(s) if !self.command_mode && !s.is_busy() => s,
            _ => {
                terminal.hide_cursor()?;
                return Ok(());
            }
        };

        let area = self.terminal_area;
        let (row, col) = session.display().cursor_position();
        if row >= area.height || col >= area.width {
            terminal.hide_cursor()?;
            return Ok(());
        }
        terminal.show_cursor()?;
        terminal.set_cursor_position((area.x + col, area.y + row))?;
        Ok(())
    }
}

fn is_press(key: &KeyEvent) -> bool {
    matches!(key.kind, KeyEventKind::Press)
}

impl App {
    pub async fn handle_user_event(&mut self, event: UserEvent) {
        if self.command_mode {
            if let UserEvent::Key(key) = event {
                if is_press(&key) {
                    self.handle_command_mode_key(key).await;
                }
            }
            return;
        }

        if let UserEvent::Key(key_evt) = event {
            // Ctrl + B => Command Mode
            if is_press(&key_evt)
                && key_evt.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key_evt.code, KeyCode::Char('b') | KeyCode::Char('B'))
            {
                self.set_command_mode(true);
                return;
            }
            if let Some(edit) = interpret_key(key_evt) {
                self.registry.handle_key(edit).await;
            }
        }
        // Resizes are picked up by the next draw.
    }

    async fn handle_command_mode_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.registry.apply(PanelAction::NewSession).await;
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.registry.close_active().await;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let position = c as usize - '1' as usize;
                self.registry.apply(PanelAction::SelectTab(position)).await;
            }
            KeyCode::Tab => self.registry.select_next(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.registry.apply(PanelAction::Refresh).await;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let next = self.registry.shell_kind().next();
                self.registry.apply(PanelAction::SetShellKind(next)).await;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.exit = true;
            }
            _ => {}
        }
        self.set_command_mode(false);
    }
}
