//! shell-tabs - several independent shell sessions in one terminal panel
//!
//! This library provides the core of the panel:
//! - a session registry that opens, switches and closes sessions
//! - per-session line editing with history recall
//! - command dispatch between local built-ins and a backend execution service
//!
//! Displays and backends are capabilities behind the [`display::DisplaySink`]
//! and [`backend::ExecBackend`] traits.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shell_tabs::backend::LocalBackend;
//! use shell_tabs::config::Config;
//! use shell_tabs::display::Transcript;
//! use shell_tabs::registry::SessionRegistry;
//! use shell_tabs::session::EditEvent;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let backend = Arc::new(LocalBackend::new(config.exec_timeout_secs));
//!     let mut registry = SessionRegistry::<Transcript>::open(backend, &config).await?;
//!
//!     for c in "ls".chars() {
//!         registry.handle_key(EditEvent::Insert(c)).await;
//!     }
//!     registry.handle_key(EditEvent::Submit).await;
//!
//!     // The output lands in the session's display once the response arrives
//!     registry.recv_exec_response().await;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod backend;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod event;
pub mod registry;
pub mod session;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use app::App;
pub use backend::{BackendError, BackendHandle, ExecBackend, LocalBackend};
pub use config::{Config, ShellKind};
pub use display::{DisplaySink, Screen, Transcript};
pub use event::{UserEvent, init_user_event};
pub use registry::{PanelAction, SessionRegistry, TabInfo};
pub use session::{EditEvent, SessionId, TerminalSession};
