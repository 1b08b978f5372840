//! Main entry point for shell-tabs.
//!
//! Loads configuration, sets up file logging, starts the first session and
//! runs the TUI event loop, restoring the terminal on every exit path.

use anyhow::Result;
use shell_tabs::app::App;
use shell_tabs::config::Config;
use shell_tabs::utils;
use shell_tabs::utils::guard::RestoreGuard;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Initialize logging before anything else
    if let Err(e) = utils::logger::init_logging(&config.log_dir, &config.log_level) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    // Spawn errors surface on the plain terminal, before raw mode.
    let mut app = App::new(&config).await?;

    let mut terminal = ratatui::init();
    let _restore = RestoreGuard::with(ratatui::restore);

    // draw 1st frame
    app.draw(&mut terminal)?;
    // run event-driven main loop of app
    app.run(&mut terminal).await
}
