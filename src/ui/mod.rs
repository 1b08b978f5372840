//! User interface: tab bar, the active session's screen and a status line.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs, Widget};

use crate::app::App;
use crate::registry::TabInfo;

pub mod terminal;

use terminal::TerminalView;

/// Screen areas of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelLayout {
    pub tabs: Rect,
    pub terminal_block: Rect,
    /// Inside the border: where the session screen is drawn.
    pub terminal: Rect,
    pub status: Rect,
}

impl PanelLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // tab bar
                Constraint::Min(3),    // session screen
                Constraint::Length(1), // status line
            ])
            .split(area);
        let terminal_block = chunks[1];
        Self {
            tabs: chunks[0],
            terminal_block,
            terminal: terminal_block_widget(" shell-tabs ").inner(terminal_block),
            status: chunks[2],
        }
    }
}

fn terminal_block_widget(title: &str) -> Block<'_> {
    Block::new()
        .borders(Borders::all())
        .title(Line::from(title.bold()))
}

fn tab_title(tab: &TabInfo) -> Line<'static> {
    let marker = if tab.busy { " *" } else { "" };
    Line::from(format!(" {}{} ", tab.name, marker))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = PanelLayout::new(area);
        let registry = self.registry();

        let tabs = registry.tabs();
        let selected = tabs.iter().position(|t| t.active).unwrap_or(0);
        Tabs::new(tabs.iter().map(tab_title))
            .select(selected)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .divider("|")
            .render(layout.tabs, buf);

        let title = if self.get_command_mode() {
            " shell-tabs [COMMAND] "
        } else {
            " shell-tabs "
        };
        terminal_block_widget(title).render(layout.terminal_block, buf);
        if let Some(session) = registry.active_session() {
            TerminalView::new(session.display()).render(layout.terminal, buf);
        }

        let status = Line::from(vec![
            Span::from(format!(" shell: {} ", registry.shell_kind())).bold(),
            Span::from(
                "| Ctrl+B then: n new  w close  1-9 select  Tab next  r refresh  s shell  q quit",
            )
            .dark_gray(),
        ]);
        status.render(layout.status, buf);
    }
}
