//! Per-session command history with a recall cursor.
//!
//! History is append-only, oldest first. The cursor is either at the bottom
//! (no recall active, one past the newest entry) or on an entry index.

/// Position of the recall cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryCursor {
    #[default]
    Bottom,
    At(usize),
}

#[derive(Clone, Debug, Default)]
pub struct History {
    commands: Vec<String>,
    cursor: HistoryCursor,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command to history.
    /// The command is trimmed; blank commands are skipped.
    pub fn push(&mut self, cmd: &str) {
        let trimmed = cmd.trim();
        if trimmed.is_empty() {
            return;
        }
        self.commands.push(trimmed.to_string());
        self.cursor = HistoryCursor::Bottom;
    }

    /// Step towards older entries.
    /// Returns the recalled entry, or `None` when nothing moved.
    pub fn recall_previous(&mut self) -> Option<&str> {
        let idx = match self.cursor {
            _ if self.commands.is_empty() => return None,
            HistoryCursor::Bottom => self.commands.len() - 1,
            HistoryCursor::At(0) => return None,
            HistoryCursor::At(i) => i - 1,
        };
        self.cursor = HistoryCursor::At(idx);
        self.commands.get(idx).map(String::as_str)
    }

    /// Step towards newer entries.
    /// Stepping past the newest entry returns to the bottom and yields `""`.
    /// Returns `None` when nothing moved.
    pub fn recall_next(&mut self) -> Option<&str> {
        match self.cursor {
            _ if self.commands.is_empty() => None,
            HistoryCursor::Bottom => None,
            HistoryCursor::At(i) if i + 1 >= self.commands.len() => {
                self.cursor = HistoryCursor::Bottom;
                Some("")
            }
            HistoryCursor::At(i) => {
                self.cursor = HistoryCursor::At(i + 1);
                self.commands.get(i + 1).map(String::as_str)
            }
        }
    }

    /// Leave recall mode.
    pub fn reset_cursor(&mut self) {
        self.cursor = HistoryCursor::Bottom;
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
