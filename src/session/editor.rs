//! Line editing state machine.
//!
//! A [`LineEditor`] owns the uncommitted input line and the session history.
//! It is driven by discrete [`EditEvent`]s and answers with the display
//! operations that keep the screen in step with the line, so it can be
//! exercised without any display attached.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::history::History;
use crate::display::DisplayOp;

/// A single editing action, already decoded from raw key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    Insert(char),
    Erase,
    RecallPrevious,
    RecallNext,
    Submit,
    Cancel,
}

/// What an event did to the line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub ops: Vec<DisplayOp>,
    /// Set on submit: the raw line as typed.
    pub submitted: Option<String>,
}

impl EditOutcome {
    fn ops(ops: Vec<DisplayOp>) -> Self {
        Self {
            ops,
            submitted: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct LineEditor {
    line: String,
    history: History,
}

/// Columns the screen advances for `text`. Zero-width chars combine into the
/// previous cell, so they take none.
fn columns(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(1)).sum()
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Record a dispatched command line.
    pub fn record(&mut self, line: &str) {
        self.history.push(line);
    }

    pub fn apply(&mut self, event: EditEvent) -> EditOutcome {
        match event {
            EditEvent::Insert(c) => {
                // A combining char needs a base in the line, not the prompt.
                if self.line.is_empty() && c.width() == Some(0) {
                    return EditOutcome::default();
                }
                self.line.push(c);
                EditOutcome::ops(vec![DisplayOp::Echo(c.to_string())])
            }
            EditEvent::Erase => {
                // Whole grapheme: a combining mark shares its base's cell.
                let Some((start, _)) = self.line.grapheme_indices(true).next_back() else {
                    return EditOutcome::default();
                };
                let removed: String = self.line.drain(start..).collect();
                EditOutcome::ops(vec![DisplayOp::Erase(columns(&removed))])
            }
            EditEvent::RecallPrevious => {
                let recalled = self.history.recall_previous().map(str::to_string);
                self.replace_line(recalled)
            }
            EditEvent::RecallNext => {
                let recalled = self.history.recall_next().map(str::to_string);
                self.replace_line(recalled)
            }
            EditEvent::Submit => {
                let line = std::mem::take(&mut self.line);
                self.history.reset_cursor();
                EditOutcome {
                    ops: vec![DisplayOp::Newline],
                    submitted: Some(line),
                }
            }
            EditEvent::Cancel => {
                self.line.clear();
                self.history.reset_cursor();
                EditOutcome::ops(vec![DisplayOp::Interrupt, DisplayOp::Prompt])
            }
        }
    }

    /// Swap the displayed line for a recalled one.
    /// The erase width comes from the line being replaced.
    fn replace_line(&mut self, recalled: Option<String>) -> EditOutcome {
        let Some(new_line) = recalled else {
            return EditOutcome::default();
        };
        let mut ops = vec![DisplayOp::Erase(columns(&self.line))];
        if !new_line.is_empty() {
            ops.push(DisplayOp::Echo(new_line.clone()));
        }
        self.line = new_line;
        EditOutcome::ops(ops)
    }
}
