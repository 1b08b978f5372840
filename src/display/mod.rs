//! Terminal display capability.
//!
//! The core only ever *writes* to a display: plain text and raw control
//! sequences go in, rendering is someone else's problem. [`DisplaySink`] is
//! that seam. [`Transcript`] keeps the written text in memory (headless use
//! and tests); [`Screen`] feeds it through a vt100 parser for the TUI.

mod screen;

pub use screen::Screen;

/// Erases one column: back, blank, back.
const ERASE_COLUMN: &str = "\x08 \x08";

/// Marker written when the user interrupts the current line.
pub const INTERRUPT_MARKER: &str = "^C";

/// SGR sequences used for inline error lines.
pub const ERROR_STYLE: &str = "\x1b[31m";
pub const RESET_STYLE: &str = "\x1b[0m";

/// Something that renders a stream of terminal text.
pub trait DisplaySink {
    fn write(&mut self, text: &str);

    /// Drop everything shown so far, scrollback included.
    fn clear(&mut self);

    /// Sizing notification; displays that don't care can ignore it.
    fn resize(&mut self, _rows: u16, _cols: u16) {}
}

/// Line-editing output produced by the input interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    /// Show text as typed.
    Echo(String),
    /// Erase this many columns left of the cursor.
    Erase(usize),
    Newline,
    /// Show the interrupt marker and move to a new line.
    Interrupt,
    Prompt,
}

impl DisplayOp {
    /// Render the op as terminal text.
    pub fn to_text(&self, prompt: &str) -> String {
        match self {
            DisplayOp::Echo(text) => text.clone(),
            DisplayOp::Erase(columns) => ERASE_COLUMN.repeat(*columns),
            DisplayOp::Newline => "\r\n".to_string(),
            DisplayOp::Interrupt => format!("{}\r\n", INTERRUPT_MARKER),
            DisplayOp::Prompt => prompt.to_string(),
        }
    }
}

/// Convert bare `\n` line endings to `\r\n` so output starts at column 0.
pub fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut prev = '\0';
    for ch in text.chars() {
        if ch == '\n' && prev != '\r' {
            out.push('\r');
        }
        out.push(ch);
        prev = ch;
    }
    out
}

/// In-memory display that records what was written.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    visible: String,
    clears: usize,
    size: Option<(u16, u16)>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written since the last clear.
    pub fn contents(&self) -> &str {
        &self.visible
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn size(&self) -> Option<(u16, u16)> {
        self.size
    }
}

impl DisplaySink for Transcript {
    fn write(&mut self, text: &str) {
        self.visible.push_str(text);
    }

    fn clear(&mut self) {
        self.visible.clear();
        self.clears += 1;
    }

    fn resize(&mut self, rows: u16, cols: u16) {
        self.size = Some((rows, cols));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erase_renders_one_sequence_per_column() {
        assert_eq!(DisplayOp::Erase(0).to_text("$ "), "");
        assert_eq!(DisplayOp::Erase(2).to_text("$ "), "\x08 \x08\x08 \x08");
    }

    #[test]
    fn test_prompt_and_interrupt_text() {
        assert_eq!(DisplayOp::Prompt.to_text("> "), "> ");
        assert_eq!(DisplayOp::Interrupt.to_text("> "), "^C\r\n");
        assert_eq!(DisplayOp::Newline.to_text("> "), "\r\n");
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\nb\n"), "a\r\nb\r\n");
        assert_eq!(normalize_newlines("a\r\nb"), "a\r\nb");
        assert_eq!(normalize_newlines("plain"), "plain");
    }

    #[test]
    fn test_transcript_clear_drops_visible_text() {
        let mut t = Transcript::new();
        t.write("hello");
        t.clear();
        t.write("again");
        assert_eq!(t.contents(), "again");
        assert_eq!(t.clear_count(), 1);
    }
}
