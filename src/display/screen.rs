//! vt100-backed display used by the TUI.

use vt100::Parser;

use super::DisplaySink;

const SCROLLBACK_LINES: usize = 1000;
/// Upper bound on the raw text kept for replay after a resize.
const REPLAY_LIMIT_BYTES: usize = 256 * 1024;

/// A terminal screen that interprets the written text as VT sequences.
///
/// vt100 can't reflow, so on resize the parser is rebuilt and the text
/// written since the last clear is replayed into it.
pub struct Screen {
    parser: Parser,
    replay: String,
    rows: u16,
    cols: u16,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl Screen {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            parser: Parser::new(rows.max(1), cols.max(1), SCROLLBACK_LINES),
            replay: String::new(),
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    pub fn screen(&self) -> &vt100::Screen {
        self.parser.screen()
    }

    pub fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    /// Cursor as (row, col).
    pub fn cursor_position(&self) -> (u16, u16) {
        self.parser.screen().cursor_position()
    }

    fn trim_replay(&mut self) {
        if self.replay.len() <= REPLAY_LIMIT_BYTES {
            return;
        }
        let mut cut = self.replay.len() - REPLAY_LIMIT_BYTES;
        while !self.replay.is_char_boundary(cut) {
            cut += 1;
        }
        // Restart at a line boundary so the replay doesn't begin mid-sequence.
        if let Some(nl) = self.replay[cut..].find('\n') {
            cut += nl + 1;
        }
        self.replay.drain(..cut);
    }
}

impl DisplaySink for Screen {
    fn write(&mut self, text: &str) {
        self.parser.process(text.as_bytes());
        self.replay.push_str(text);
        self.trim_replay();
    }

    fn clear(&mut self) {
        self.parser = Parser::new(self.rows, self.cols, SCROLLBACK_LINES);
        self.replay.clear();
    }

    fn resize(&mut self, rows: u16, cols: u16) {
        let (rows, cols) = (rows.max(1), cols.max(1));
        if (rows, cols) == (self.rows, self.cols) {
            return;
        }
        self.rows = rows;
        self.cols = cols;
        self.parser = Parser::new(rows, cols, SCROLLBACK_LINES);
        self.parser.process(self.replay.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(screen: &Screen, row: u16) -> String {
        let (_, cols) = screen.size();
        (0..cols)
            .filter_map(|col| screen.screen().cell(row, col))
            .map(|cell| cell.contents().to_string())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_write_and_erase() {
        let mut screen = Screen::new(5, 20);
        screen.write("$ lsx");
        screen.write("\x08 \x08");
        assert_eq!(row_text(&screen, 0), "$ ls");
        assert_eq!(screen.cursor_position(), (0, 4));
    }

    #[test]
    fn test_clear_resets_screen() {
        let mut screen = Screen::new(5, 20);
        screen.write("hello\r\n");
        screen.clear();
        assert_eq!(row_text(&screen, 0), "");
        assert_eq!(screen.cursor_position(), (0, 0));
    }

    #[test]
    fn test_resize_replays_content() {
        let mut screen = Screen::new(5, 20);
        screen.write("first\r\nsecond");
        screen.resize(10, 40);
        assert_eq!(screen.size(), (10, 40));
        assert_eq!(row_text(&screen, 0), "first");
        assert_eq!(row_text(&screen, 1), "second");
    }
}
