//! Incremental terminal redisplay: diff the current buffer against the last
//! rendered frame and emit only the bytes needed to bring the screen in
//! sync, using a small VT100 subset.

use std::io::{self, Write};

use unicode_segmentation::UnicodeSegmentation;

use crate::session::Session;
use crate::terminal::Terminal;
use crate::utf8::grapheme_width;

const BEL: u8 = 0x07;

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _rows)| cols as usize)
        .unwrap_or(80)
        .max(1)
}

/// Row/column reached after laying `s` out from column 0 at the given
/// width, wrapping whenever a grapheme would overflow the line.
fn wrap_end(s: &str, width: usize) -> (usize, usize) {
    wrap_to(s, s.len(), width)
}

/// Row/column reached after laying out `s[..point]` from column 0.
fn wrap_to(s: &str, point: usize, width: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    let mut idx = 0;
    while idx < point {
        let (gw, next) = grapheme_width(s, idx);
        if next == idx {
            break;
        }
        if col + gw > width {
            row += 1;
            col = 0;
        }
        col += gw;
        if col >= width {
            row += 1;
            col = 0;
        }
        idx = next;
    }
    (row, col)
}

/// The largest grapheme-cluster boundary in `s` that is `<= limit`. Walks
/// grapheme *end* offsets rather than starts, so `s.len()` itself — the
/// boundary after the final grapheme, which `grapheme_indices` never yields
/// as a start — is reachable when `limit` covers the whole string.
fn grapheme_floor(s: &str, limit: usize) -> usize {
    let mut last = 0;
    for (idx, g) in s.grapheme_indices(true) {
        let end = idx + g.len();
        if end > limit {
            break;
        }
        last = end;
    }
    last
}

impl<R: Terminal, W: Write> Session<R, W> {
    pub fn get_width(&self) -> usize {
        terminal_width()
    }

    /// Render the buffer contents as they should appear on screen: identity
    /// when echo is enabled, or `echo_char` repeated once per grapheme (or
    /// nothing) when it is suppressed.
    fn display_buffer(&self) -> String {
        let line = self.current_line();
        if self.echo_enabled {
            return line.to_string();
        }
        match self.echo_char {
            Some(c) => line.graphemes(true).map(|_| c).collect(),
            None => String::new(),
        }
    }

    /// Map a byte offset in the real line to the matching offset in the
    /// (possibly shorter, substituted) display buffer.
    fn display_point(&self, display: &str) -> usize {
        if self.echo_enabled {
            return self.point;
        }
        let graphemes_before = self.current_line()[..self.point].graphemes(true).count();
        display
            .grapheme_indices(true)
            .nth(graphemes_before)
            .map(|(idx, _)| idx)
            .unwrap_or(display.len())
    }

    pub fn ding(&mut self) -> io::Result<()> {
        self.ostream.write_all(&[BEL])?;
        self.ostream.flush()
    }

    pub(crate) fn ding_silently(&mut self) {
        let _ = self.ding();
    }

    pub fn crlf(&mut self) -> io::Result<()> {
        self.ostream.write_all(b"\n")?;
        self.ostream.flush()
    }

    /// Drop the remembered frame so the next [`Session::redisplay`] repaints
    /// from scratch instead of diffing.
    pub fn reset_line_state(&mut self) {
        self.last_buffer = None;
    }

    fn emit(&mut self, s: &str) -> io::Result<()> {
        self.ostream.write_all(s.as_bytes())
    }

    fn cursor_up(&mut self, n: usize) -> io::Result<()> {
        if n > 0 {
            self.emit(&format!("\x1b[{n}A"))?;
        }
        Ok(())
    }

    fn cursor_down(&mut self, n: usize) -> io::Result<()> {
        if n > 0 {
            self.emit(&format!("\x1b[{n}B"))?;
        }
        Ok(())
    }

    fn cursor_forward(&mut self, n: usize) -> io::Result<()> {
        if n > 0 {
            self.emit(&format!("\x1b[{n}C"))?;
        }
        Ok(())
    }

    fn erase_to_eol(&mut self) -> io::Result<()> {
        self.emit("\x1b[0K")
    }

    fn erase_line(&mut self) -> io::Result<()> {
        self.emit("\x1b[2K")
    }

    /// Clear the whole screen and home the cursor, then repaint from
    /// scratch. Used by Ctrl-L.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.emit("\x1b[2J\x1b[H")?;
        self.reset_line_state();
        self.redisplay()
    }

    /// Repaint the prompt and buffer, writing only the bytes needed to bring
    /// the terminal from its last-known rendered state to the current one.
    pub fn redisplay(&mut self) -> io::Result<()> {
        let width = self.get_width();
        let (prompt_row, prompt_col) = wrap_end(&self.prompt, width);
        let display = self.display_buffer();
        let display_point = self.display_point(&display);

        match self.last_buffer.take() {
            None => {
                self.emit(&self.prompt.clone())?;
                self.emit(&display)?;
                let (end_row, _end_col) = wrap_to_from(prompt_row, prompt_col, &display, display.len(), width);
                let (point_row, point_col) = wrap_to_from(prompt_row, prompt_col, &display, display_point, width);
                self.finish_redisplay(&display, end_row, point_row, point_col)?;
            }
            Some(prev) => {
                let last_end = self.last_end;
                let common = prev
                    .iter()
                    .zip(display.as_bytes().iter())
                    .take_while(|(a, b)| a == b)
                    .count()
                    .min(last_end)
                    .min(display.len());
                let mut keep_len = grapheme_floor(&display, common);

                let (mut keep_row, mut keep_col) =
                    wrap_to_from(prompt_row, prompt_col, &display, keep_len, width);
                if keep_col == 0 && keep_row > prompt_row && keep_len > 0 {
                    // never keep a prefix that ends exactly on a wrapped row boundary
                    keep_len = crate::utf8::grapheme_prev(&display, keep_len);
                    let (kr, kc) = wrap_to_from(prompt_row, prompt_col, &display, keep_len, width);
                    keep_row = kr;
                    keep_col = kc;
                }
                self.move_to_row(self.last_point_row, self.last_row)?;
                self.erase_rows_above(keep_row, self.last_row)?;
                self.emit("\r")?;
                self.cursor_forward(keep_col)?;
                self.erase_to_eol()?;
                self.emit(&display[keep_len..])?;

                let (end_row, _end_col) = wrap_to_from(prompt_row, prompt_col, &display, display.len(), width);
                let (point_row, point_col) = wrap_to_from(prompt_row, prompt_col, &display, display_point, width);
                self.finish_redisplay(&display, end_row, point_row, point_col)?;
            }
        }
        Ok(())
    }

    fn finish_redisplay(
        &mut self,
        display: &str,
        end_row: usize,
        point_row: usize,
        point_col: usize,
    ) -> io::Result<()> {
        if end_row < point_row {
            self.emit("\n")?;
        }
        self.move_to_row(end_row, point_row)?;
        self.emit("\r")?;
        self.cursor_forward(point_col)?;
        self.ostream.flush()?;

        self.last_buffer = Some(display.as_bytes().to_vec());
        self.last_end = display.len();
        self.last_row = end_row;
        self.last_point_row = point_row;
        Ok(())
    }

    fn move_to_row(&mut self, from_row: usize, to_row: usize) -> io::Result<()> {
        if to_row > from_row {
            self.cursor_down(to_row - from_row)
        } else if to_row < from_row {
            self.cursor_up(from_row - to_row)
        } else {
            Ok(())
        }
    }

    /// Starting from `last_row` (the caller must already be positioned
    /// there), erase each row strictly above `keep_row` and move up one row
    /// at a time, leaving the cursor at `keep_row`. The kept row itself is
    /// never fully erased here — only `erase_to_eol` after repositioning to
    /// `keep_col`, so the preserved prefix survives.
    fn erase_rows_above(&mut self, keep_row: usize, last_row: usize) -> io::Result<()> {
        let mut row = last_row;
        while row > keep_row {
            self.erase_line()?;
            self.cursor_up(1)?;
            row -= 1;
        }
        Ok(())
    }
}

/// Like `wrap_to`, but starting from an already-known `(row, col)` origin
/// (used so the prompt and the buffer share one continuous wrap
/// computation).
fn wrap_to_from(
    start_row: usize,
    start_col: usize,
    s: &str,
    point: usize,
    width: usize,
) -> (usize, usize) {
    let mut row = start_row;
    let mut col = start_col;
    let mut idx = 0;
    while idx < point {
        let (gw, next) = grapheme_width(s, idx);
        if next == idx {
            break;
        }
        if col + gw > width {
            row += 1;
            col = 0;
        }
        col += gw;
        if col >= width {
            row += 1;
            col = 0;
        }
        idx = next;
    }
    (row, col)
}
