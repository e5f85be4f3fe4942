//! The edit buffer: owned text plus cursor, and the primitive mutators every
//! key handler is built from.

use std::io::Write;

use crate::session::Session;
use crate::terminal::Terminal;

/// What `line` currently points at. Most of the time it aliases the owned
/// edit buffer, but an embedding application can hand the session a
/// read-only string (e.g. a history entry) via [`Session::set_line`]; the
/// first mutation after that promotes it into `buffer`.
pub(crate) enum LineSource {
    Buffer,
    External(String),
}

impl<R: Terminal, W: Write> Session<R, W> {
    pub(crate) fn current_line(&self) -> &str {
        match &self.line {
            LineSource::Buffer => {
                std::str::from_utf8(&self.buffer[..self.end]).expect("buffer holds valid utf8")
            }
            LineSource::External(s) => s.as_str(),
        }
    }

    /// Copy-on-write: if `line` is currently borrowing a foreign string,
    /// duplicate it into `buffer` and make `line` alias `buffer` again. Every
    /// mutator calls this before touching `buffer`.
    fn promote_to_buffer(&mut self) {
        if let LineSource::External(s) = &self.line {
            self.buffer = s.as_bytes().to_vec();
            self.end = self.buffer.len();
            self.line = LineSource::Buffer;
        }
    }

    /// Ensure capacity for `needed` bytes, respecting `max_line_length`.
    /// Returns `false` (ringing no bell itself — callers do that) when the
    /// line-length cap would be exceeded or the allocator is out of memory.
    pub(crate) fn extend_line_buffer(&mut self, needed: usize) -> bool {
        if let Some(max) = self.max_line_length {
            if needed >= max {
                return false;
            }
        }
        if needed <= self.buffer.capacity() {
            return true;
        }
        let target = match self.max_line_length {
            None => needed.max(self.buffer.capacity() + 10),
            Some(max) => max,
        };
        self.buffer.try_reserve(target - self.buffer.len()).is_ok()
    }

    /// Insert `s` at `point`, growing the buffer as needed.
    pub fn insert_text(&mut self, s: &str) -> bool {
        self.insert_text_len(s.as_bytes())
    }

    /// Insert raw bytes at `point`. Used by the UTF-8 accumulator in the
    /// read loop, which already has a validated, possibly multi-byte,
    /// codepoint in hand.
    pub fn insert_text_len(&mut self, s: &[u8]) -> bool {
        if s.is_empty() {
            return true;
        }
        self.promote_to_buffer();
        if !self.extend_line_buffer(self.end + s.len()) {
            self.ding_silently();
            return false;
        }
        self.buffer.splice(self.point..self.point, s.iter().copied());
        self.point += s.len();
        self.end += s.len();
        true
    }

    /// Delete the byte range `[start, end)`, clamping `point` per the usual
    /// "cursor sits where the deleted text used to be" rule.
    pub fn delete_text(&mut self, start: usize, end: usize) -> bool {
        if start > end || end > self.end {
            return false;
        }
        if start == end {
            return true;
        }
        self.promote_to_buffer();
        self.buffer.drain(start..end);
        let delta = end - start;
        self.end -= delta;
        if self.point >= end {
            self.point -= delta;
        } else if self.point > start {
            self.point = start;
        }
        true
    }

    /// Point the session at a caller-supplied line without copying it yet.
    /// `None` reverts to the owned buffer.
    pub fn set_line(&mut self, text: Option<String>) {
        match text {
            Some(s) => {
                self.point = s.len();
                self.end = s.len();
                self.line = LineSource::External(s);
            }
            None => {
                self.line = LineSource::Buffer;
                self.point = self.buffer.len();
                self.end = self.buffer.len();
            }
        }
        self.last_buffer = None;
    }

    /// Replace the buffer contents outright (e.g. a completion inserting a
    /// whole new line) and force an immediate repaint, mirroring
    /// `clear_screen`'s pairing of `reset_line_state()` with an explicit
    /// `redisplay()` call.
    pub fn replace_line(&mut self, text: &str) -> bool {
        if !self.extend_line_buffer(text.len()) {
            self.ding_silently();
            return false;
        }
        self.line = LineSource::Buffer;
        self.buffer.clear();
        self.buffer.extend_from_slice(text.as_bytes());
        self.point = text.len();
        self.end = text.len();
        self.reset_line_state();
        self.redisplay().is_ok()
    }

    pub fn get_line(&self) -> String {
        self.current_line().to_string()
    }

    pub fn get_point(&self) -> usize {
        self.point
    }
}
