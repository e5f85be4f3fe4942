//! The session facade: construction, the read loop, and the accessors
//! handlers and embedding applications use.

use std::io::{self, Read, Write};

use crate::buffer::LineSource;
use crate::handlers::install_default_bindings;
use crate::keymap::KeymapNode;
use crate::terminal::Terminal;
use crate::utf8::char_len;

/// The top-level editing context: one per logical line being read. A single
/// `Session` is reused across many [`Session::readline`] calls, each of
/// which resets the buffer and redisplay state but keeps bindings, echo
/// policy, and the line-length cap.
pub struct Session<R, W> {
    pub(crate) istream: R,
    pub(crate) ostream: W,
    is_interactive: bool,

    pub(crate) prompt: String,
    pub(crate) line: LineSource,
    pub(crate) buffer: Vec<u8>,
    pub(crate) max_line_length: Option<usize>,
    pub(crate) point: usize,
    pub(crate) end: usize,
    pub(crate) done: bool,
    eof: bool,
    pub(crate) kill_string: Vec<u8>,

    pub(crate) echo_enabled: bool,
    pub(crate) echo_char: Option<char>,

    pub(crate) keymap: KeymapNode<R, W>,

    pub(crate) last_buffer: Option<Vec<u8>>,
    pub(crate) last_end: usize,
    pub(crate) last_row: usize,
    pub(crate) last_point_row: usize,
}

impl<R: Terminal, W: Write> Session<R, W> {
    /// Build a session over the given streams, install the default
    /// bindings, and snapshot whether `istream` is a real terminal.
    pub fn new(istream: R, ostream: W) -> Self {
        let is_interactive = istream.is_tty();
        let mut session = Session {
            istream,
            ostream,
            is_interactive,
            prompt: String::new(),
            line: LineSource::Buffer,
            buffer: Vec::new(),
            max_line_length: None,
            point: 0,
            end: 0,
            done: false,
            eof: false,
            kill_string: Vec::new(),
            echo_enabled: true,
            echo_char: None,
            keymap: KeymapNode::new(),
            last_buffer: None,
            last_end: 0,
            last_row: 0,
            last_point_row: 0,
        };
        install_default_bindings(&mut session);
        session
    }

    pub(crate) fn end(&self) -> usize {
        self.end
    }

    pub(crate) fn set_point(&mut self, p: usize) {
        debug_assert!(p <= self.end);
        self.point = p;
    }

    pub fn enable_echo(&mut self) {
        self.echo_enabled = true;
        self.echo_char = None;
        self.reset_line_state();
    }

    pub fn disable_echo(&mut self, substitute: Option<char>) {
        self.echo_enabled = false;
        self.echo_char = substitute;
        self.reset_line_state();
    }

    pub fn limit_line_length(&mut self, max: Option<usize>) {
        self.max_line_length = max;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.ostream.write_all(s.as_bytes())
    }

    pub fn write_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        self.ostream.write_fmt(args)
    }

    fn reset_for_new_line(&mut self, prompt: &str) {
        self.buffer.clear();
        self.point = 0;
        self.end = 0;
        self.done = false;
        self.eof = false;
        self.line = LineSource::Buffer;
        self.prompt = prompt.to_string();
        self.last_buffer = None;
        self.last_end = 0;
        self.last_row = 0;
        self.last_point_row = 0;
    }

    /// Read one edited line. `Ok(None)` means the input stream hit EOF
    /// before any committed content was produced; otherwise the committed
    /// line is returned (which may be empty, e.g. after Ctrl-C).
    pub fn readline(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.reset_for_new_line(prompt);
        if self.is_interactive {
            let _raw_guard = self.istream.enter_raw_mode()?;
            self.read_interactive()?;
        } else {
            self.read_noninteractive()?;
        }
        if self.eof {
            Ok(None)
        } else {
            Ok(Some(self.get_line()))
        }
    }

    fn read_interactive(&mut self) -> io::Result<()> {
        loop {
            self.redisplay()?;
            if self.done {
                break;
            }
            match self.getchar()? {
                Some(key) => self.dispatch(key)?,
                None => {
                    self.eof = true;
                    self.done = true;
                }
            }
        }
        if !self.eof {
            if self.end > 0 && self.buffer[self.end - 1].is_ascii_whitespace() {
                self.delete_text(self.end - 1, self.end);
            }
            self.crlf()?;
        }
        Ok(())
    }

    fn read_noninteractive(&mut self) -> io::Result<()> {
        let mut byte = [0u8; 1];
        loop {
            let n = Read::read(&mut self.istream, &mut byte)?;
            if n == 0 {
                if self.end == 0 {
                    self.eof = true;
                } else {
                    self.crlf()?;
                }
                self.done = true;
                break;
            }
            match byte[0] {
                b'\n' => {
                    self.crlf()?;
                    self.done = true;
                    break;
                }
                b'\r' => continue,
                b if self.end == 0 && b.is_ascii_whitespace() => continue,
                b => {
                    self.insert_text_len(&[b]);
                }
            }
        }
        self.redisplay()
    }

    /// Read one complete key: a single control/ASCII byte, or a fully
    /// assembled multi-byte UTF-8 codepoint. Any malformed lead byte or
    /// truncated sequence is treated the same as EOF, per the error
    /// taxonomy — there is no recovery from a corrupt input stream mid-key.
    fn getchar(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut lead = [0u8; 1];
        if Read::read(&mut self.istream, &mut lead)? == 0 {
            return Ok(None);
        }
        let len = char_len(lead[0]);
        if len == 0 {
            return Ok(None);
        }
        let mut key = Vec::with_capacity(len);
        key.push(lead[0]);
        while key.len() < len {
            let mut b = [0u8; 1];
            if Read::read(&mut self.istream, &mut b)? == 0 {
                return Ok(None);
            }
            key.push(b[0]);
        }
        if len > 1 && crate::utf8::char_decode(&key).is_none() {
            return Ok(None);
        }
        Ok(Some(key))
    }
}
