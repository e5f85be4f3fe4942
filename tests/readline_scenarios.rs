//! End-to-end scenarios driving `Session::readline` against in-memory
//! streams instead of a real pty. `MockTty` reports itself as a terminal so
//! these exercise the raw-mode dispatch path; `Cursor<Vec<u8>>` on its own
//! (never a tty) exercises the non-interactive line-read path.

use std::io::{Cursor, Read};

use tinyline::{RawModeGuard, Session, Terminal};

struct MockTty(Cursor<Vec<u8>>);

impl MockTty {
    fn new(input: &[u8]) -> Self {
        MockTty(Cursor::new(input.to_vec()))
    }
}

impl Read for MockTty {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Terminal for MockTty {
    fn is_tty(&self) -> bool {
        true
    }

    fn enter_raw_mode(&mut self) -> std::io::Result<RawModeGuard> {
        Ok(RawModeGuard::Inert)
    }

    fn probe_byte(&mut self) -> std::io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.0.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

fn interactive_session(input: &[u8]) -> Session<MockTty, Vec<u8>> {
    Session::new(MockTty::new(input), Vec::new())
}

fn pipe_session(input: &[u8]) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
    Session::new(Cursor::new(input.to_vec()), Vec::new())
}

#[test]
fn echo_round_trip() {
    let mut session = interactive_session(b"hi\r");
    assert_eq!(session.readline("> ").unwrap(), Some("hi".to_string()));
}

#[test]
fn backspace_removes_last_char() {
    let mut session = interactive_session(b"ab\x7f\r");
    assert_eq!(session.readline("> ").unwrap(), Some("a".to_string()));
}

#[test]
fn ctrl_a_moves_to_start_of_line() {
    let mut session = interactive_session(b"abc\x01X\r");
    assert_eq!(session.readline("> ").unwrap(), Some("Xabc".to_string()));
}

#[test]
fn kill_then_yank_round_trips_through_dispatch() {
    let mut session = interactive_session(b"hello\x01\x0b\x19\r");
    assert_eq!(session.readline("> ").unwrap(), Some("hello".to_string()));
}

#[test]
fn left_arrow_escape_sequence_moves_cursor() {
    let mut session = interactive_session(b"ab\x1b[DX\r");
    assert_eq!(session.readline("> ").unwrap(), Some("aXb".to_string()));
}

#[test]
fn utf8_grapheme_backspace_deletes_whole_codepoint() {
    // U+00E9 ("é") encoded as two UTF-8 bytes; backspace must remove both
    // in one step rather than leaving a dangling continuation byte.
    let mut session = interactive_session(&[0xc3, 0xa9, 0x7f, b'\r']);
    assert_eq!(session.readline("> ").unwrap(), Some(String::new()));
    assert_eq!(session.get_point(), 0);
}

#[test]
fn non_tty_input_strips_leading_and_trailing_whitespace() {
    let mut session = pipe_session(b"  foo bar\n");
    assert_eq!(session.readline("> ").unwrap(), Some("foo bar".to_string()));
}

#[test]
fn non_tty_eof_with_no_content_returns_none() {
    let mut session = pipe_session(b"");
    assert_eq!(session.readline("> ").unwrap(), None);
}

#[test]
fn length_limit_rings_bell_and_stops_accepting_input() {
    let mut session = interactive_session(b"abcdef\r");
    session.limit_line_length(Some(5));
    assert_eq!(session.readline("> ").unwrap(), Some("abcd".to_string()));
}

#[test]
fn ctrl_c_commits_an_empty_line() {
    let mut session = interactive_session(b"abc\x03");
    assert_eq!(session.readline("> ").unwrap(), Some(String::new()));
}
