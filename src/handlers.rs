//! Default key handlers installed on every new session, and the binding
//! table that wires them up.

use std::io::Write;
use std::rc::Rc;

use crate::keymap::SpecialKey;
use crate::session::Session;
use crate::terminal::Terminal;
use crate::utf8::{char_decode, char_prev, grapheme_next, grapheme_prev};

fn insert<R: Terminal, W: Write>(session: &mut Session<R, W>, key: &[u8]) -> bool {
    if char_decode(key).is_none() {
        return false;
    }
    session.insert_text_len(key)
}

fn commit<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    session.done = true;
    true
}

fn interrupt<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let end = session.end();
    session.delete_text(0, end);
    session.done = true;
    true
}

fn backspace<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let point = session.get_point();
    if point == 0 {
        return false;
    }
    let prev = char_prev(session.current_line(), point);
    session.delete_text(prev, point)
}

fn delete_forward<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let point = session.get_point();
    let end = session.end();
    if point >= end {
        return false;
    }
    let next = grapheme_next(session.current_line(), point);
    session.delete_text(point, next)
}

fn clear_screen<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    session.clear_screen().is_ok()
}

fn erase_to_bol<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let point = session.get_point();
    if point == 0 {
        return false;
    }
    session.delete_text(0, point)
}

fn start_of_line<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    if session.get_point() == 0 {
        return false;
    }
    session.set_point(0);
    true
}

fn end_of_line<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let end = session.end();
    if session.get_point() == end {
        return false;
    }
    session.set_point(end);
    true
}

fn kill<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let point = session.get_point();
    let end = session.end();
    if point == end {
        return false;
    }
    session.kill_string = session.current_line()[point..end].as_bytes().to_vec();
    session.delete_text(point, end)
}

fn yank<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    if session.kill_string.is_empty() {
        return false;
    }
    let text = session.kill_string.clone();
    session.insert_text_len(&text)
}

/// Delete the word behind the cursor into the kill buffer: skip trailing
/// whitespace, then delete back to the previous whitespace run or the start
/// of the line, whichever comes first.
fn kill_word_before<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let line = session.current_line().to_string();
    let point = session.get_point();
    if point == 0 {
        return false;
    }
    let mut cursor = point;
    while cursor > 0 && line.as_bytes()[grapheme_prev(&line, cursor)].is_ascii_whitespace() {
        cursor = grapheme_prev(&line, cursor);
    }
    while cursor > 0 {
        let prev = grapheme_prev(&line, cursor);
        if line.as_bytes()[prev].is_ascii_whitespace() {
            break;
        }
        cursor = prev;
    }
    if cursor == point {
        return false;
    }
    session.kill_string = line[cursor..point].as_bytes().to_vec();
    session.delete_text(cursor, point)
}

fn left<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let point = session.get_point();
    if point == 0 {
        return false;
    }
    let prev = grapheme_prev(session.current_line(), point);
    session.set_point(prev);
    true
}

fn right<R: Terminal, W: Write>(session: &mut Session<R, W>, _key: &[u8]) -> bool {
    let point = session.get_point();
    let end = session.end();
    if point >= end {
        return false;
    }
    let next = grapheme_next(session.current_line(), point);
    session.set_point(next);
    true
}

fn noop<R: Terminal, W: Write>(_session: &mut Session<R, W>, _key: &[u8]) -> bool {
    true
}

pub(crate) fn install_default_bindings<R: Terminal, W: Write>(session: &mut Session<R, W>) {
    for byte in 32u16..=255 {
        session.bind_key(byte as u8, Rc::new(insert));
    }
    session.bind_key(b'\r', Rc::new(commit));
    session.bind_key(b'\n', Rc::new(commit));
    session.bind_key(0x03, Rc::new(interrupt)); // Ctrl-C
    session.bind_key(0x7f, Rc::new(backspace)); // BACKSPACE
    session.bind_key(0x08, Rc::new(backspace)); // Ctrl-H
    session.bind_key(0x04, Rc::new(delete_forward)); // Ctrl-D
    session.bind_key(0x0c, Rc::new(clear_screen)); // Ctrl-L
    session.bind_key(0x15, Rc::new(erase_to_bol)); // Ctrl-U
    session.bind_key(0x01, Rc::new(start_of_line)); // Ctrl-A
    session.bind_key(0x05, Rc::new(end_of_line)); // Ctrl-E
    session.bind_key(0x0b, Rc::new(kill)); // Ctrl-K
    session.bind_key(0x19, Rc::new(yank)); // Ctrl-Y
    session.bind_key(0x17, Rc::new(kill_word_before)); // Ctrl-W

    session.bind_special(SpecialKey::Left, Rc::new(left));
    session.bind_special(SpecialKey::Right, Rc::new(right));
    session.bind_special(SpecialKey::Home, Rc::new(start_of_line));
    session.bind_special(SpecialKey::End, Rc::new(end_of_line));
    session.bind_special(SpecialKey::Delete, Rc::new(delete_forward));
    session.bind_special(SpecialKey::Insert, Rc::new(noop));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session_with(input: &str) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        Session::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn kill_then_yank_restores_text() {
        let mut session = session_with("");
        session.insert_text("hello");
        session.set_point(0);
        assert!(kill(&mut session, b""));
        assert_eq!(session.get_line(), "");
        assert_eq!(session.kill_string, b"hello");
        assert!(yank(&mut session, b""));
        assert_eq!(session.get_line(), "hello");
    }

    #[test]
    fn kill_word_before_stops_at_whitespace() {
        let mut session = session_with("");
        session.insert_text("foo bar");
        assert!(kill_word_before(&mut session, b""));
        assert_eq!(session.get_line(), "foo ");
        assert_eq!(session.kill_string, b"bar");
    }

    #[test]
    fn backspace_at_start_of_line_fails() {
        let mut session = session_with("");
        assert!(!backspace(&mut session, b""));
    }
}
