//! The key-dispatch trie: a prefix tree from raw input bytes to bound
//! handlers, with longest-match resolution for multi-byte escape sequences.

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::session::Session;
use crate::terminal::Terminal;

/// A bound key handler. Closures are the idiomatic stand-in for the
/// original's `(context, key) -> bool` function-pointer-plus-void-star pair:
/// whatever context a handler needs, it captures.
pub type Handler<R, W> = Rc<dyn Fn(&mut Session<R, W>, &[u8]) -> bool>;

/// Symbolic escape sequences recognized by [`Session::bind_special`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
}

impl SpecialKey {
    pub(crate) fn sequence(self) -> &'static [u8] {
        match self {
            SpecialKey::Up => b"\x1b[A",
            SpecialKey::Down => b"\x1b[B",
            SpecialKey::Left => b"\x1b[D",
            SpecialKey::Right => b"\x1b[C",
            SpecialKey::Home => b"\x1bOH",
            SpecialKey::End => b"\x1bOF",
            SpecialKey::Insert => b"\x1b[2~",
            SpecialKey::Delete => b"\x1b[3~",
        }
    }
}

pub(crate) struct KeymapNode<R, W> {
    children: HashMap<u8, Box<KeymapNode<R, W>>>,
    handler: Option<Handler<R, W>>,
}

impl<R, W> KeymapNode<R, W> {
    pub(crate) fn new() -> Self {
        KeymapNode {
            children: HashMap::new(),
            handler: None,
        }
    }

    /// Bind `handler` at the node reached after consuming all of `bytes`,
    /// creating intermediate nodes as needed. A single-byte slice is exactly
    /// `bind_key`; anything longer binds an escape sequence.
    pub(crate) fn bind_sequence(&mut self, bytes: &[u8], handler: Handler<R, W>) {
        let mut node = self;
        for &b in bytes {
            node = node
                .children
                .entry(b)
                .or_insert_with(|| Box::new(KeymapNode::new()));
        }
        node.handler = Some(handler);
    }
}

/// Walk `path` from `root`, returning the node reached, or `None` if `path`
/// diverges from every bound sequence. Re-walking from the root each time
/// (rather than retaining a node reference across the caller's non-blocking
/// read) keeps the borrow of the keymap strictly scoped to this call —
/// escape sequences are at most 4 bytes deep, so the repeated descent costs
/// nothing worth avoiding.
fn walk<'a, R, W>(root: &'a KeymapNode<R, W>, path: &[u8]) -> Option<&'a KeymapNode<R, W>> {
    let mut node = root;
    for b in path {
        node = node.children.get(b)?;
    }
    Some(node)
}

impl<R: Terminal, W: Write> Session<R, W> {
    /// Bind a single byte at the root of the trie.
    pub fn bind_key(&mut self, byte: u8, handler: Handler<R, W>) {
        self.keymap.bind_sequence(&[byte], handler);
    }

    /// Bind one of the predefined escape sequences.
    pub fn bind_special(&mut self, key: SpecialKey, handler: Handler<R, W>) {
        self.keymap.bind_sequence(key.sequence(), handler);
    }

    /// Resolve and run the handler for `key`, a codepoint already fully
    /// assembled by the UTF-8 accumulator in the read loop.
    ///
    /// A lone `ESC` (0x1b) is the one case where `key` isn't a complete
    /// unit on its own: escape sequences are resolved here by pulling
    /// further bytes from `istream` via non-blocking probes, for as long as
    /// the trie says a bound sequence might still be coming. Any other key
    /// — an ordinary control byte or a multi-byte UTF-8 printable character
    /// — is handed to its matching handler whole; the trie is only
    /// consulted at its lead byte, since no multi-byte UTF-8 codepoint is
    /// ever itself a bound escape-sequence prefix.
    pub(crate) fn dispatch(&mut self, key: Vec<u8>) -> std::io::Result<()> {
        if key.first() == Some(&0x1b) {
            self.dispatch_escape(key)
        } else {
            let handler = walk(&self.keymap, &key[..1]).and_then(|n| n.handler.clone());
            match handler {
                Some(h) => {
                    if !h(self, &key) {
                        self.ding()?;
                    }
                }
                None => self.ding()?,
            }
            Ok(())
        }
    }

    fn dispatch_escape(&mut self, mut path: Vec<u8>) -> std::io::Result<()> {
        loop {
            let has_more_children = match walk(&self.keymap, &path) {
                Some(node) => !node.children.is_empty(),
                None => false,
            };
            if !has_more_children {
                break;
            }
            match self.istream.probe_byte()? {
                Some(b) => path.push(b),
                None => break,
            }
        }

        let mut best: Option<(Handler<R, W>, usize)> = None;
        for len in 1..=path.len() {
            if let Some(node) = walk(&self.keymap, &path[..len]) {
                if let Some(h) = &node.handler {
                    best = Some((h.clone(), len));
                }
            }
        }

        match best {
            Some((handler, consumed)) => {
                let key_bytes = path[..consumed].to_vec();
                if !handler(self, &key_bytes) {
                    self.ding()?;
                }
            }
            None => self.ding()?,
        }
        Ok(())
    }
}
