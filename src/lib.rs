//! A minimal interactive line-editing library for character terminals.
//!
//! A caller builds a [`Session`] over an input and an output stream, then
//! calls [`Session::readline`] to get back one edited line at a time. While
//! the user types, the session interprets control sequences and
//! cursor-movement escapes, keeps an in-memory edit buffer, and repaints the
//! visible line incrementally so the screen always matches the buffer and
//! cursor position.
//!
//! ```no_run
//! use tinyline::Session;
//!
//! let mut session = Session::new(std::io::stdin(), std::io::stdout());
//! while let Some(line) = session.readline("> ")? {
//!     println!("you said: {line}");
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

mod buffer;
mod handlers;
mod keymap;
mod redisplay;
mod session;
mod terminal;
mod utf8;

pub use keymap::{Handler, SpecialKey};
pub use session::Session;
pub use terminal::{RawModeGuard, Terminal};
