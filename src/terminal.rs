//! The boundary between the editing engine and an actual character device.
//!
//! [`Terminal`] is deliberately narrow: it only covers the two things the
//! read loop needs that a plain `Read` can't give it — "is this byte source
//! really a tty" and "give me one more byte if one is already waiting, but
//! never block for it." Concrete impls are provided for `std::io::Stdin`
//! (a real terminal, unix only — see DESIGN.md for why this crate targets
//! unix) and for `std::io::Cursor<Vec<u8>>` (an in-memory stream, used both
//! by non-interactive callers and by this crate's own tests to drive the
//! interactive dispatch path without a real pty).

use std::io::{self, Cursor, Read};

/// RAII handle restoring whatever terminal state [`Terminal::enter_raw_mode`]
/// changed, on drop, on every exit path including panics unwinding through
/// the read loop.
pub enum RawModeGuard {
    #[cfg(unix)]
    Unix {
        fd: std::os::fd::RawFd,
        original: nix::sys::termios::Termios,
    },
    Inert,
}

#[cfg(unix)]
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let RawModeGuard::Unix { fd, original } = self {
            let _ = nix::sys::termios::tcsetattr(*fd, nix::sys::termios::SetArg::TCSAFLUSH, original);
        }
    }
}

pub trait Terminal: Read {
    /// True iff this stream is connected to a real interactive terminal.
    /// Queried once, at session construction.
    fn is_tty(&self) -> bool;

    /// Put the device into raw mode (no echo, no line buffering, one byte
    /// minimum per read) for the duration of the returned guard. Streams
    /// that aren't a real terminal return an inert guard that restores
    /// nothing.
    fn enter_raw_mode(&mut self) -> io::Result<RawModeGuard>;

    /// Try to read one more byte without blocking. `Ok(None)` means "nothing
    /// available right now" (which this crate treats the same as "nothing
    /// available ever" for the purposes of resolving an escape sequence —
    /// see the keymap dispatch contract).
    fn probe_byte(&mut self) -> io::Result<Option<u8>>;
}

#[cfg(unix)]
mod unix_stdin {
    use super::*;
    use nix::fcntl::{fcntl, FcntlArg, OFlag};
    use nix::sys::termios::{tcgetattr, tcsetattr, InputFlags, LocalFlags, OutputFlags, SetArg};
    use std::os::fd::AsRawFd;

    fn to_io_err(e: nix::Error) -> io::Error {
        io::Error::from_raw_os_error(e as i32)
    }

    impl Terminal for std::io::Stdin {
        fn is_tty(&self) -> bool {
            nix::unistd::isatty(self.as_raw_fd()).unwrap_or(false)
        }

        fn enter_raw_mode(&mut self) -> io::Result<RawModeGuard> {
            let fd = self.as_raw_fd();
            let original = tcgetattr(fd).map_err(to_io_err)?;
            let mut raw = original.clone();
            raw.input_flags = InputFlags::empty();
            raw.output_flags = OutputFlags::OPOST | OutputFlags::ONLCR;
            raw.local_flags = LocalFlags::empty();
            raw.control_chars[nix::libc::VMIN] = 1;
            raw.control_chars[nix::libc::VTIME] = 0;
            tcsetattr(fd, SetArg::TCSAFLUSH, &raw).map_err(to_io_err)?;
            Ok(RawModeGuard::Unix { fd, original })
        }

        fn probe_byte(&mut self) -> io::Result<Option<u8>> {
            let fd = self.as_raw_fd();
            let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(to_io_err)?;
            let oflags = OFlag::from_bits_truncate(flags);
            fcntl(fd, FcntlArg::F_SETFL(oflags | OFlag::O_NONBLOCK)).map_err(to_io_err)?;

            let mut buf = [0u8; 1];
            let result = Read::read(self, &mut buf);

            let _ = fcntl(fd, FcntlArg::F_SETFL(oflags));

            match result {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
                Err(e) => Err(e),
            }
        }
    }
}

/// An in-memory stream never blocks, so "probe" and "read" coincide; it is
/// also never a real terminal. Used for non-interactive `readline` callers
/// and to drive the interactive path in tests without a pty.
impl Terminal for Cursor<Vec<u8>> {
    fn is_tty(&self) -> bool {
        false
    }

    fn enter_raw_mode(&mut self) -> io::Result<RawModeGuard> {
        Ok(RawModeGuard::Inert)
    }

    fn probe_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match Read::read(self, &mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

#[cfg(not(unix))]
impl Drop for RawModeGuard {
    fn drop(&mut self) {}
}
