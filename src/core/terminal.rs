//! Console terminal driver
//!
//! Raw mode handling, terminal size and key sequence reads for the login
//! screen. Raw mode is owned by a [`RawMode`] guard so that every exit path
//! (normal return, error, interrupt) restores the terminal.

use std::io::{self, Read, Write};

use crossterm::{cursor::Show, execute, style::ResetColor, terminal};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Failed to query terminal size: {0}")]
    Size(#[source] io::Error),

    #[error("Failed to switch terminal mode: {0}")]
    Mode(#[source] io::Error),

    #[error("Failed to read key: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to draw: {0}")]
    Draw(#[source] io::Error),

    #[error("Terminal input closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TerminalError>;

/// Terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermSize {
    pub rows: u16,
    pub cols: u16,
}

impl TermSize {
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// What the login loop needs from the terminal
pub trait Terminal {
    fn size(&self) -> Result<TermSize>;

    /// Block until one key sequence arrives
    fn read_key(&mut self) -> Result<Vec<u8>>;

    /// Switch back to the normal (cooked) mode
    fn enter_cooked(&mut self) -> Result<()>;

    /// Switch to raw mode
    fn enter_raw(&mut self) -> Result<()>;
}

/// Scoped raw mode. Dropping the guard restores the terminal state saved
/// when raw mode was first entered.
pub struct RawMode {
    active: bool,
}

impl RawMode {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn suspend(&mut self) -> io::Result<()> {
        if self.active {
            terminal::disable_raw_mode()?;
            self.active = false;
        }
        Ok(())
    }

    pub fn resume(&mut self) -> io::Result<()> {
        if !self.active {
            terminal::enable_raw_mode()?;
            self.active = true;
        }
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if self.active {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// The controlling console, read through stdin
pub struct ConsoleTerminal {
    raw: RawMode,
}

impl ConsoleTerminal {
    /// Query the terminal and enter raw mode. Fails before anything is
    /// drawn if the terminal is unusable.
    pub fn open() -> Result<Self> {
        terminal::size().map_err(TerminalError::Size)?;
        let raw = RawMode::enter().map_err(TerminalError::Mode)?;
        Ok(Self { raw })
    }
}

impl Terminal for ConsoleTerminal {
    fn size(&self) -> Result<TermSize> {
        let (cols, rows) = terminal::size().map_err(TerminalError::Size)?;
        Ok(TermSize::new(rows, cols))
    }

    fn read_key(&mut self) -> Result<Vec<u8>> {
        // In raw mode a single read returns one key press, escape
        // sequences included
        let mut buf = [0u8; 64];
        let n = io::stdin()
            .lock()
            .read(&mut buf)
            .map_err(TerminalError::Read)?;
        if n == 0 {
            return Err(TerminalError::Closed);
        }
        Ok(buf[..n].to_vec())
    }

    fn enter_cooked(&mut self) -> Result<()> {
        self.raw.suspend().map_err(TerminalError::Mode)
    }

    fn enter_raw(&mut self) -> Result<()> {
        self.raw.resume().map_err(TerminalError::Mode)
    }
}

impl Drop for ConsoleTerminal {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, Show);
        let _ = stdout.flush();
        // `raw` is dropped right after, leaving raw mode
        tracing::debug!(raw = self.raw.is_active(), "Releasing console");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TerminalError::Read(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        assert_eq!(err.to_string(), "Failed to read key: signal");
        assert_eq!(TerminalError::Closed.to_string(), "Terminal input closed");
    }

    #[test]
    fn test_term_size() {
        let size = TermSize::new(24, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 80);
    }
}
