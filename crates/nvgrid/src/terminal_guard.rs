//! RAII guard for terminal ownership while the UI is running

use anyhow::{Context, Result};
use crossterm::{cursor, event::DisableMouseCapture, execute, terminal};
use std::io;
use tracing::debug;

/// Holds the terminal in raw mode on the alternate screen.
/// Dropping the guard restores the terminal, including on error paths.
pub struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen: bool,
    // Marker to ensure this type is !Send and !Sync
    _marker: std::marker::PhantomData<*const ()>,
}

impl TerminalGuard {
    /// Switch to the alternate screen and enable raw mode
    pub fn acquire() -> Result<Self> {
        let mut guard = Self {
            raw_mode_enabled: false,
            alternate_screen: false,
            _marker: std::marker::PhantomData,
        };

        execute!(io::stdout(), terminal::EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        guard.alternate_screen = true;

        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        guard.raw_mode_enabled = true;

        debug!("Terminal acquired");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Always try to restore terminal state
        if self.alternate_screen {
            let _ = execute!(
                io::stdout(),
                DisableMouseCapture,
                cursor::Show,
                terminal::LeaveAlternateScreen
            );
        }
        if self.raw_mode_enabled {
            let _ = terminal::disable_raw_mode();
        }
        debug!("Terminal restored");
    }
}
