//! Terminal output seam
//!
//! The dispatcher never talks to a terminal directly; it pushes cells through a
//! [`Surface`]. Nothing written through it is visible until [`Surface::show`].

use crate::style::Style;
use std::io;

/// Cell-addressed terminal output
pub trait Surface {
    /// Style used by the terminal for cells it clears itself
    fn set_default_style(&mut self, style: Style);

    /// Clear the whole terminal with the default style
    fn clear(&mut self) -> io::Result<()>;

    /// Write one cell at column `x`, row `y`
    fn set_cell(&mut self, x: u16, y: u16, c: char, style: Style) -> io::Result<()>;

    /// Place the cursor at column `x`, row `y` on the next [`Surface::show`]
    fn show_cursor(&mut self, x: u16, y: u16);

    /// Toggle mouse reporting
    fn set_mouse(&mut self, enabled: bool) -> io::Result<()>;

    /// Present everything written since the last call
    fn show(&mut self) -> io::Result<()>;
}
