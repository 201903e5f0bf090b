//! Crossterm-backed terminal surface

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    queue,
    style::{self, Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use nvgrid_redraw::{Color, Style, Surface};
use std::io::{self, Write};

/// Initial size of the frame buffer, enough for a full redraw of a typical terminal
const FRAME_CAPACITY: usize = 64 * 1024;

/// Renders cells as crossterm commands collected into a frame; nothing reaches `W` until
/// [`Surface::show`] writes the whole frame and flushes
pub struct CrosstermSurface<W: Write> {
    out: W,

    /// Commands queued since the last show
    frame: Vec<u8>,

    /// Style used when clearing the terminal
    default_style: Style,

    /// Style last sent to the terminal
    pen: Option<Style>,

    /// Where the terminal cursor sits after the last printed cell, when known
    pen_pos: Option<(u16, u16)>,

    /// Cursor position shown on the next flush
    cursor: (u16, u16),
}

impl<W: Write> CrosstermSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: Vec::with_capacity(FRAME_CAPACITY),
            default_style: Style::default(),
            pen: None,
            pen_pos: None,
            cursor: (0, 0),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Switch the terminal pen to `style` unless it is already set
    fn set_pen(&mut self, style: Style) -> io::Result<()> {
        if self.pen == Some(style) {
            return Ok(());
        }

        queue!(
            self.frame,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(to_crossterm(style.fg)),
            SetBackgroundColor(to_crossterm(style.bg)),
        )?;

        let attrs = style.attrs;
        if attrs.bold {
            queue!(self.frame, SetAttribute(Attribute::Bold))?;
        }
        if attrs.italic {
            queue!(self.frame, SetAttribute(Attribute::Italic))?;
        }
        if attrs.underline {
            queue!(self.frame, SetAttribute(Attribute::Underlined))?;
        }
        if attrs.undercurl {
            queue!(self.frame, SetAttribute(Attribute::Undercurled))?;
        }
        if attrs.reverse {
            queue!(self.frame, SetAttribute(Attribute::Reverse))?;
        }

        self.pen = Some(style);
        Ok(())
    }
}

fn to_crossterm(color: Color) -> style::Color {
    match color {
        Color::Default => style::Color::Reset,
        Color::Rgb(r, g, b) => style::Color::Rgb { r, g, b },
    }
}

impl<W: Write> Surface for CrosstermSurface<W> {
    fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
    }

    fn clear(&mut self) -> io::Result<()> {
        // Terminals clear with the current background
        self.set_pen(self.default_style)?;
        self.pen_pos = None;
        queue!(self.frame, Clear(ClearType::All))
    }

    fn set_cell(&mut self, x: u16, y: u16, c: char, style: Style) -> io::Result<()> {
        if self.pen_pos != Some((x, y)) {
            queue!(self.frame, cursor::MoveTo(x, y))?;
        }
        self.set_pen(style)?;
        queue!(self.frame, Print(c))?;

        // Only ASCII is known to advance exactly one column
        self.pen_pos = if c.is_ascii() && !c.is_ascii_control() {
            x.checked_add(1).map(|next| (next, y))
        } else {
            None
        };
        Ok(())
    }

    fn show_cursor(&mut self, x: u16, y: u16) {
        self.cursor = (x, y);
    }

    fn set_mouse(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            queue!(self.frame, EnableMouseCapture)
        } else {
            queue!(self.frame, DisableMouseCapture)
        }
    }

    fn show(&mut self) -> io::Result<()> {
        let (x, y) = self.cursor;
        queue!(self.frame, cursor::MoveTo(x, y), cursor::Show)?;
        self.pen_pos = Some((x, y));

        let result = self
            .out
            .write_all(&self.frame)
            .and_then(|()| self.out.flush());
        self.frame.clear();
        result
    }
}
