use nvgrid_redraw::{Style, Surface};
use std::collections::HashMap;
use std::io;

/// A call made on a [`RecordingSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    DefaultStyle(Style),
    Clear,
    SetCell { x: u16, y: u16, c: char, style: Style },
    ShowCursor { x: u16, y: u16 },
    Mouse(bool),
    Show,
}

/// Surface that records every call and keeps the resulting screen
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    screen: HashMap<(u16, u16), (char, Style)>,
    default_style: Style,
    /// Screen as of the last `show`
    shown: HashMap<(u16, u16), (char, Style)>,
    fail_writes: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every fallible call return an error
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn show_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Show))
            .count()
    }

    /// Cell last written at (x, y), if any since the last clear
    pub fn cell(&self, x: u16, y: u16) -> Option<(char, Style)> {
        self.screen.get(&(x, y)).copied()
    }

    /// Cell at (x, y) as of the last `show`
    pub fn shown_cell(&self, x: u16, y: u16) -> Option<(char, Style)> {
        self.shown.get(&(x, y)).copied()
    }

    /// Characters of row `y` over `width` columns as of the last `show`; unwritten cells
    /// read as spaces
    pub fn shown_line(&self, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| self.shown_cell(x, y).map(|(c, _)| c).unwrap_or(' '))
            .collect()
    }

    pub fn default_style(&self) -> Style {
        self.default_style
    }

    fn check(&self) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "surface closed"));
        }
        Ok(())
    }
}

impl Surface for RecordingSurface {
    fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
        self.ops.push(SurfaceOp::DefaultStyle(style));
    }

    fn clear(&mut self) -> io::Result<()> {
        self.check()?;
        self.screen.clear();
        self.ops.push(SurfaceOp::Clear);
        Ok(())
    }

    fn set_cell(&mut self, x: u16, y: u16, c: char, style: Style) -> io::Result<()> {
        self.check()?;
        self.screen.insert((x, y), (c, style));
        self.ops.push(SurfaceOp::SetCell { x, y, c, style });
        Ok(())
    }

    fn show_cursor(&mut self, x: u16, y: u16) {
        self.ops.push(SurfaceOp::ShowCursor { x, y });
    }

    fn set_mouse(&mut self, enabled: bool) -> io::Result<()> {
        self.check()?;
        self.ops.push(SurfaceOp::Mouse(enabled));
        Ok(())
    }

    fn show(&mut self) -> io::Result<()> {
        self.check()?;
        self.shown = self.screen.clone();
        self.ops.push(SurfaceOp::Show);
        Ok(())
    }
}
