//! Resolved cell styles
//!
//! A [`Style`] is what actually gets painted: two colours plus attribute flags.
//! It is computed once when a cell is written and stored by value in the grid.

/// Colour representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Inherit the terminal's own default colour
    #[default]
    Default,

    /// 24-bit RGB colour
    Rgb(u8, u8, u8),
}

impl Color {
    /// Build a colour from the engine's packed `0xRRGGBB` integer.
    ///
    /// Negative values are the engine's way of saying "no colour known" and map to
    /// [`Color::Default`].
    pub fn from_packed(value: i64) -> Self {
        if value < 0 {
            return Color::Default;
        }
        let rgb = (value & 0x00ff_ffff) as u32;
        Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

/// Text attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attributes {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub undercurl: bool,
    /// Swap foreground and background when painting. Applied by the surface, not here.
    pub reverse: bool,
}

/// Fully resolved style of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attributes,
}

impl Style {
    /// Style with the given colours and no attributes
    pub fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attributes::default(),
        }
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }
}
