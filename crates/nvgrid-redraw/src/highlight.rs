//! Highlight attribute table
//!
//! Maps the engine's small integer highlight IDs to attribute definitions and resolves
//! them into renderable [`Style`]s against the current default style.

use crate::style::{Color, Style};
use serde::Deserialize;
use std::collections::HashMap;

/// Highlight ID that always means "the default style"
pub const DEFAULT_HIGHLIGHT: u64 = 0;

/// RGB attribute set of one highlight definition
///
/// The engine omits keys whose value is the default, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightAttrs {
    pub foreground: Option<i64>,
    pub background: Option<i64>,
    /// Undercurl colour. Decoded but not rendered.
    pub special: Option<i64>,
    pub reverse: bool,
    pub italic: bool,
    pub bold: bool,
    pub underline: bool,
    pub undercurl: bool,
}

/// Overwrite-only table of highlight definitions
#[derive(Debug, Clone, Default)]
pub struct HighlightTable {
    defines: HashMap<u64, HighlightAttrs>,
}

impl HighlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the definition for `id`
    pub fn define(&mut self, id: u64, attrs: HighlightAttrs) {
        self.defines.insert(id, attrs);
    }

    /// Look up the stored definition for `id`
    pub fn get(&self, id: u64) -> Option<&HighlightAttrs> {
        self.defines.get(&id)
    }

    pub fn len(&self) -> usize {
        self.defines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Resolve `id` into a concrete style.
    ///
    /// ID 0 returns `default` unchanged. Any other ID starts from the default colours,
    /// applies the definition's colour overrides and then sets each flag that is `true`.
    /// An ID that was never defined resolves like an empty definition.
    pub fn resolve(&self, id: u64, default: Style) -> Style {
        if id == DEFAULT_HIGHLIGHT {
            return default;
        }

        let mut style = Style::new(default.fg, default.bg);
        let Some(attrs) = self.defines.get(&id) else {
            return style;
        };

        if let Some(fg) = attrs.foreground {
            style.fg = Color::from_packed(fg);
        }
        if let Some(bg) = attrs.background {
            style.bg = Color::from_packed(bg);
        }

        if attrs.reverse {
            style.attrs.reverse = true;
        }
        if attrs.italic {
            style.attrs.italic = true;
        }
        if attrs.bold {
            style.attrs.bold = true;
        }
        if attrs.underline {
            style.attrs.underline = true;
        }
        if attrs.undercurl {
            style.attrs.undercurl = true;
        }

        style
    }
}
