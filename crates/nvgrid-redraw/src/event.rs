//! Typed redraw events
//!
//! One [`RedrawEvent`] per `[kind, tuple, tuple, ...]` entry of a redraw batch. Each
//! recognised kind carries the decoded argument tuples in arrival order.

use crate::highlight::HighlightAttrs;
use rmpv::Value;

/// `option_set` tuple
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    pub name: String,
    pub value: Value,
}

/// `default_colors_set` tuple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultColors {
    pub rgb_fg: i64,
    pub rgb_bg: i64,
}

/// `hl_attr_define` tuple
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HlAttrDefine {
    pub id: u64,
    pub attrs: HighlightAttrs,
}

/// One `[text, hl_id, repeat]` entry of a `grid_line` cell run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellEntry {
    /// `None` keeps the character already on screen
    pub ch: Option<char>,
    /// Switches the run's active style when present
    pub hl_id: Option<u64>,
    pub repeat: Option<u32>,
}

/// `grid_line` tuple
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLine {
    pub grid: u64,
    pub row: u16,
    pub col_start: u16,
    pub cells: Vec<CellEntry>,
}

/// `grid_scroll` tuple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridScroll {
    pub grid: u64,
    pub top: u16,
    pub bottom: u16,
    pub left: u16,
    pub right: u16,
    pub rows: i64,
    /// Horizontal scroll amount. Accepted, never applied.
    pub cols: i64,
}

/// `grid_cursor_goto` tuple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorGoto {
    pub grid: u64,
    pub row: u16,
    pub col: u16,
}

/// A decoded redraw batch entry
#[derive(Debug, Clone, PartialEq)]
pub enum RedrawEvent {
    OptionSet(Vec<OptionSet>),
    DefaultColorsSet(Vec<DefaultColors>),
    HlAttrDefine(Vec<HlAttrDefine>),
    GridLine(Vec<GridLine>),
    GridScroll(Vec<GridScroll>),
    GridCursorGoto(Vec<CursorGoto>),
    GridClear,
    Flush,
    MouseOn,
    MouseOff,

    /// Known kind whose payload is deliberately discarded
    Ignored(&'static str),

    /// Kind with no registered schema
    Unknown { kind: String, args: Vec<Value> },
}

impl RedrawEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &str {
        match self {
            RedrawEvent::OptionSet(_) => "option_set",
            RedrawEvent::DefaultColorsSet(_) => "default_colors_set",
            RedrawEvent::HlAttrDefine(_) => "hl_attr_define",
            RedrawEvent::GridLine(_) => "grid_line",
            RedrawEvent::GridScroll(_) => "grid_scroll",
            RedrawEvent::GridCursorGoto(_) => "grid_cursor_goto",
            RedrawEvent::GridClear => "grid_clear",
            RedrawEvent::Flush => "flush",
            RedrawEvent::MouseOn => "mouse_on",
            RedrawEvent::MouseOff => "mouse_off",
            RedrawEvent::Ignored(kind) => *kind,
            RedrawEvent::Unknown { kind, .. } => kind.as_str(),
        }
    }
}
