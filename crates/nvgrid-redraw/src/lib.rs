//! Redraw protocol core for nvgrid
//!
//! Decodes the editor engine's `redraw` notification batches into typed events and
//! replays them against an in-memory character grid and highlight table, pushing the
//! resulting cells to a terminal [`Surface`].

pub mod decoder;
pub mod dispatcher;
pub mod event;
pub mod grid;
pub mod highlight;
pub mod style;
pub mod surface;

pub use decoder::{decode_batch, decode_update};
pub use dispatcher::Dispatcher;
pub use event::{
    CellEntry, CursorGoto, DefaultColors, GridLine, GridScroll, HlAttrDefine, OptionSet,
    RedrawEvent,
};
pub use grid::{Cell, Grid, WrittenRun};
pub use highlight::{HighlightAttrs, HighlightTable};
pub use style::{Attributes, Color, Style};
pub use surface::Surface;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedrawError {
    #[error("Malformed redraw payload: {0}")]
    Malformed(String),

    #[error("Failed to decode field `{field}` of `{kind}`: {source}")]
    Decode {
        kind: &'static str,
        field: &'static str,
        #[source]
        source: rmpv::ext::Error,
    },

    #[error("Surface error: {0}")]
    Io(#[from] std::io::Error),
}
