//! Redraw dispatcher
//!
//! Owns the grid, highlight table and default style, and applies decoded redraw events
//! to them strictly in arrival order. Cells are pushed to the [`Surface`] as they change;
//! only a `flush` event presents them.

use crate::{
    decoder::decode_batch,
    event::RedrawEvent,
    grid::Grid,
    highlight::HighlightTable,
    style::{Color, Style},
    surface::Surface,
    RedrawError,
};
use rmpv::Value;
use std::collections::HashMap;
use std::io;
use tracing::{debug, info, trace};

/// Applies redraw batches to the grid and surface
pub struct Dispatcher<S> {
    /// Terminal output
    surface: S,

    /// Screen mirror
    grid: Grid,

    /// Highlight definitions by ID
    highlights: HighlightTable,

    /// Current default colours
    default_style: Style,

    /// Values received through `option_set`
    options: HashMap<String, Value>,

    /// Last cursor position as (row, col)
    cursor: (u16, u16),
}

impl<S: Surface> Dispatcher<S> {
    /// Create a dispatcher with a blank grid of the given size
    pub fn new(surface: S, width: u16, height: u16) -> Self {
        Self {
            surface,
            grid: Grid::new(width, height),
            highlights: HighlightTable::new(),
            default_style: Style::default(),
            options: HashMap::new(),
            cursor: (0, 0),
        }
    }

    /// Decode and apply one redraw notification.
    ///
    /// The whole batch is decoded before anything is applied, so a malformed entry
    /// leaves the grid untouched.
    pub fn apply_batch(&mut self, updates: &[Value]) -> Result<(), RedrawError> {
        let events = decode_batch(updates)?;
        debug!("Applying redraw batch of {} events", events.len());

        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Apply a single decoded event
    pub fn apply(&mut self, event: RedrawEvent) -> Result<(), RedrawError> {
        match event {
            RedrawEvent::OptionSet(options) => {
                for option in options {
                    trace!("option_set {} = {}", option.name, option.value);
                    self.options.insert(option.name, option.value);
                }
            }

            RedrawEvent::DefaultColorsSet(colors) => {
                if let Some(colors) = colors.last() {
                    self.default_style = Style::new(
                        Color::from_packed(colors.rgb_fg),
                        Color::from_packed(colors.rgb_bg),
                    );
                    self.surface.set_default_style(self.default_style);
                }
            }

            RedrawEvent::HlAttrDefine(defines) => {
                for define in defines {
                    self.highlights.define(define.id, define.attrs);
                }
            }

            RedrawEvent::GridLine(lines) => {
                for line in lines {
                    let written = self.grid.write_run(
                        line.row,
                        line.col_start,
                        &line.cells,
                        &self.highlights,
                        self.default_style,
                    );
                    // Placeholders after wide characters keep what is on screen
                    self.emit(line.row, written.drawn())?;
                }
            }

            RedrawEvent::GridScroll(scrolls) => {
                for scroll in scrolls {
                    if scroll.cols != 0 {
                        debug!("Ignoring horizontal scroll of {} columns", scroll.cols);
                    }

                    let rows = self.grid.scroll(
                        scroll.top,
                        scroll.bottom,
                        scroll.left,
                        scroll.right,
                        scroll.rows,
                    );
                    let cols = scroll.left..scroll.right.min(self.grid.width());
                    for y in rows {
                        self.emit(y, cols.clone())?;
                    }
                }
            }

            RedrawEvent::GridCursorGoto(gotos) => {
                if let Some(goto) = gotos.first() {
                    self.cursor = (goto.row, goto.col);
                    self.surface.show_cursor(goto.col, goto.row);
                }
            }

            RedrawEvent::GridClear => {
                self.grid.clear(self.default_style);
                self.surface.clear()?;
            }

            RedrawEvent::Flush => self.surface.show()?,

            RedrawEvent::MouseOn => self.surface.set_mouse(true)?,

            RedrawEvent::MouseOff => self.surface.set_mouse(false)?,

            RedrawEvent::Ignored(kind) => trace!("Ignoring {}", kind),

            RedrawEvent::Unknown { kind, args } => {
                info!("{} {:?}", kind.to_uppercase(), args);
            }
        }

        Ok(())
    }

    /// Match the grid to a new terminal size. Contents are discarded until the engine
    /// redraws.
    pub fn resize(&mut self, width: u16, height: u16) {
        debug!("Resizing grid to {}x{}", width, height);
        self.grid.resize(width, height, self.default_style);
    }

    /// Push the cells of row `y` in `cols` to the surface
    fn emit(&mut self, y: u16, cols: impl IntoIterator<Item = u16>) -> io::Result<()> {
        let Some(row) = self.grid.row(y) else {
            return Ok(());
        };

        for x in cols {
            if let Some(cell) = row.get(x as usize) {
                self.surface.set_cell(x, y, cell.c, cell.style)?;
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn highlights(&self) -> &HighlightTable {
        &self.highlights
    }

    pub fn default_style(&self) -> Style {
        self.default_style
    }

    /// Value of an option received through `option_set`
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Last cursor position as (row, col)
    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
