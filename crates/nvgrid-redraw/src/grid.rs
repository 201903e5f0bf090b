//! Grid model
//!
//! Row-major buffer of [`Cell`]s mirroring the engine's screen. The buffer length always
//! equals `width * height`; resizing or clearing reallocates it with blank cells.

use crate::event::CellEntry;
use crate::highlight::HighlightTable;
use crate::style::Style;
use std::ops::Range;
use tracing::trace;

/// Character stored in a cleared cell
pub const BLANK: char = ' ';

/// A single cell in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character in this cell
    pub c: char,

    /// Style resolved when the cell was written
    pub style: Style,
}

impl Cell {
    pub fn new(c: char, style: Style) -> Self {
        Self { c, style }
    }

    /// Blank cell painted with `style`
    pub fn blank(style: Style) -> Self {
        Self { c: BLANK, style }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Style::default())
    }
}

/// Columns touched by one [`Grid::write_run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenRun {
    /// Every column that was written
    pub cols: Range<u16>,

    /// Columns whose entry carried no character; only their style changed
    pub kept: Vec<u16>,
}

impl WrittenRun {
    /// Columns that received a new character
    pub fn drawn(&self) -> impl Iterator<Item = u16> + '_ {
        self.cols.clone().filter(move |x| !self.kept.contains(x))
    }
}

/// In-memory copy of the engine's screen
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in columns
    width: u16,

    /// Height in rows
    height: u16,

    /// Cells in row-major order
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a blank grid painted with the default style
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: blank_cells(width, height, Style::default()),
        }
    }

    /// Get grid width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get grid height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get cell at position
    pub fn cell_at(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.cells.get(self.index(x, y))
    }

    /// Get one row of cells
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }

        let start = self.index(0, y);
        Some(&self.cells[start..start + self.width as usize])
    }

    /// Get all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Reset every cell to a blank painted with `style`
    pub fn clear(&mut self, style: Style) {
        self.cells = blank_cells(self.width, self.height, style);
    }

    /// Reallocate to the new dimensions; previous contents are discarded
    pub fn resize(&mut self, width: u16, height: u16, style: Style) {
        self.width = width;
        self.height = height;
        self.clear(style);
    }

    /// Write a `grid_line` cell run starting at (`col_start`, `row`).
    ///
    /// The active style starts as `default` and changes whenever an entry carries a
    /// highlight ID. Each entry is written `repeat` times (default 1). An entry without a
    /// character keeps the stored character and only takes the new style. Cells past the
    /// right edge are dropped.
    ///
    /// Returns the columns that were written, noting the ones that kept their character.
    pub fn write_run(
        &mut self,
        row: u16,
        col_start: u16,
        entries: &[CellEntry],
        highlights: &HighlightTable,
        default: Style,
    ) -> WrittenRun {
        if row >= self.height || col_start >= self.width {
            trace!("Dropping cell run at row {} col {}", row, col_start);
            return WrittenRun {
                cols: col_start..col_start,
                kept: Vec::new(),
            };
        }

        let mut style = default;
        let mut x = col_start;
        let mut kept = Vec::new();

        'entries: for entry in entries {
            if let Some(id) = entry.hl_id {
                style = highlights.resolve(id, default);
            }

            for _ in 0..entry.repeat.unwrap_or(1) {
                if x >= self.width {
                    trace!("Clipping cell run at row {} col {}", row, x);
                    break 'entries;
                }

                let index = self.index(x, row);
                let cell = &mut self.cells[index];
                match entry.ch {
                    Some(c) => cell.c = c,
                    None => kept.push(x),
                }
                cell.style = style;
                x += 1;
            }
        }

        WrittenRun {
            cols: col_start..x,
            kept,
        }
    }

    /// Shift the region `[top, bottom) x [left, right)` vertically by `rows`.
    ///
    /// Positive `rows` moves content up, negative moves it down. Rows uncovered by the
    /// shift keep their previous contents. The rectangle is clipped to the grid.
    ///
    /// Returns the range of rows that received copied content.
    pub fn scroll(
        &mut self,
        top: u16,
        bottom: u16,
        left: u16,
        right: u16,
        rows: i64,
    ) -> Range<u16> {
        let bottom = bottom.min(self.height) as usize;
        let right = right.min(self.width) as usize;
        let (top, left) = (top as usize, left as usize);

        if rows == 0 || top >= bottom || left >= right {
            return 0..0;
        }

        let distance = rows.unsigned_abs().min(bottom as u64) as usize;
        if top + distance >= bottom {
            return 0..0;
        }

        let len = right - left;
        let width = self.width as usize;

        let dest_rows = if rows > 0 {
            // Ascending so every source row is read before it is overwritten
            for dest in top..bottom - distance {
                let src = (dest + distance) * width + left;
                self.cells.copy_within(src..src + len, dest * width + left);
            }
            top..bottom - distance
        } else {
            for dest in (top + distance..bottom).rev() {
                let src = (dest - distance) * width + left;
                self.cells.copy_within(src..src + len, dest * width + left);
            }
            top + distance..bottom
        };

        dest_rows.start as u16..dest_rows.end as u16
    }

    fn index(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

fn blank_cells(width: u16, height: u16, style: Style) -> Vec<Cell> {
    vec![Cell::blank(style); (width as usize) * (height as usize)]
}
