//! Property tests for the grid model

use nvgrid_redraw::{CellEntry, Color, Grid, HighlightAttrs, HighlightTable, Style};
use proptest::prelude::*;
use std::collections::HashMap;

const WIDTH: u16 = 12;
const HEIGHT: u16 = 6;

fn highlights() -> HighlightTable {
    let mut table = HighlightTable::new();
    table.define(
        1,
        HighlightAttrs {
            foreground: Some(0xff0000),
            ..Default::default()
        },
    );
    table.define(
        2,
        HighlightAttrs {
            bold: true,
            reverse: true,
            ..Default::default()
        },
    );
    table
}

fn default_style() -> Style {
    Style::new(Color::Rgb(200, 200, 200), Color::Rgb(10, 10, 10))
}

/// (row, col, char, highlight id)
fn write() -> impl Strategy<Value = (u16, u16, char, u64)> {
    (
        0..HEIGHT,
        0..WIDTH,
        prop::char::range('a', 'z'),
        0u64..4,
    )
}

proptest! {
    #[test]
    fn last_write_wins(writes in prop::collection::vec(write(), 1..64)) {
        let table = highlights();
        let mut grid = Grid::new(WIDTH, HEIGHT);
        let mut expected = HashMap::new();

        for (row, col, c, hl_id) in writes {
            let entry = CellEntry { ch: Some(c), hl_id: Some(hl_id), repeat: None };
            grid.write_run(row, col, &[entry], &table, default_style());
            expected.insert((col, row), (c, table.resolve(hl_id, default_style())));
        }

        for ((x, y), (c, style)) in expected {
            let cell = grid.cell_at(x, y).expect("in bounds");
            prop_assert_eq!(cell.c, c);
            prop_assert_eq!(cell.style, style);
        }
    }

    #[test]
    fn scroll_moves_region_and_leaves_rest(
        fill in prop::collection::vec(prop::char::range('a', 'z'), (WIDTH * HEIGHT) as usize),
        top in 0..HEIGHT,
        span in 1..=HEIGHT,
        left in 0..WIDTH,
        width in 1..=WIDTH,
        rows in -4i64..=4,
    ) {
        let bottom = (top + span).min(HEIGHT);
        let right = (left + width).min(WIDTH);
        let table = HighlightTable::new();

        let mut grid = Grid::new(WIDTH, HEIGHT);
        for y in 0..HEIGHT {
            let start = (y * WIDTH) as usize;
            let entries: Vec<CellEntry> = fill[start..start + WIDTH as usize]
                .iter()
                .map(|c| CellEntry { ch: Some(*c), hl_id: None, repeat: None })
                .collect();
            grid.write_run(y, 0, &entries, &table, Style::default());
        }
        let before = grid.clone();

        let dest = grid.scroll(top, bottom, left, right, rows);

        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let now = grid.cell_at(x, y).expect("in bounds");
                let inside = dest.contains(&y) && x >= left && x < right;
                let source_row = (y as i64 + rows) as u16;
                let want = if inside {
                    before.cell_at(x, source_row).expect("source in bounds")
                } else {
                    before.cell_at(x, y).expect("in bounds")
                };
                prop_assert_eq!(now, want, "cell ({}, {})", x, y);
            }
        }
    }
}
