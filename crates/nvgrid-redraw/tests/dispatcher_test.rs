//! Redraw batches applied end to end against a recording surface

use nvgrid_redraw::{Cell, Color, Dispatcher, RedrawError, Style};
use nvgrid_test_utils::fixtures::{
    cell, cursor_goto, default_colors, flush, grid_clear, grid_line, grid_scroll,
    hl_attr_define, text_line, update,
};
use nvgrid_test_utils::{RecordingSurface, SurfaceOp};
use pretty_assertions::assert_eq;
use rmpv::Value;

fn dispatcher(width: u16, height: u16) -> Dispatcher<RecordingSurface> {
    nvgrid_test_utils::init_test_logging();
    Dispatcher::new(RecordingSurface::new(), width, height)
}

fn white_on_black() -> Style {
    Style::new(Color::Rgb(255, 255, 255), Color::Rgb(0, 0, 0))
}

fn row_text(d: &Dispatcher<RecordingSurface>, y: u16) -> String {
    d.grid()
        .row(y)
        .expect("row in bounds")
        .iter()
        .map(|cell| cell.c)
        .collect()
}

#[test]
fn highlight_defined_before_line_is_used() {
    let mut d = dispatcher(10, 3);

    d.apply_batch(&[
        default_colors(0xffffff, 0x000000),
        hl_attr_define(
            3,
            vec![
                ("foreground", Value::from(0xff0000)),
                ("bold", Value::from(true)),
            ],
        ),
        grid_line(0, 0, vec![cell("A", Some(3), None)]),
    ])
    .expect("apply");

    let mut expected = Style::new(Color::Rgb(255, 0, 0), Color::Rgb(0, 0, 0));
    expected.attrs.bold = true;

    assert_eq!(d.grid().cell_at(0, 0), Some(&Cell::new('A', expected)));
    assert_eq!(d.surface().cell(0, 0), Some(('A', expected)));
}

#[test]
fn default_colors_after_define_still_apply_to_later_lines() {
    let mut d = dispatcher(10, 3);

    d.apply_batch(&[
        hl_attr_define(3, vec![("italic", Value::from(true))]),
        default_colors(0x102030, 0x405060),
        grid_line(0, 0, vec![cell("A", Some(3), None)]),
    ])
    .expect("apply");

    let mut expected = Style::new(Color::Rgb(0x10, 0x20, 0x30), Color::Rgb(0x40, 0x50, 0x60));
    expected.attrs.italic = true;
    assert_eq!(d.grid().cell_at(0, 0).map(|c| c.style), Some(expected));
}

#[test]
fn grid_clear_blanks_every_cell() {
    let mut d = dispatcher(8, 4);

    d.apply_batch(&[
        default_colors(0xffffff, 0x000000),
        text_line(0, 0, "hello", 0),
        text_line(3, 2, "world", 0),
        grid_clear(),
    ])
    .expect("apply");

    let blank = Cell::blank(white_on_black());
    for y in 0..4 {
        for x in 0..8 {
            assert_eq!(d.grid().cell_at(x, y), Some(&blank), "cell ({x}, {y})");
        }
    }
    assert!(d.surface().ops().contains(&SurfaceOp::Clear));
}

#[test]
fn repeated_cell_fills_consecutive_columns() {
    let mut d = dispatcher(10, 1);

    d.apply_batch(&[grid_line(0, 2, vec![cell("x", Some(0), Some(5))])])
        .expect("apply");

    assert_eq!(row_text(&d, 0), "  xxxxx   ");
    for x in 2..7 {
        assert_eq!(
            d.grid().cell_at(x, 0),
            Some(&Cell::new('x', d.default_style()))
        );
    }
}

#[test]
fn wide_character_placeholder_keeps_glyph_on_screen() {
    let mut d = dispatcher(4, 1);

    d.apply_batch(&[
        grid_line(
            0,
            0,
            vec![cell("中", Some(0), None), cell("", None, None)],
        ),
        flush(),
    ])
    .expect("apply");

    let cells: Vec<(u16, char)> = d
        .surface()
        .ops()
        .iter()
        .filter_map(|op| match op {
            SurfaceOp::SetCell { x, c, .. } => Some((*x, *c)),
            _ => None,
        })
        .collect();
    assert_eq!(cells, vec![(0, '中')]);
    assert_eq!(d.surface().shown_cell(1, 0), None);

    // The grid still records the placeholder's style
    assert_eq!(
        d.grid().cell_at(1, 0),
        Some(&Cell::new(' ', d.default_style()))
    );
}

#[test]
fn repeat_without_highlight_carries_previous_style() {
    let mut d = dispatcher(6, 1);

    d.apply_batch(&[
        hl_attr_define(3, vec![("bold", Value::from(true))]),
        grid_line(
            0,
            0,
            vec![cell("a", Some(3), None), cell("b", None, Some(3))],
        ),
    ])
    .expect("apply");

    assert_eq!(row_text(&d, 0), "abbb  ");
    for x in 0..4 {
        let cell = d.grid().cell_at(x, 0).expect("cell");
        assert!(cell.style.attrs.bold, "cell {x} is bold");
    }
    assert!(!d.grid().cell_at(4, 0).expect("cell").style.attrs.bold);
}

#[test]
fn scroll_up_copies_rows_without_clearing() {
    let mut d = dispatcher(80, 10);

    let lines: Vec<Value> = (0..10)
        .map(|row| text_line(row, 0, &format!("line {row}"), 0))
        .collect();
    d.apply_batch(&lines).expect("fill");
    let before: Vec<String> = (0..10).map(|y| row_text(&d, y)).collect();

    d.apply_batch(&[grid_scroll(0, 10, 0, 80, 3)]).expect("scroll");

    for y in 0..7 {
        assert_eq!(row_text(&d, y), before[y as usize + 3], "row {y}");
    }
    for y in 7..10 {
        assert_eq!(row_text(&d, y), before[y as usize], "row {y}");
    }
}

#[test]
fn scroll_emits_copied_rows_to_surface() {
    let mut d = dispatcher(4, 4);
    d.apply_batch(&[text_line(3, 0, "abcd", 0)]).expect("fill");
    d.surface_mut().take_ops();

    d.apply_batch(&[grid_scroll(0, 4, 1, 3, 1), flush()])
        .expect("scroll");

    // Rows 0..3 over columns 1..3
    let cells: Vec<(u16, u16, char)> = d
        .surface()
        .ops()
        .iter()
        .filter_map(|op| match op {
            SurfaceOp::SetCell { x, y, c, .. } => Some((*x, *y, *c)),
            _ => None,
        })
        .collect();
    assert_eq!(
        cells,
        vec![
            (1, 0, ' '),
            (2, 0, ' '),
            (1, 1, ' '),
            (2, 1, ' '),
            (1, 2, 'b'),
            (2, 2, 'c'),
        ]
    );
    assert_eq!(d.surface().shown_line(2, 4), " bc ");
}

#[test]
fn undefined_highlight_matches_default() {
    let mut d = dispatcher(4, 1);

    d.apply_batch(&[
        default_colors(0xeeeeee, 0x111111),
        grid_line(
            0,
            0,
            vec![cell("a", Some(42), None), cell("b", Some(0), None)],
        ),
    ])
    .expect("apply");

    let a = d.grid().cell_at(0, 0).expect("cell");
    let b = d.grid().cell_at(1, 0).expect("cell");
    assert_eq!(a.style, b.style);
    assert_eq!(a.style, d.default_style());
}

#[test]
fn last_write_wins() {
    let mut d = dispatcher(4, 2);

    d.apply_batch(&[
        hl_attr_define(1, vec![("underline", Value::from(true))]),
        text_line(1, 1, "a", 0),
        text_line(1, 1, "b", 1),
    ])
    .expect("apply");

    let cell = d.grid().cell_at(1, 1).expect("cell");
    assert_eq!(cell.c, 'b');
    assert!(cell.style.attrs.underline);
    assert_eq!(d.surface().cell(1, 1), Some(('b', cell.style)));
}

#[test]
fn unknown_kind_does_not_abort_batch() {
    let mut d = dispatcher(6, 2);

    d.apply_batch(&[
        text_line(0, 0, "before", 0),
        update(
            "win_viewport",
            vec![Value::Array(vec![Value::from(2), Value::from(1000)])],
        ),
        text_line(1, 0, "after", 0),
        flush(),
    ])
    .expect("apply");

    assert_eq!(row_text(&d, 0), "before");
    assert_eq!(row_text(&d, 1), "after ");
    assert_eq!(d.surface().show_count(), 1);
}

#[test]
fn malformed_entry_aborts_whole_batch() {
    let mut d = dispatcher(6, 2);

    let bad_line = update(
        "grid_line",
        vec![Value::Array(vec![
            Value::from(1),
            Value::from("zero"),
            Value::from(0),
            Value::Array(vec![]),
        ])],
    );

    let err = d
        .apply_batch(&[text_line(0, 0, "ok", 0), bad_line, flush()])
        .unwrap_err();

    assert!(matches!(err, RedrawError::Decode { kind: "grid_line", .. }));
    assert_eq!(row_text(&d, 0), "      ");
    assert!(d.surface().ops().is_empty());
}

#[test]
fn nothing_is_presented_before_flush() {
    let mut d = dispatcher(5, 1);

    d.apply_batch(&[text_line(0, 0, "hi", 0)]).expect("apply");
    assert_eq!(d.surface().show_count(), 0);
    assert_eq!(d.surface().shown_cell(0, 0), None);

    d.apply_batch(&[flush()]).expect("flush");
    assert_eq!(d.surface().show_count(), 1);
    assert_eq!(d.surface().shown_line(0, 5), "hi   ");
}

#[test]
fn cursor_mouse_and_options() {
    let mut d = dispatcher(5, 5);

    d.apply_batch(&[
        update(
            "option_set",
            vec![
                Value::Array(vec![Value::from("guifont"), Value::from("Mono:h12")]),
                Value::Array(vec![Value::from("linespace"), Value::from(0)]),
            ],
        ),
        cursor_goto(2, 3),
        update("mouse_on", vec![Value::Array(vec![])]),
        update("mouse_off", vec![Value::Array(vec![])]),
    ])
    .expect("apply");

    assert_eq!(d.option("guifont"), Some(&Value::from("Mono:h12")));
    assert_eq!(d.option("linespace"), Some(&Value::from(0)));
    assert_eq!(d.option("ambiwidth"), None);
    assert_eq!(d.cursor(), (2, 3));
    assert_eq!(
        d.surface().ops(),
        &[
            SurfaceOp::ShowCursor { x: 3, y: 2 },
            SurfaceOp::Mouse(true),
            SurfaceOp::Mouse(false),
        ]
    );
}

#[test]
fn default_colors_reach_surface() {
    let mut d = dispatcher(2, 2);

    d.apply_batch(&[default_colors(-1, -1), default_colors(0xffffff, 0x000000)])
        .expect("apply");

    assert_eq!(d.default_style(), white_on_black());
    assert_eq!(d.surface().default_style(), white_on_black());
}

#[test]
fn stale_updates_after_local_resize_are_clipped() {
    let mut d = dispatcher(10, 10);
    d.resize(4, 2);

    d.apply_batch(&[text_line(0, 2, "wxyz", 0), text_line(5, 0, "gone", 0)])
        .expect("apply");

    assert_eq!(d.grid().width(), 4);
    assert_eq!(d.grid().height(), 2);
    assert_eq!(row_text(&d, 0), "  wx");
    assert_eq!(row_text(&d, 1), "    ");

    // Region still sized for the old terminal
    d.apply_batch(&[grid_scroll(0, 10, 0, 10, -1)]).expect("scroll");
    assert_eq!(row_text(&d, 0), "  wx");
    assert_eq!(row_text(&d, 1), "  wx");
}

#[test]
fn surface_failure_is_reported() {
    let mut d = Dispatcher::new(RecordingSurface::failing(), 4, 1);

    let err = d
        .apply_batch(&[text_line(0, 0, "x", 0)])
        .unwrap_err();
    assert!(matches!(err, RedrawError::Io(_)));

    // The grid keeps the write even though the terminal did not
    assert_eq!(row_text(&d, 0), "x   ");
}
