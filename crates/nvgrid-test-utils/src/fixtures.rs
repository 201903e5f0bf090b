//! Builders for raw `redraw` payloads as the engine sends them

use rmpv::Value;

/// One batch entry: `[kind, tuple, tuple, ...]`
pub fn update(kind: &str, tuples: Vec<Value>) -> Value {
    let mut entry = vec![Value::from(kind)];
    entry.extend(tuples);
    Value::Array(entry)
}

/// Entry for a kind that carries a single empty tuple
pub fn bare(kind: &str) -> Value {
    update(kind, vec![Value::Array(vec![])])
}

pub fn flush() -> Value {
    bare("flush")
}

pub fn grid_clear() -> Value {
    update("grid_clear", vec![Value::Array(vec![Value::from(1)])])
}

pub fn default_colors(fg: i64, bg: i64) -> Value {
    update(
        "default_colors_set",
        vec![Value::Array(vec![
            Value::from(fg),
            Value::from(bg),
            Value::from(fg),
            Value::from(0),
            Value::from(0),
        ])],
    )
}

/// `hl_attr_define` with the given rgb attribute map entries
pub fn hl_attr_define(id: u64, attrs: Vec<(&str, Value)>) -> Value {
    let attrs = attrs
        .into_iter()
        .map(|(key, value)| (Value::from(key), value))
        .collect();
    update(
        "hl_attr_define",
        vec![Value::Array(vec![
            Value::from(id),
            Value::Map(attrs),
            Value::Map(vec![]),
            Value::Array(vec![]),
        ])],
    )
}

/// A `grid_line` cell entry; trailing `None`s are left off the wire like the engine does.
/// A repeat without a highlight ID sends nil in the ID slot, so the previous cell's
/// highlight carries over.
pub fn cell(text: &str, hl_id: Option<u64>, repeat: Option<u32>) -> Value {
    let mut entry = vec![Value::from(text)];
    match (hl_id, repeat) {
        (Some(id), Some(repeat)) => {
            entry.push(Value::from(id));
            entry.push(Value::from(repeat));
        }
        (Some(id), None) => entry.push(Value::from(id)),
        (None, Some(repeat)) => {
            entry.push(Value::Nil);
            entry.push(Value::from(repeat));
        }
        (None, None) => {}
    }
    Value::Array(entry)
}

pub fn grid_line(row: u16, col_start: u16, cells: Vec<Value>) -> Value {
    update(
        "grid_line",
        vec![Value::Array(vec![
            Value::from(1),
            Value::from(row),
            Value::from(col_start),
            Value::Array(cells),
        ])],
    )
}

/// `grid_line` writing `text` with one highlight for the whole run
pub fn text_line(row: u16, col_start: u16, text: &str, hl_id: u64) -> Value {
    let mut cells = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let hl = if i == 0 { Some(hl_id) } else { None };
        cells.push(cell(&c.to_string(), hl, None));
    }
    grid_line(row, col_start, cells)
}

pub fn grid_scroll(top: u16, bottom: u16, left: u16, right: u16, rows: i64) -> Value {
    update(
        "grid_scroll",
        vec![Value::Array(vec![
            Value::from(1),
            Value::from(top),
            Value::from(bottom),
            Value::from(left),
            Value::from(right),
            Value::from(rows),
            Value::from(0),
        ])],
    )
}

pub fn cursor_goto(row: u16, col: u16) -> Value {
    update(
        "grid_cursor_goto",
        vec![Value::Array(vec![
            Value::from(1),
            Value::from(row),
            Value::from(col),
        ])],
    )
}

