//! Redraw batch decoder
//!
//! A redraw notification carries a list of updates shaped `[kind, tuple, tuple, ...]`.
//! Every recognised kind has a positional schema registered in [`DECODERS`]; its tuples
//! are decoded field by field. Tuples shorter than the schema leave the missing trailing
//! fields at their default value, fields beyond the schema are ignored, and a field of
//! the wrong type fails the whole batch.

use crate::event::{
    CellEntry, CursorGoto, DefaultColors, GridLine, GridScroll, HlAttrDefine, OptionSet,
    RedrawEvent,
};
use crate::highlight::HighlightAttrs;
use crate::RedrawError;
use rmpv::Value;
use serde::de::DeserializeOwned;
use tracing::trace;

type DecodeFn = fn(&'static str, &[Value]) -> Result<RedrawEvent, RedrawError>;

/// Kind name to decoder
static DECODERS: &[(&str, DecodeFn)] = &[
    ("option_set", decode_option_set),
    ("default_colors_set", decode_default_colors_set),
    ("hl_attr_define", decode_hl_attr_define),
    ("grid_line", decode_grid_line),
    ("grid_scroll", decode_grid_scroll),
    ("grid_cursor_goto", decode_grid_cursor_goto),
    ("grid_clear", decode_grid_clear),
    ("flush", decode_flush),
    ("mouse_on", decode_mouse_on),
    ("mouse_off", decode_mouse_off),
];

/// Kinds that are understood but have no effect on the grid
static IGNORED: &[&str] = &[
    "busy_start",
    "busy_stop",
    "mode_change",
    "mode_info_set",
    "grid_resize",
];

/// Decode every update of a redraw notification.
///
/// Either the whole batch decodes or an error is returned; nothing is partially applied.
pub fn decode_batch(updates: &[Value]) -> Result<Vec<RedrawEvent>, RedrawError> {
    updates.iter().map(decode_update).collect()
}

/// Decode a single `[kind, tuple...]` update
pub fn decode_update(update: &Value) -> Result<RedrawEvent, RedrawError> {
    let items = update
        .as_array()
        .ok_or_else(|| RedrawError::Malformed(format!("update is not an array: {update}")))?;

    let (kind, args) = items
        .split_first()
        .ok_or_else(|| RedrawError::Malformed("empty update".to_string()))?;
    let kind = kind
        .as_str()
        .ok_or_else(|| RedrawError::Malformed(format!("update kind is not a string: {kind}")))?;

    if let Some((name, decode)) = DECODERS.iter().find(|(name, _)| *name == kind) {
        trace!("Decoding {} with {} tuples", name, args.len());
        return decode(*name, args);
    }

    if let Some(name) = IGNORED.iter().find(|name| **name == kind) {
        return Ok(RedrawEvent::Ignored(*name));
    }

    Ok(RedrawEvent::Unknown {
        kind: kind.to_string(),
        args: args.to_vec(),
    })
}

/// Positional reader over one argument tuple
struct Fields<'a> {
    kind: &'static str,
    values: &'a [Value],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(kind: &'static str, tuple: &'a Value) -> Result<Self, RedrawError> {
        let values = tuple.as_array().ok_or_else(|| {
            RedrawError::Malformed(format!("`{kind}` argument is not an array: {tuple}"))
        })?;
        Ok(Self {
            kind,
            values,
            pos: 0,
        })
    }

    fn advance(&mut self) -> Option<&'a Value> {
        let value = self.values.get(self.pos);
        self.pos += 1;
        value
    }

    /// Next field decoded as `T`, or `T::default()` when the tuple was truncated
    fn next<T>(&mut self, field: &'static str) -> Result<T, RedrawError>
    where
        T: DeserializeOwned + Default,
    {
        match self.advance() {
            None => Ok(T::default()),
            Some(value) => {
                rmpv::ext::from_value(value.clone()).map_err(|source| RedrawError::Decode {
                    kind: self.kind,
                    field,
                    source,
                })
            }
        }
    }

    /// Next field kept as a raw value
    fn next_raw(&mut self) -> Value {
        self.advance().cloned().unwrap_or(Value::Nil)
    }

    /// Next field as an array of raw values; empty when truncated
    fn next_array(&mut self, field: &'static str) -> Result<&'a [Value], RedrawError> {
        let kind = self.kind;
        match self.advance() {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(RedrawError::Malformed(format!(
                "field `{field}` of `{kind}` is not an array: {other}"
            ))),
        }
    }
}

fn each_tuple<T>(
    kind: &'static str,
    args: &[Value],
    mut decode: impl FnMut(&mut Fields<'_>) -> Result<T, RedrawError>,
) -> Result<Vec<T>, RedrawError> {
    args.iter()
        .map(|tuple| decode(&mut Fields::new(kind, tuple)?))
        .collect()
}

fn decode_option_set(kind: &'static str, args: &[Value]) -> Result<RedrawEvent, RedrawError> {
    let options = each_tuple(kind, args, |f| {
        Ok(OptionSet {
            name: f.next("name")?,
            value: f.next_raw(),
        })
    })?;
    Ok(RedrawEvent::OptionSet(options))
}

fn decode_default_colors_set(
    kind: &'static str,
    args: &[Value],
) -> Result<RedrawEvent, RedrawError> {
    let colors = each_tuple(kind, args, |f| {
        Ok(DefaultColors {
            rgb_fg: f.next("rgb_fg")?,
            rgb_bg: f.next("rgb_bg")?,
        })
    })?;
    Ok(RedrawEvent::DefaultColorsSet(colors))
}

fn decode_hl_attr_define(kind: &'static str, args: &[Value]) -> Result<RedrawEvent, RedrawError> {
    let defines = each_tuple(kind, args, |f| {
        Ok(HlAttrDefine {
            id: f.next("id")?,
            attrs: f.next::<HighlightAttrs>("rgb_attrs")?,
        })
    })?;
    Ok(RedrawEvent::HlAttrDefine(defines))
}

fn decode_grid_line(kind: &'static str, args: &[Value]) -> Result<RedrawEvent, RedrawError> {
    let lines = each_tuple(kind, args, |f| {
        let grid = f.next("grid")?;
        let row = f.next("row")?;
        let col_start = f.next("col_start")?;
        let cells = f
            .next_array("cells")?
            .iter()
            .map(|cell| decode_cell(kind, cell))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GridLine {
            grid,
            row,
            col_start,
            cells,
        })
    })?;
    Ok(RedrawEvent::GridLine(lines))
}

fn decode_cell(kind: &'static str, cell: &Value) -> Result<CellEntry, RedrawError> {
    let mut f = Fields::new(kind, cell)?;
    let text: String = f.next("text")?;

    Ok(CellEntry {
        ch: text.chars().next(),
        hl_id: f.next("hl_id")?,
        repeat: f.next("repeat")?,
    })
}

fn decode_grid_scroll(kind: &'static str, args: &[Value]) -> Result<RedrawEvent, RedrawError> {
    let scrolls = each_tuple(kind, args, |f| {
        Ok(GridScroll {
            grid: f.next("grid")?,
            top: f.next("top")?,
            bottom: f.next("bottom")?,
            left: f.next("left")?,
            right: f.next("right")?,
            rows: f.next("rows")?,
            cols: f.next("cols")?,
        })
    })?;
    Ok(RedrawEvent::GridScroll(scrolls))
}

fn decode_grid_cursor_goto(
    kind: &'static str,
    args: &[Value],
) -> Result<RedrawEvent, RedrawError> {
    let gotos = each_tuple(kind, args, |f| {
        Ok(CursorGoto {
            grid: f.next("grid")?,
            row: f.next("row")?,
            col: f.next("col")?,
        })
    })?;
    Ok(RedrawEvent::GridCursorGoto(gotos))
}

fn decode_grid_clear(_: &'static str, _: &[Value]) -> Result<RedrawEvent, RedrawError> {
    Ok(RedrawEvent::GridClear)
}

fn decode_flush(_: &'static str, _: &[Value]) -> Result<RedrawEvent, RedrawError> {
    Ok(RedrawEvent::Flush)
}

fn decode_mouse_on(_: &'static str, _: &[Value]) -> Result<RedrawEvent, RedrawError> {
    Ok(RedrawEvent::MouseOn)
}

fn decode_mouse_off(_: &'static str, _: &[Value]) -> Result<RedrawEvent, RedrawError> {
    Ok(RedrawEvent::MouseOff)
}
