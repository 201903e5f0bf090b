//! MessagePack-RPC message definitions and stream codec
//!
//! Messages are plain MessagePack arrays with no length prefix:
//! request `[0, id, method, params]`, response `[1, id, error, result]`,
//! notification `[2, method, params]`.

use crate::RpcError;
use bytes::{BufMut, BytesMut};
use rmpv::Value;

const REQUEST: u64 = 0;
const RESPONSE: u64 = 1;
const NOTIFICATION: u64 = 2;

/// Message types in the MessagePack-RPC protocol
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Call expecting a response with the same id
    Request {
        id: u32,
        method: String,
        params: Vec<Value>,
    },

    /// Answer to a request; `error` is nil on success
    Response { id: u32, error: Value, result: Value },

    /// Fire-and-forget event
    Notification { method: String, params: Vec<Value> },
}

impl Message {
    /// Build the wire value of this message
    pub fn to_value(&self) -> Value {
        match self {
            Message::Request { id, method, params } => Value::Array(vec![
                Value::from(REQUEST),
                Value::from(*id),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
            Message::Response { id, error, result } => Value::Array(vec![
                Value::from(RESPONSE),
                Value::from(*id),
                error.clone(),
                result.clone(),
            ]),
            Message::Notification { method, params } => Value::Array(vec![
                Value::from(NOTIFICATION),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
        }
    }

    /// Interpret a wire value as a message
    pub fn from_value(value: Value) -> Result<Self, RpcError> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(RpcError::Protocol(format!("message is not an array: {other}")));
            }
        };
        let mut items = items.into_iter();

        let tag = items
            .next()
            .and_then(|tag| tag.as_u64())
            .ok_or_else(|| RpcError::Protocol("missing message type".to_string()))?;

        match tag {
            REQUEST => {
                let id = message_id(items.next())?;
                let method = method_name(items.next())?;
                let params = params(items.next())?;
                Ok(Message::Request { id, method, params })
            }
            RESPONSE => {
                let id = message_id(items.next())?;
                let error = items.next().unwrap_or(Value::Nil);
                let result = items.next().unwrap_or(Value::Nil);
                Ok(Message::Response { id, error, result })
            }
            NOTIFICATION => {
                let method = method_name(items.next())?;
                let params = params(items.next())?;
                Ok(Message::Notification { method, params })
            }
            other => Err(RpcError::Protocol(format!("unknown message type {other}"))),
        }
    }
}

fn message_id(value: Option<Value>) -> Result<u32, RpcError> {
    value
        .and_then(|id| id.as_u64())
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| RpcError::Protocol("invalid message id".to_string()))
}

fn method_name(value: Option<Value>) -> Result<String, RpcError> {
    value
        .as_ref()
        .and_then(|method| method.as_str())
        .map(str::to_string)
        .ok_or_else(|| RpcError::Protocol("invalid method name".to_string()))
}

fn params(value: Option<Value>) -> Result<Vec<Value>, RpcError> {
    match value {
        Some(Value::Array(params)) => Ok(params),
        None | Some(Value::Nil) => Ok(Vec::new()),
        Some(other) => Err(RpcError::Protocol(format!("params is not an array: {other}"))),
    }
}

/// Encoder/decoder for a stream of back-to-back messages.
///
/// Decoding keeps how far into the buffer it has already walked, so bytes arriving in
/// small reads are looked at once rather than re-parsed on every call. The buffer must
/// only be consumed through [`MessageCodec::decode`] while a message is partial.
#[derive(Debug, Default)]
pub struct MessageCodec {
    scan: FrameScan,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the encoded message to `buf`
    pub fn encode(msg: &Message, buf: &mut BytesMut) -> Result<(), RpcError> {
        rmpv::encode::write_value(&mut buf.writer(), &msg.to_value())
            .map_err(|e| RpcError::Encode(e.to_string()))
    }

    /// Decode a message from buffer
    /// Returns Some(message) if a complete message is available, None if more data needed
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Message>, RpcError> {
        let len = match self.scan.advance(buf) {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.scan = FrameScan::default();
                return Err(e);
            }
        };

        // Only consume once a whole value is buffered
        let frame = buf.split_to(len);
        let value = rmpv::decode::read_value(&mut &frame[..])
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        Message::from_value(value).map(Some)
    }
}

/// Progress through a value that has not fully arrived
#[derive(Debug, Default)]
struct FrameScan {
    /// Bytes from the start of the buffer already walked
    offset: usize,

    /// Values still to walk; zero before a frame starts
    remaining: u64,
}

impl FrameScan {
    /// Walk newly buffered bytes. Returns the frame length once a whole top-level value
    /// is present.
    fn advance(&mut self, bytes: &[u8]) -> Result<Option<usize>, RpcError> {
        if self.remaining == 0 {
            if bytes.is_empty() {
                return Ok(None);
            }
            self.offset = 0;
            self.remaining = 1;
        }

        while self.remaining > 0 {
            let rest = &bytes[self.offset..];
            let head = match value_head(rest)? {
                Some(head) if head.len <= rest.len() => head,
                _ => return Ok(None),
            };
            self.offset += head.len;
            self.remaining = self.remaining - 1 + head.children;
        }

        let len = self.offset;
        self.offset = 0;
        Ok(Some(len))
    }
}

/// Encoded length of one value excluding nested values, and how many values it nests
struct Head {
    len: usize,
    children: u64,
}

/// Read the header of the value at the start of `bytes`; `None` if the header itself is
/// not fully buffered yet
fn value_head(bytes: &[u8]) -> Result<Option<Head>, RpcError> {
    let marker = match bytes.first() {
        Some(marker) => *marker,
        None => return Ok(None),
    };

    let head = match marker {
        0x00..=0x7f | 0xc0 | 0xc2 | 0xc3 | 0xe0..=0xff => scalar(1),
        0x80..=0x8f => Head {
            len: 1,
            children: 2 * u64::from(marker & 0x0f),
        },
        0x90..=0x9f => Head {
            len: 1,
            children: u64::from(marker & 0x0f),
        },
        0xa0..=0xbf => scalar(1 + usize::from(marker & 0x1f)),
        0xcc | 0xd0 => scalar(2),
        0xcd | 0xd1 => scalar(3),
        0xca | 0xce | 0xd2 => scalar(5),
        0xcb | 0xcf | 0xd3 => scalar(9),
        0xd4 => scalar(3),
        0xd5 => scalar(4),
        0xd6 => scalar(6),
        0xd7 => scalar(10),
        0xd8 => scalar(18),
        // bin and str carry a length, ext adds a type byte
        0xc4 | 0xd9 => return Ok(sized(bytes, 1, 0)),
        0xc5 | 0xda => return Ok(sized(bytes, 2, 0)),
        0xc6 | 0xdb => return Ok(sized(bytes, 4, 0)),
        0xc7 => return Ok(sized(bytes, 1, 1)),
        0xc8 => return Ok(sized(bytes, 2, 1)),
        0xc9 => return Ok(sized(bytes, 4, 1)),
        0xdc => return Ok(counted(bytes, 2, 1)),
        0xdd => return Ok(counted(bytes, 4, 1)),
        0xde => return Ok(counted(bytes, 2, 2)),
        0xdf => return Ok(counted(bytes, 4, 2)),
        0xc1 => return Err(RpcError::Decode("reserved marker 0xc1".to_string())),
    };
    Ok(Some(head))
}

fn scalar(len: usize) -> Head {
    Head { len, children: 0 }
}

/// Big-endian length in the `width` bytes after the marker
fn length(bytes: &[u8], width: usize) -> Option<u64> {
    let field = bytes.get(1..1 + width)?;
    Some(field.iter().fold(0, |n, b| (n << 8) | u64::from(*b)))
}

fn sized(bytes: &[u8], width: usize, type_byte: usize) -> Option<Head> {
    length(bytes, width).map(|n| scalar(1 + width + type_byte + n as usize))
}

fn counted(bytes: &[u8], width: usize, per_item: u64) -> Option<Head> {
    length(bytes, width).map(|n| Head {
        len: 1 + width,
        children: n * per_item,
    })
}
