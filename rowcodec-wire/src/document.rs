//! Tagged binary documents.
//!
//! A document is a little-endian `int32` total length (counting itself and
//! the terminator), a run of elements, and a zero byte. Each element is a
//! type tag, a NUL-terminated name, and a payload whose shape the tag
//! determines. Containers (objects and arrays) are nested documents.

use bytes::{Buf, BufMut, BytesMut};
use rowcodec_core::{BindVars, CodecConfig, Value, WireError, MIN_DOCUMENT_LEN};

/// Element type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// End of document
    Eoo = 0x00,
    String = 0x02,
    Object = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Null = 0x0A,
    Int = 0x10,
    Long = 0x12,
    Ulong = 0x3F,
}

impl ElementType {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ElementType::Eoo),
            0x02 => Some(ElementType::String),
            0x03 => Some(ElementType::Object),
            0x04 => Some(ElementType::Array),
            0x05 => Some(ElementType::Binary),
            0x0A => Some(ElementType::Null),
            0x10 => Some(ElementType::Int),
            0x12 => Some(ElementType::Long),
            0x3F => Some(ElementType::Ulong),
            _ => None,
        }
    }
}

/// Generic binary subtype written for every byte payload.
const BINARY_SUBTYPE: u8 = 0x00;

// ============================================================================
// ENCODING
// ============================================================================

/// Reserves a length prefix and backpatches it once the body is written.
#[derive(Debug)]
#[must_use = "the reserved length must be recorded"]
pub struct LenWriter {
    offset: usize,
}

impl LenWriter {
    /// Reserve four bytes at the current end of `buf`.
    pub fn new(buf: &mut BytesMut) -> Self {
        let offset = buf.len();
        buf.put_i32_le(0);
        Self { offset }
    }

    /// Write the number of bytes since the reservation into the prefix.
    pub fn record_len(self, buf: &mut BytesMut) -> Result<(), WireError> {
        let len = buf.len() - self.offset;
        let prefix = i32::try_from(len).map_err(|_| WireError::LengthOverflow { len })?;
        buf[self.offset..self.offset + 4].copy_from_slice(&prefix.to_le_bytes());
        Ok(())
    }
}

/// Write an element's type tag and name.
pub fn encode_prefix(buf: &mut BytesMut, kind: ElementType, name: &str) -> Result<(), WireError> {
    if name.as_bytes().contains(&0) {
        return Err(WireError::NulInName {
            name: name.to_string(),
        });
    }
    buf.put_u8(kind.as_byte());
    buf.put_slice(name.as_bytes());
    buf.put_u8(0);
    Ok(())
}

/// String payload: length including terminator, bytes, terminator.
pub fn encode_string(buf: &mut BytesMut, value: &str) -> Result<(), WireError> {
    let len = value.len() + 1;
    let prefix = i32::try_from(len).map_err(|_| WireError::LengthOverflow { len })?;
    buf.put_i32_le(prefix);
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
    Ok(())
}

/// Binary payload: length, subtype, bytes.
pub fn encode_binary(buf: &mut BytesMut, value: &[u8]) -> Result<(), WireError> {
    let len = value.len();
    let prefix = i32::try_from(len).map_err(|_| WireError::LengthOverflow { len })?;
    buf.put_i32_le(prefix);
    buf.put_u8(BINARY_SUBTYPE);
    buf.put_slice(value);
    Ok(())
}

/// Write one named value as an element.
pub fn encode_field(buf: &mut BytesMut, name: &str, value: &Value) -> Result<(), WireError> {
    match value {
        Value::Int(v) => {
            encode_prefix(buf, ElementType::Long, name)?;
            buf.put_i64_le(*v);
        }
        Value::Uint(v) => {
            encode_prefix(buf, ElementType::Ulong, name)?;
            buf.put_u64_le(*v);
        }
        Value::Text(s) => {
            encode_prefix(buf, ElementType::String, name)?;
            encode_string(buf, s)?;
        }
        Value::Bytes(b) => {
            encode_prefix(buf, ElementType::Binary, name)?;
            encode_binary(buf, b)?;
        }
        Value::List(items) => {
            encode_prefix(buf, ElementType::Array, name)?;
            encode_array(buf, items)?;
        }
        Value::Absent => {
            encode_prefix(buf, ElementType::Null, name)?;
        }
    }
    Ok(())
}

/// Write a bind-variable mapping as a nested document.
pub fn encode_document(buf: &mut BytesMut, vars: &BindVars) -> Result<(), WireError> {
    let len_writer = LenWriter::new(buf);
    for (name, value) in vars {
        encode_field(buf, name, value)?;
    }
    buf.put_u8(ElementType::Eoo.as_byte());
    len_writer.record_len(buf)
}

fn encode_array(buf: &mut BytesMut, items: &[Value]) -> Result<(), WireError> {
    let len_writer = LenWriter::new(buf);
    for (i, item) in items.iter().enumerate() {
        encode_field(buf, &i.to_string(), item)?;
    }
    buf.put_u8(ElementType::Eoo.as_byte());
    len_writer.record_len(buf)
}

// ============================================================================
// DECODING
// ============================================================================

/// Bounds-checked cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn need(&self, needed: usize) -> Result<(), WireError> {
        if self.buf.remaining() < needed {
            return Err(WireError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        self.need(4)?;
        Ok(self.buf.get_i32_le())
    }

    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        self.need(8)?;
        Ok(self.buf.get_i64_le())
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        self.need(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Read a NUL-terminated UTF-8 name.
    pub fn read_cstring(&mut self) -> Result<&'a str, WireError> {
        let buf = self.buf;
        let end = buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(WireError::InvalidCString)?;
        let name = std::str::from_utf8(&buf[..end]).map_err(|_| WireError::InvalidUtf8 {
            what: "element name".to_string(),
        })?;
        self.buf = &buf[end + 1..];
        Ok(name)
    }

    /// Split the next document off the front and return a reader over its
    /// elements, without the length prefix or terminator.
    pub fn open_document(&mut self) -> Result<Reader<'a>, WireError> {
        let len = self.read_i32()?;
        if len < MIN_DOCUMENT_LEN as i32 {
            return Err(WireError::InvalidLength {
                what: "document",
                len: i64::from(len),
            });
        }
        let body = self.read_bytes(len as usize - 4)?;
        match body.split_last() {
            Some((&0, elements)) => Ok(Reader::new(elements)),
            _ => Err(WireError::MissingTerminator),
        }
    }

    /// Read the next element header, or `None` at the end of the document.
    pub fn next_element(&mut self) -> Result<Option<(u8, &'a str)>, WireError> {
        if self.is_empty() {
            return Ok(None);
        }
        let tag = self.read_u8()?;
        if tag == ElementType::Eoo.as_byte() {
            // a terminator before the declared end leaves unread bytes
            return Err(WireError::TrailingBytes {
                count: self.remaining(),
            });
        }
        let name = self.read_cstring()?;
        Ok(Some((tag, name)))
    }

    fn read_len(&mut self, what: &'static str) -> Result<usize, WireError> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| WireError::InvalidLength {
            what,
            len: i64::from(len),
        })
    }

    /// String payload bytes, without the terminator.
    pub fn read_string_payload(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_len("string")?;
        if len == 0 {
            return Err(WireError::InvalidLength {
                what: "string",
                len: 0,
            });
        }
        match self.read_bytes(len)?.split_last() {
            Some((&0, bytes)) => Ok(bytes),
            _ => Err(WireError::MissingTerminator),
        }
    }

    /// Binary payload bytes; the subtype is skipped.
    pub fn read_binary_payload(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_len("binary")?;
        self.read_u8()?;
        self.read_bytes(len)
    }
}

/// Decode a textual field from either a String or a Binary element.
pub fn decode_string(reader: &mut Reader<'_>, tag: u8, field: &str) -> Result<String, WireError> {
    let bytes = match ElementType::from_byte(tag) {
        Some(ElementType::String) => reader.read_string_payload()?,
        Some(ElementType::Binary) => reader.read_binary_payload()?,
        _ => {
            return Err(WireError::UnexpectedType {
                field: field.to_string(),
                tag,
            })
        }
    };
    String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidUtf8 {
        what: field.to_string(),
    })
}

/// Decode a 64-bit integer field from any integer element.
pub fn decode_i64(reader: &mut Reader<'_>, tag: u8, field: &str) -> Result<i64, WireError> {
    match ElementType::from_byte(tag) {
        Some(ElementType::Int) => Ok(i64::from(reader.read_i32()?)),
        Some(ElementType::Long) => reader.read_i64(),
        Some(ElementType::Ulong) => Ok(reader.read_u64()? as i64),
        _ => Err(WireError::UnexpectedType {
            field: field.to_string(),
            tag,
        }),
    }
}

/// Decodes generic values with a nesting limit.
#[derive(Debug, Clone, Copy)]
pub struct ValueDecoder {
    max_depth: usize,
}

impl ValueDecoder {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            max_depth: config.max_nesting_depth,
        }
    }

    fn enter(&self, depth: usize) -> Result<(), WireError> {
        if depth > self.max_depth {
            return Err(WireError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Decode a mapping document whose opening length prefix is next in
    /// `reader`. `depth` is the nesting level of that document.
    pub fn decode_bind_vars(&self, reader: &mut Reader<'_>, depth: usize) -> Result<BindVars, WireError> {
        self.enter(depth)?;
        let mut elements = reader.open_document()?;
        let mut vars = BindVars::new();
        while let Some((tag, name)) = elements.next_element()? {
            let value = self.decode_value(&mut elements, tag, name, depth)?;
            vars.insert(name.to_string(), value);
        }
        Ok(vars)
    }

    /// Decode one element payload found inside a document at `depth`.
    pub fn decode_value(
        &self,
        reader: &mut Reader<'_>,
        tag: u8,
        key: &str,
        depth: usize,
    ) -> Result<Value, WireError> {
        match ElementType::from_byte(tag) {
            Some(ElementType::Int) => Ok(Value::Int(i64::from(reader.read_i32()?))),
            Some(ElementType::Long) => Ok(Value::Int(reader.read_i64()?)),
            Some(ElementType::Ulong) => Ok(Value::Uint(reader.read_u64()?)),
            Some(ElementType::String) => {
                let bytes = reader.read_string_payload()?;
                let text = std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8 {
                    what: key.to_string(),
                })?;
                Ok(Value::Text(text.to_string()))
            }
            Some(ElementType::Binary) => Ok(Value::Bytes(reader.read_binary_payload()?.to_vec())),
            Some(ElementType::Null) => Ok(Value::Absent),
            Some(ElementType::Array) => self.decode_array(reader, depth + 1).map(Value::List),
            Some(ElementType::Object) | Some(ElementType::Eoo) | None => {
                Err(WireError::UnsupportedElement {
                    key: key.to_string(),
                    tag,
                })
            }
        }
    }

    fn decode_array(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Vec<Value>, WireError> {
        self.enter(depth)?;
        let mut elements = reader.open_document()?;
        let mut items = Vec::new();
        while let Some((tag, key)) = elements.next_element()? {
            items.push(self.decode_value(&mut elements, tag, key, depth)?);
        }
        Ok(items)
    }
}
