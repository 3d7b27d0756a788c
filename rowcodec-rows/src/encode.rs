//! SQL-literal rendering of primary key values.

use crate::normalize::{to_number, to_number_bytes};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{BufMut, Bytes, BytesMut};
use rowcodec_core::{CodecError, CodecResult, EncodingError, RowSpecError, Table, Value};

/// Append one value rendered as a SQL literal.
///
/// Numeric columns render bare numerals, parsing textual input first.
/// Non-numeric columns render single-quoted, escaped text and accept only
/// `Text` and `Bytes`.
pub fn encode_pk_value(buf: &mut BytesMut, value: &Value, numeric: bool) -> CodecResult<()> {
    if numeric {
        let parsed = match value {
            Value::Text(text) => to_number(text)?,
            Value::Bytes(bytes) => to_number_bytes(bytes)?,
            _ => return write_number(buf, value).ok_or_else(|| disallowed(value, numeric)),
        };
        return write_number(buf, &parsed).ok_or_else(|| disallowed(&parsed, numeric));
    }

    match value.as_text_bytes() {
        Some(raw) => {
            buf.put_u8(b'\'');
            escape_write(buf, raw);
            buf.put_u8(b'\'');
            Ok(())
        }
        None => Err(disallowed(value, numeric)),
    }
}

/// Render one value as a standalone SQL-literal fragment.
pub fn encode_sql_value(value: &Value, numeric: bool) -> CodecResult<Bytes> {
    let mut buf = BytesMut::with_capacity(16);
    encode_pk_value(&mut buf, value, numeric)?;
    Ok(buf.freeze())
}

/// Append `raw` with the comment-breaking and quote characters escaped.
pub fn escape_write(buf: &mut BytesMut, raw: &[u8]) {
    buf.reserve(raw.len());
    for &byte in raw {
        match byte {
            b'\'' | b'\\' | b'/' | b'*' => {
                buf.put_u8(b'\\');
                buf.put_u8(byte);
            }
            _ => buf.put_u8(byte),
        }
    }
}

/// Whether the `position`-th primary key column is numeric.
pub fn pk_column_is_number(table: &Table, position: usize) -> CodecResult<bool> {
    let out_of_range = || RowSpecError::ColumnOutOfRange {
        table: table.name().to_string(),
        index: position,
        len: table.pk_columns().len(),
    };
    let column = *table.pk_columns().get(position).ok_or_else(out_of_range)?;
    table
        .is_numeric(column)
        .ok_or_else(|| RowSpecError::ColumnOutOfRange {
            table: table.name().to_string(),
            index: column,
            len: table.columns().len(),
        })
        .map_err(CodecError::from)
}

/// Decode a base64 (standard alphabet, padded) primary key value.
pub fn base64_decode(encoded: &[u8]) -> CodecResult<Vec<u8>> {
    STANDARD.decode(encoded).map_err(|e| CodecError::Decode {
        reason: e.to_string(),
    })
}

fn write_number(buf: &mut BytesMut, value: &Value) -> Option<()> {
    match value {
        Value::Int(n) => buf.put_slice(n.to_string().as_bytes()),
        Value::Uint(n) => buf.put_slice(n.to_string().as_bytes()),
        _ => return None,
    }
    Some(())
}

fn disallowed(value: &Value, numeric: bool) -> CodecError {
    EncodingError::DisallowedType {
        value_type: value.type_name(),
        numeric,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcodec_core::ErrorKind;

    fn render(value: Value, numeric: bool) -> CodecResult<Vec<u8>> {
        encode_sql_value(&value, numeric).map(|b| b.to_vec())
    }

    #[test]
    fn test_numeric_renders_bare() {
        assert_eq!(render(Value::Int(-12), true).unwrap(), b"-12");
        assert_eq!(render(Value::Uint(u64::MAX), true).unwrap(), b"18446744073709551615");
        assert_eq!(render(Value::from("0x10"), true).unwrap(), b"16");
        assert_eq!(render(Value::Bytes(b"7".to_vec()), true).unwrap(), b"7");
    }

    #[test]
    fn test_numeric_rejects_unparseable_text() {
        let err = render(Value::from("7up"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercionFailure);
    }

    #[test]
    fn test_numeric_rejects_other_types() {
        for value in [Value::List(vec![Value::Int(1)]), Value::Absent] {
            let err = render(value, true).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EncodingFailure);
        }
    }

    #[test]
    fn test_numeric_disallowed_reports_original_type() {
        let mut buf = BytesMut::new();
        let list = Value::List(vec![Value::from("1"), Value::Int(2)]);
        let err = encode_pk_value(&mut buf, &list, true).unwrap_err();
        assert_eq!(
            err,
            CodecError::Encoding(EncodingError::DisallowedType {
                value_type: "list",
                numeric: true,
            })
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_text_is_quoted_and_escaped() {
        assert_eq!(render(Value::from("a*/b"), false).unwrap(), b"'a\\*\\/b'");
        assert_eq!(render(Value::from("it's"), false).unwrap(), b"'it\\'s'");
        assert_eq!(render(Value::from("c:\\"), false).unwrap(), b"'c:\\\\'");
        assert_eq!(render(Value::from(""), false).unwrap(), b"''");
    }

    #[test]
    fn test_bytes_escaped_verbatim() {
        let raw = vec![0x00, b'*', 0xff, b'/'];
        assert_eq!(
            render(Value::Bytes(raw), false).unwrap(),
            vec![b'\'', 0x00, b'\\', b'*', 0xff, b'\\', b'/', b'\'']
        );
    }

    #[test]
    fn test_non_numeric_rejects_integers() {
        let err = render(Value::Int(5), false).unwrap_err();
        assert_eq!(
            err,
            CodecError::Encoding(EncodingError::DisallowedType {
                value_type: "int",
                numeric: false,
            })
        );
    }

    #[test]
    fn test_pk_column_is_number() {
        let mut table = Table::with_version("t", 1);
        table.add_column("name", "varchar(10)");
        table.add_column("id", "int");
        table.set_pk_columns(vec![1, 0]).unwrap();

        assert!(pk_column_is_number(&table, 0).unwrap());
        assert!(!pk_column_is_number(&table, 1).unwrap());
        assert_eq!(
            pk_column_is_number(&table, 2).unwrap_err().kind(),
            ErrorKind::InconsistentRowSpec
        );
    }

    #[test]
    fn test_base64_decode() {
        assert_eq!(base64_decode(b"aGVsbG8=").unwrap(), b"hello");
        assert_eq!(base64_decode(b"").unwrap(), b"");
    }

    #[test]
    fn test_base64_decode_malformed() {
        let err = base64_decode(b"not base64!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeFailure);
    }
}
