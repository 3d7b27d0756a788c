//! Stream comments naming the primary keys a statement touches.
//!
//! The replication stream consumer parses these back out of the statement
//! text, so the layout is fixed:
//!
//! ```text
//!  /* _stream <table> (<col> <col> ) (<v> <v> ) ...; */
//! ```
//!
//! Values are rendered with the same SQL-literal rules as cache keys. The
//! escaping of `/` and `*` guarantees no value can close the comment early;
//! table and column names are written as-is and must not contain `*/`.

use crate::encode::{encode_pk_value, pk_column_is_number};
use bytes::{BufMut, Bytes, BytesMut};
use rowcodec_core::{CodecResult, EncodingError, Row, RowSpecError, Table};

const COMMENT_CAPACITY: usize = 256;

/// Render the stream comment for `pk_rows` followed by any `secondary_rows`.
///
/// Absent cells are skipped, both in the value rows and, for the first pk
/// row, in the column header.
pub fn build_stream_comment(
    table: &Table,
    pk_rows: &[Row],
    secondary_rows: Option<&[Row]>,
) -> CodecResult<Bytes> {
    let first = pk_rows.first().ok_or_else(|| RowSpecError::NoRows {
        table: table.name().to_string(),
    })?;
    let width = table.pk_columns().len();
    if first.len() != width {
        return Err(RowSpecError::RowLengthMismatch {
            expected: width,
            got: first.len(),
        }
        .into());
    }

    let mut buf = BytesMut::with_capacity(COMMENT_CAPACITY);
    buf.put_slice(b" /* _stream ");
    buf.put_slice(checked_identifier(table.name())?);
    buf.put_slice(b" (");
    for (name, cell) in table.pk_column_names().zip(first) {
        if cell.is_absent() {
            continue;
        }
        buf.put_slice(checked_identifier(name)?);
        buf.put_u8(b' ');
    }
    buf.put_u8(b')');

    write_rows(&mut buf, table, pk_rows)?;
    if let Some(rows) = secondary_rows {
        write_rows(&mut buf, table, rows)?;
    }
    buf.put_slice(b"; */");
    Ok(buf.freeze())
}

/// Identifiers are written unescaped, so one holding `*/` is refused.
fn checked_identifier(name: &str) -> CodecResult<&[u8]> {
    if name.contains("*/") {
        return Err(EncodingError::UnsafeIdentifier {
            name: name.to_string(),
        }
        .into());
    }
    Ok(name.as_bytes())
}

fn write_rows(buf: &mut BytesMut, table: &Table, rows: &[Row]) -> CodecResult<()> {
    let width = table.pk_columns().len();
    for row in rows {
        if row.len() != width {
            return Err(RowSpecError::RowLengthMismatch {
                expected: width,
                got: row.len(),
            }
            .into());
        }
        buf.put_slice(b" (");
        for (position, cell) in row.iter().enumerate() {
            if cell.is_absent() {
                continue;
            }
            encode_pk_value(buf, cell, pk_column_is_number(table, position)?)?;
            buf.put_u8(b' ');
        }
        buf.put_u8(b')');
    }
    Ok(())
}
