//! Numeric coercion of resolved rows.

use rowcodec_core::{CodecResult, CoercionError, Row, RowSpecError, Table, Value};
use std::num::IntErrorKind;

/// Parse an integer literal.
///
/// A leading `-` selects a signed 64-bit result; anything else must fit an
/// unsigned 64-bit integer. `0x`, `0o` and `0b` prefixes and a bare leading
/// `0` (octal) select the radix.
pub fn to_number(text: &str) -> Result<Value, CoercionError> {
    if text.is_empty() {
        return Err(CoercionError::EmptyNumber);
    }
    let invalid = |reason: &str| CoercionError::InvalidNumber {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    match text.strip_prefix('-') {
        Some(magnitude) => {
            let magnitude = parse_unsigned(magnitude).map_err(invalid)?;
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(invalid("value out of range"));
            }
            Ok(Value::Int((magnitude as i64).wrapping_neg()))
        }
        None => parse_unsigned(text).map(Value::Uint).map_err(invalid),
    }
}

/// Parse an integer literal held in a byte string.
pub fn to_number_bytes(bytes: &[u8]) -> Result<Value, CoercionError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => to_number(text),
        Err(_) => Err(CoercionError::InvalidNumber {
            text: String::from_utf8_lossy(bytes).into_owned(),
            reason: "invalid syntax".to_string(),
        }),
    }
}

fn parse_unsigned(literal: &str) -> Result<u64, &'static str> {
    let (radix, digits) = if let Some(rest) = strip_radix_prefix(literal, 'x') {
        (16, rest)
    } else if let Some(rest) = strip_radix_prefix(literal, 'o') {
        (8, rest)
    } else if let Some(rest) = strip_radix_prefix(literal, 'b') {
        (2, rest)
    } else if literal.len() > 1 && literal.starts_with('0') {
        (8, &literal[1..])
    } else {
        (10, literal)
    };

    // from_str_radix tolerates a leading '+', integer literals do not
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err("invalid syntax");
    }
    u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => "value out of range",
        _ => "invalid syntax",
    })
}

fn strip_radix_prefix(literal: &str, marker: char) -> Option<&str> {
    let rest = literal.strip_prefix('0')?;
    rest.strip_prefix(marker)
        .or_else(|| rest.strip_prefix(marker.to_ascii_uppercase()))
}

/// Replace textual cells in numeric columns with parsed numbers.
///
/// `column_indices[j]` is the table column that cell `j` of every row
/// belongs to. Every row must have exactly `column_indices.len()` cells.
pub fn normalize_rows(table: &Table, column_indices: &[usize], rows: &mut [Row]) -> CodecResult<()> {
    let numeric = column_indices
        .iter()
        .map(|&index| {
            table.is_numeric(index).ok_or_else(|| RowSpecError::ColumnOutOfRange {
                table: table.name().to_string(),
                index,
                len: table.columns().len(),
            })
        })
        .collect::<Result<Vec<bool>, _>>()?;

    for row in rows.iter_mut() {
        if row.len() != numeric.len() {
            return Err(RowSpecError::RowLengthMismatch {
                expected: numeric.len(),
                got: row.len(),
            }
            .into());
        }
        for (cell, &is_number) in row.iter_mut().zip(&numeric) {
            if !is_number {
                continue;
            }
            let parsed = match cell {
                Value::Text(text) => to_number(text)?,
                Value::Bytes(bytes) => to_number_bytes(bytes)?,
                _ => continue,
            };
            *cell = parsed;
        }
    }
    Ok(())
}

/// Normalize rows laid out in primary key column order.
pub fn normalize_pk_rows(table: &Table, rows: &mut [Row]) -> CodecResult<()> {
    normalize_rows(table, table.pk_columns(), rows)
}
