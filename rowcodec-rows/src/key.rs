//! Cache keys for primary key tuples.

use crate::encode::{encode_pk_value, pk_column_is_number};
use bytes::{Bytes, BytesMut};
use rowcodec_core::{CodecResult, RowSpecError, Table, Value};
use std::fmt;

/// Initial key buffer capacity; keys for typical tuples fit without growth.
const KEY_CAPACITY: usize = 32;

/// The cache key of one primary key tuple.
///
/// Each pk value is rendered as a SQL literal and followed by `,`, so
/// `(5)` on a numeric column becomes `5,` and `('5')` on a text column
/// becomes `'5',`. Escaped byte values may be non-UTF-8, so the key is
/// held as bytes; `Display` is lossy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey(Bytes);

impl RowKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key as UTF-8, or `None` if it holds raw binary.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for RowKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Build the cache key for one normalized pk row.
pub fn build_key(table: &Table, row: &[Value]) -> CodecResult<RowKey> {
    let width = table.pk_columns().len();
    if row.len() != width {
        return Err(RowSpecError::RowLengthMismatch {
            expected: width,
            got: row.len(),
        }
        .into());
    }

    let mut buf = BytesMut::with_capacity(KEY_CAPACITY);
    for (position, value) in row.iter().enumerate() {
        encode_pk_value(&mut buf, value, pk_column_is_number(table, position)?)?;
        buf.extend_from_slice(b",");
    }
    Ok(RowKey(buf.freeze()))
}

/// Build one key per row.
pub fn build_keys(table: &Table, rows: &[Vec<Value>]) -> CodecResult<Vec<RowKey>> {
    rows.iter().map(|row| build_key(table, row)).collect()
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn text_table() -> Table {
        let mut table = Table::with_version("t", 1);
        table.add_column("a", "varchar(64)");
        table.add_column("b", "varbinary(64)");
        table.add_column("n", "bigint");
        table.set_pk_columns(vec![0, 1, 2]).unwrap();
        table
    }

    fn tuple_strategy() -> impl Strategy<Value = (String, Vec<u8>, i64)> {
        (".{0,12}", proptest::collection::vec(any::<u8>(), 0..12), any::<i64>())
    }

    fn row((a, b, n): (String, Vec<u8>, i64)) -> Vec<Value> {
        vec![Value::Text(a), Value::Bytes(b), Value::Int(n)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Distinct tuples never share a key.
        #[test]
        fn prop_key_injective(left in tuple_strategy(), right in tuple_strategy()) {
            let table = text_table();
            let left_key = build_key(&table, &row(left.clone())).unwrap();
            let right_key = build_key(&table, &row(right.clone())).unwrap();
            prop_assert_eq!(left == right, left_key == right_key);
        }

        /// A key is a pure function of its tuple.
        #[test]
        fn prop_key_deterministic(tuple in tuple_strategy()) {
            let table = text_table();
            let first = build_key(&table, &row(tuple.clone())).unwrap();
            let second = build_key(&table, &row(tuple)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
