//! Table and index metadata snapshots

use crate::{CodecResult, SchemaError};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Immutable-once-published metadata for one table.
///
/// A table is built with the `add_*` methods while a schema is loaded and
/// then shared read-only (usually behind an `Arc`). A reload builds a new
/// `Table` with a new version instead of mutating the published one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    version: i64,
    name: String,
    columns: Vec<String>,
    column_is_number: Vec<bool>,
    indexes: Vec<Index>,
    pk_columns: Vec<usize>,
    cache_type: i32,
    cache_size: u64,
}

impl Table {
    /// Create an empty table stamped with the current time in nanoseconds.
    pub fn new(name: impl Into<String>) -> Self {
        let version = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        Self::with_version(name, version)
    }

    /// Create an empty table with an explicit version stamp.
    pub fn with_version(name: impl Into<String>, version: i64) -> Self {
        Self {
            version,
            name: name.into(),
            columns: Vec::with_capacity(16),
            column_is_number: Vec::with_capacity(16),
            indexes: Vec::with_capacity(8),
            pk_columns: Vec::new(),
            cache_type: 0,
            cache_size: 0,
        }
    }

    /// Set the opaque caching policy hints.
    pub fn with_cache_policy(mut self, cache_type: i32, cache_size: u64) -> Self {
        self.cache_type = cache_type;
        self.cache_size = cache_size;
        self
    }

    /// Append a column.
    ///
    /// Any declared type whose name contains "int" is treated as numeric.
    /// Deployed cache keys depend on this classification, so it must stay a
    /// plain substring match.
    pub fn add_column(&mut self, name: impl Into<String>, declared_type: &str) {
        self.columns.push(name.into());
        self.column_is_number.push(declared_type.contains("int"));
    }

    /// Position of a column, or `None` if the table has no such column.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a new, empty index and return it for population.
    pub fn add_index(&mut self, name: impl Into<String>) -> &mut Index {
        self.indexes.push(Index::new(name));
        let last = self.indexes.len() - 1;
        &mut self.indexes[last]
    }

    /// Set the primary key column order.
    pub fn set_pk_columns(&mut self, pk_columns: Vec<usize>) -> CodecResult<()> {
        if let Some(&index) = pk_columns.iter().find(|&&i| i >= self.columns.len()) {
            return Err(SchemaError::ColumnOutOfRange {
                table: self.name.clone(),
                index,
                len: self.columns.len(),
            }
            .into());
        }
        self.pk_columns = pk_columns;
        Ok(())
    }

    /// Derive the primary key from the first index, which by convention is
    /// the primary index.
    pub fn set_pk_from_primary_index(&mut self) -> CodecResult<()> {
        let primary = self.indexes.first().ok_or_else(|| SchemaError::NoIndexes {
            table: self.name.clone(),
        })?;
        let pk_columns = primary
            .columns()
            .iter()
            .map(|column| {
                self.find_column(column).ok_or_else(|| SchemaError::UnknownColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.pk_columns = pk_columns;
        Ok(())
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Numeric flags, index-aligned with `columns()`.
    pub fn column_is_number(&self) -> &[bool] {
        &self.column_is_number
    }

    /// Whether the column at `index` is numeric; `None` if out of range.
    pub fn is_numeric(&self, index: usize) -> Option<bool> {
        self.column_is_number.get(index).copied()
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Look up an index by name.
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Primary key column positions, in key order.
    pub fn pk_columns(&self) -> &[usize] {
        &self.pk_columns
    }

    /// Primary key column names, in key order.
    pub fn pk_column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.pk_columns
            .iter()
            .filter_map(|&i| self.columns.get(i).map(String::as_str))
    }

    pub fn cache_type(&self) -> i32 {
        self.cache_type
    }

    pub fn cache_size(&self) -> u64 {
        self.cache_size
    }
}

/// A named index over an ordered list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    name: String,
    columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::with_capacity(8),
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>) {
        self.columns.push(name.into());
    }

    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    /// Declared column types, numeric and not, including near misses.
    fn column_type_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("int".to_string()),
            Just("bigint(20) unsigned".to_string()),
            Just("varchar(64)".to_string()),
            Just("point".to_string()),
            Just("INT".to_string()),
            "[a-z() ,0-9]{0,16}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_add_column_keeps_flags_aligned(
            columns in proptest::collection::btree_map("[a-z_]{1,12}", column_type_strategy(), 0..24)
        ) {
            let mut table = Table::with_version("t", 1);
            for (position, (name, declared)) in columns.iter().enumerate() {
                table.add_column(name.clone(), declared);

                prop_assert_eq!(table.columns().len(), table.column_is_number().len());
                prop_assert_eq!(table.find_column(name), Some(position));
                prop_assert_eq!(table.is_numeric(position), Some(declared.contains("int")));
            }
            prop_assert_eq!(table.columns().len(), columns.len());
        }
    }
}
