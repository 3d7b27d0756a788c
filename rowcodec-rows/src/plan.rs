//! The per-request row pipeline.

use crate::key::{build_key, RowKey};
use crate::normalize::normalize_pk_rows;
use crate::resolve::{build_secondary_list, build_value_list};
use crate::stream::build_stream_comment;
use bytes::Bytes;
use rowcodec_core::{BindVars, CodecResult, Row, Table, Value};
use tracing::debug;

/// Resolved and normalized rows for one statement against one table.
///
/// Borrows the table snapshot for the duration of the request, so a
/// concurrent schema reload cannot change the classification midway.
#[derive(Debug, Clone)]
pub struct PkRowSet<'a> {
    table: &'a Table,
    pk_rows: Vec<Row>,
    secondary_rows: Option<Vec<Row>>,
}

impl<'a> PkRowSet<'a> {
    /// Resolve `pk_specs` (and `secondary_specs` if given) against
    /// `bind_vars`, then normalize both row sets by the pk column types.
    pub fn build(
        table: &'a Table,
        pk_specs: &[Value],
        secondary_specs: Option<&[Value]>,
        bind_vars: &BindVars,
    ) -> CodecResult<Self> {
        let mut pk_rows = build_value_list(pk_specs, bind_vars)?;
        normalize_pk_rows(table, &mut pk_rows)?;

        let mut secondary_rows = build_secondary_list(&pk_rows, secondary_specs, bind_vars)?;
        if let Some(rows) = secondary_rows.as_mut() {
            normalize_pk_rows(table, rows)?;
        }

        debug!(
            table = table.name(),
            version = table.version(),
            rows = pk_rows.len(),
            secondary = secondary_rows.is_some(),
            "built pk row set"
        );
        Ok(Self {
            table,
            pk_rows,
            secondary_rows,
        })
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn pk_rows(&self) -> &[Row] {
        &self.pk_rows
    }

    pub fn secondary_rows(&self) -> Option<&[Row]> {
        self.secondary_rows.as_deref()
    }

    /// Cache keys of the pk rows, in row order.
    pub fn cache_keys(&self) -> CodecResult<Vec<RowKey>> {
        self.pk_rows
            .iter()
            .map(|row| build_key(self.table, row))
            .collect()
    }

    /// Cache keys of the secondary rows, if any.
    pub fn secondary_cache_keys(&self) -> CodecResult<Option<Vec<RowKey>>> {
        self.secondary_rows
            .as_ref()
            .map(|rows| rows.iter().map(|row| build_key(self.table, row)).collect())
            .transpose()
    }

    pub fn stream_comment(&self) -> CodecResult<Bytes> {
        build_stream_comment(self.table, &self.pk_rows, self.secondary_rows())
    }
}
