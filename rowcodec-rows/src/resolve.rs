//! Expansion of value specifications into row matrices.

use rowcodec_core::{BindVars, CodecError, CodecResult, Row, RowSpecError, Value};

/// Substitute a `:name` reference from `bind_vars`; other values pass
/// through unchanged.
pub fn resolve_value(value: &Value, bind_vars: &BindVars) -> CodecResult<Value> {
    match value.as_bind_ref() {
        Some(name) => bind_vars
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::UnresolvedBindVariable {
                name: format!(":{}", name),
            }),
        None => Ok(value.clone()),
    }
}

/// Expand one spec per column into a row-major matrix.
///
/// A `List` spec supplies one entry per row; every list must have the same,
/// non-zero length, which becomes the row count. Scalar specs are repeated
/// in every row. Without any list the result is a single row.
pub fn build_value_list(pk_specs: &[Value], bind_vars: &BindVars) -> CodecResult<Vec<Row>> {
    let mut row_count: Option<usize> = None;
    for (column, spec) in pk_specs.iter().enumerate() {
        if let Value::List(list) = spec {
            match row_count {
                None if list.is_empty() => {
                    return Err(RowSpecError::EmptyRowList { column }.into());
                }
                None => row_count = Some(list.len()),
                Some(expected) if expected != list.len() => {
                    return Err(RowSpecError::MismatchedRowLists {
                        column,
                        expected,
                        got: list.len(),
                    }
                    .into());
                }
                Some(_) => {}
            }
        }
    }

    let row_count = row_count.unwrap_or(1);
    let mut rows = Vec::with_capacity(row_count);
    for i in 0..row_count {
        let row = pk_specs
            .iter()
            .map(|spec| match spec {
                Value::List(list) => resolve_value(&list[i], bind_vars),
                scalar => resolve_value(scalar, bind_vars),
            })
            .collect::<CodecResult<Row>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Build the rows for a secondary (update) spec, one per `pk_rows` row.
///
/// An `Absent` spec keeps the corresponding pk cell; anything else is
/// resolved once and used for every row. Returns `None` when there is no
/// secondary spec.
pub fn build_secondary_list(
    pk_rows: &[Row],
    secondary_specs: Option<&[Value]>,
    bind_vars: &BindVars,
) -> CodecResult<Option<Vec<Row>>> {
    let Some(specs) = secondary_specs else {
        return Ok(None);
    };

    let mut rows = Vec::with_capacity(pk_rows.len());
    for pk_row in pk_rows {
        if pk_row.len() != specs.len() {
            return Err(RowSpecError::RowLengthMismatch {
                expected: pk_row.len(),
                got: specs.len(),
            }
            .into());
        }
        let row = pk_row
            .iter()
            .zip(specs)
            .map(|(cell, spec)| match spec {
                Value::Absent => Ok(cell.clone()),
                spec => resolve_value(spec, bind_vars),
            })
            .collect::<CodecResult<Row>>()?;
        rows.push(row);
    }
    Ok(Some(rows))
}
