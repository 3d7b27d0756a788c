//! Row Codec Core - Values, Errors and Schema Snapshots
//!
//! Shared vocabulary for the per-shard row codec:
//! - `Value`: the closed set of cell and bind-variable shapes
//! - `CodecError`: the error taxonomy every fallible operation reports
//! - `Table` / `Index`: schema snapshots consumed read-only per request
//! - `SchemaRegistry`: publishes snapshots so reloads never mutate in place
//! - `CodecConfig`: decoder safety limits

mod config;
mod error;
mod registry;
mod schema;
mod value;

pub use config::*;
pub use error::*;
pub use registry::SchemaRegistry;
pub use schema::{Index, Table};
pub use value::{BindVars, Row, Value};
