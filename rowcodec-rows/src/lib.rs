//! Row Codec Rows - Primary Key Rows, Cache Keys and Stream Comments
//!
//! Turns value specs and bind variables into the artifacts a statement
//! builder needs:
//! - `resolve`: expand specs into row matrices, substituting `:name` refs
//! - `normalize`: coerce textual cells in numeric columns to integers
//! - `encode`: SQL-literal rendering with comment-safe escaping
//! - `key`: cache keys per pk tuple
//! - `stream`: the `/* _stream ... */` annotation
//!
//! `PkRowSet` runs the whole pipeline for one request.

pub mod encode;
pub mod key;
pub mod normalize;
mod plan;
pub mod resolve;
pub mod stream;

pub use encode::{base64_decode, encode_pk_value, encode_sql_value};
pub use key::{build_key, build_keys, RowKey};
pub use normalize::{normalize_pk_rows, normalize_rows, to_number};
pub use plan::PkRowSet;
pub use resolve::{build_secondary_list, build_value_list, resolve_value};
pub use stream::build_stream_comment;
