//! Row Codec Wire - Query Message Codec
//!
//! Decodes and encodes the query request documents handed over by the
//! transport. Decoding is schema-less and order-independent but strict:
//! unknown fields, wrong type tags, truncated buffers and over-deep nesting
//! are all rejected with `CodecError::MalformedWireMessage`.
//!
//! ```text
//! bytes ──► Reader::open_document ──► element loop ──► QueryMessage
//!                                        │
//!                                        └─► ValueDecoder (BindVariables)
//! ```

pub mod document;
mod query;

pub use document::{ElementType, LenWriter, Reader, ValueDecoder};
pub use query::QueryMessage;
