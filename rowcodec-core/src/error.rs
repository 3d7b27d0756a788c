//! Error types for row codec operations

use thiserror::Error;

/// Wire decoding and encoding errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Buffer truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Invalid length {len} for {what}")]
    InvalidLength { what: &'static str, len: i64 },

    #[error("Document not terminated by a zero byte")]
    MissingTerminator,

    #[error("Unrecognized field: {field}")]
    UnrecognizedField { field: String },

    #[error("Unexpected type tag 0x{tag:02x} for field {field}")]
    UnexpectedType { field: String, tag: u8 },

    #[error("Unsupported element type 0x{tag:02x} for key {key}")]
    UnsupportedElement { key: String, tag: u8 },

    #[error("Element name is not a terminated C string")]
    InvalidCString,

    #[error("Invalid UTF-8 in {what}")]
    InvalidUtf8 { what: String },

    #[error("Documents nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("Message of {len} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { len: usize, limit: usize },

    #[error("{count} trailing bytes after document")]
    TrailingBytes { count: usize },

    #[error("Name contains a NUL byte: {name:?}")]
    NulInName { name: String },

    #[error("Document length {len} does not fit in a 32-bit prefix")]
    LengthOverflow { len: usize },
}

/// Row specification consistency errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowSpecError {
    #[error("Empty list in value spec at column {column}")]
    EmptyRowList { column: usize },

    #[error("Mismatched list lengths in value spec: expected {expected}, got {got} at column {column}")]
    MismatchedRowLists {
        column: usize,
        expected: usize,
        got: usize,
    },

    #[error("Row length mismatch: expected {expected} columns, got {got}")]
    RowLengthMismatch { expected: usize, got: usize },

    #[error("Column index {index} out of range for table {table} with {len} columns")]
    ColumnOutOfRange {
        table: String,
        index: usize,
        len: usize,
    },

    #[error("No rows to render for table {table}")]
    NoRows { table: String },
}

/// Numeric coercion errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("Invalid number {text:?}: {reason}")]
    InvalidNumber { text: String, reason: String },

    #[error("Empty string cannot be converted to a number")]
    EmptyNumber,
}

/// SQL-literal and stream comment encoding errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Type {value_type} disallowed for {} pk columns", classification(.numeric))]
    DisallowedType {
        value_type: &'static str,
        numeric: bool,
    },

    #[error("Identifier {name:?} would terminate the stream comment")]
    UnsafeIdentifier { name: String },
}

fn classification(numeric: &bool) -> &'static str {
    if *numeric {
        "numeric"
    } else {
        "non-numeric"
    }
}

/// Schema catalog errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Column index {index} out of range for table {table} with {len} columns")]
    ColumnOutOfRange {
        table: String,
        index: usize,
        len: usize,
    },

    #[error("Table {table} has no indexes")]
    NoIndexes { table: String },

    #[error("Schema registry lock poisoned")]
    LockPoisoned,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse failure classification reported alongside every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedWireMessage,
    UnresolvedBindVariable,
    InconsistentRowSpec,
    TypeCoercionFailure,
    EncodingFailure,
    DecodeFailure,
    Schema,
    Config,
}

/// Master error type for all row codec errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed wire message: {0}")]
    MalformedWireMessage(#[from] WireError),

    #[error("No bind var found for {name}")]
    UnresolvedBindVariable { name: String },

    #[error("Inconsistent row spec: {0}")]
    InconsistentRowSpec(#[from] RowSpecError),

    #[error("Type coercion failure: {0}")]
    TypeCoercion(#[from] CoercionError),

    #[error("Encoding failure: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Decode failure: {reason}")]
    Decode { reason: String },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CodecError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::MalformedWireMessage(_) => ErrorKind::MalformedWireMessage,
            CodecError::UnresolvedBindVariable { .. } => ErrorKind::UnresolvedBindVariable,
            CodecError::InconsistentRowSpec(_) => ErrorKind::InconsistentRowSpec,
            CodecError::TypeCoercion(_) => ErrorKind::TypeCoercionFailure,
            CodecError::Encoding(_) => ErrorKind::EncodingFailure,
            CodecError::Decode { .. } => ErrorKind::DecodeFailure,
            CodecError::Schema(_) => ErrorKind::Schema,
            CodecError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Result type alias for row codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

// =============================================================================
// TESTS
// =============================================================================
