//! Row Codec Test Utilities
//!
//! Shared test infrastructure for the row codec workspace:
//! - Proptest generators for values, bind variables and query messages
//! - Schema fixtures for common table shapes
//! - Assertions on the error taxonomy

pub use rowcodec_core::{BindVars, CodecError, CodecResult, ErrorKind, Row, Table, Value};
pub use rowcodec_wire::QueryMessage;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for the row codec value model.

    use super::*;
    use proptest::prelude::*;

    /// A bind variable or field name: non-empty, no NUL bytes.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-zA-Z_][a-zA-Z0-9_]{0,15}"
    }

    /// Any non-list value.
    pub fn arb_scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::Int),
            any::<u64>().prop_map(Value::Uint),
            ".{0,24}".prop_map(Value::Text),
            proptest::collection::vec(any::<u8>(), 0..24).prop_map(Value::Bytes),
            Just(Value::Absent),
        ]
    }

    /// Any value, with lists nested at most three levels deep.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        arb_scalar_value().prop_recursive(3, 32, 6, |inner| {
            proptest::collection::vec(inner, 0..6).prop_map(Value::List)
        })
    }

    /// A bind variable mapping of up to eight entries.
    pub fn arb_bind_vars() -> impl Strategy<Value = BindVars> {
        proptest::collection::btree_map(arb_name(), arb_value(), 0..8)
    }

    /// A query message with arbitrary SQL, bind variables and ids.
    pub fn arb_query_message() -> impl Strategy<Value = QueryMessage> {
        (
            ".{0,64}",
            arb_bind_vars(),
            any::<i64>(),
            any::<i64>(),
            any::<i64>(),
        )
            .prop_map(
                |(sql, bind_variables, transaction_id, connection_id, session_id)| QueryMessage {
                    sql,
                    bind_variables,
                    transaction_id,
                    connection_id,
                    session_id,
                },
            )
    }

    /// A textual integer literal in any accepted radix, paired with its value.
    pub fn arb_number_literal() -> impl Strategy<Value = (String, u64)> {
        any::<u64>().prop_flat_map(|n| {
            prop_oneof![
                Just((n.to_string(), n)),
                Just((format!("0x{:x}", n), n)),
                Just((format!("0X{:X}", n), n)),
                Just((format!("0o{:o}", n), n)),
                Just((format!("0b{:b}", n), n)),
            ]
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built schema snapshots and messages.

    use super::*;

    /// `users(id bigint, name varchar(128), email varchar(255))` keyed on `id`.
    pub fn users_table() -> Table {
        let mut table = Table::with_version("users", 1);
        table.add_column("id", "bigint(20)");
        table.add_column("name", "varchar(128)");
        table.add_column("email", "varchar(255)");
        table
            .add_index("PRIMARY")
            .add_column("id");
        table
            .set_pk_from_primary_index()
            .expect("users primary index resolves");
        table
    }

    /// `order_lines(region varchar, order_id int unsigned, line smallint,
    /// note text)` keyed on `(region, order_id, line)`.
    pub fn order_lines_table() -> Table {
        let mut table = Table::with_version("order_lines", 1);
        table.add_column("region", "varchar(8)");
        table.add_column("order_id", "int(10) unsigned");
        table.add_column("line", "smallint");
        table.add_column("note", "text");
        let primary = table.add_index("PRIMARY");
        primary.add_column("region");
        primary.add_column("order_id");
        primary.add_column("line");
        table
            .set_pk_from_primary_index()
            .expect("order_lines primary index resolves");
        table
    }

    /// A single-row update of `users` by id.
    pub fn update_user_message(id: &str) -> QueryMessage {
        let mut bind_variables = BindVars::new();
        bind_variables.insert("id".to_string(), Value::from(id));
        bind_variables.insert("name".to_string(), Value::from("ada"));
        QueryMessage {
            sql: "update users set name = :name where id = :id".to_string(),
            bind_variables,
            transaction_id: 11,
            connection_id: 22,
            session_id: 33,
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on the error taxonomy.

    use super::*;

    /// Assert that a result failed with the given kind.
    pub fn assert_kind<T: std::fmt::Debug>(result: &CodecResult<T>, kind: ErrorKind) {
        match result {
            Err(err) => assert_eq!(err.kind(), kind, "wrong error kind for {}", err),
            Ok(value) => panic!("Expected {:?} error, got Ok: {:?}", kind, value),
        }
    }

    pub fn assert_malformed<T: std::fmt::Debug>(result: &CodecResult<T>) {
        assert_kind(result, ErrorKind::MalformedWireMessage);
    }

    pub fn assert_unresolved<T: std::fmt::Debug>(result: &CodecResult<T>, name: &str) {
        match result {
            Err(CodecError::UnresolvedBindVariable { name: got }) => {
                assert_eq!(got, name, "wrong unresolved bind variable")
            }
            other => panic!("Expected UnresolvedBindVariable, got {:?}", other),
        }
    }
}
