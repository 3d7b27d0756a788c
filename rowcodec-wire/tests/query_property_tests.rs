//! Property-Based Tests for Query Message Round-Trip
//!
//! Property: for any query message, encode → decode SHALL produce an equal
//! message, and the encoded length prefix SHALL equal the buffer length.
//!
//! Also covers the strict-decode rules: unknown fields, wrong field types,
//! truncation and trailing bytes are all rejected.

use proptest::prelude::*;
use rowcodec_core::{BindVars, CodecConfig, CodecError, Value, WireError};
use rowcodec_test_utils::assertions::assert_malformed;
use rowcodec_test_utils::fixtures::update_user_message;
use rowcodec_test_utils::generators::arb_query_message;
use rowcodec_wire::QueryMessage;

// ============================================================================
// HAND-BUILT DOCUMENTS
// ============================================================================

/// Wrap raw elements in a document with its length prefix and terminator.
fn document(elements: &[u8]) -> Vec<u8> {
    let len = (elements.len() + 5) as i32;
    let mut out = len.to_le_bytes().to_vec();
    out.extend_from_slice(elements);
    out.push(0);
    out
}

fn element(tag: u8, name: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(payload);
    out
}

fn string_payload(value: &str) -> Vec<u8> {
    let mut out = ((value.len() + 1) as i32).to_le_bytes().to_vec();
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    out
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_query_roundtrip(message in arb_query_message()) {
        let bytes = message.encode().expect("encode");
        let declared = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        prop_assert_eq!(declared as usize, bytes.len());

        let decoded = QueryMessage::decode(&bytes).expect("decode");
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn prop_truncation_is_malformed(message in arb_query_message(), cut in 1usize..64) {
        let bytes = message.encode().expect("encode");
        let keep = bytes.len().saturating_sub(cut);
        let result = QueryMessage::decode(&bytes[..keep]);
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let _ = QueryMessage::decode(&bytes);
    }
}

// ============================================================================
// EXAMPLES
// ============================================================================

#[test]
fn test_fixture_roundtrip() {
    let message = update_user_message("42");
    let bytes = message.encode().expect("encode");
    assert_eq!(QueryMessage::decode(&bytes).expect("decode"), message);
}

#[test]
fn test_fields_in_any_order() {
    let mut elements = element(0x12, "SessionId", &7i64.to_le_bytes());
    elements.extend(element(0x02, "Sql", &string_payload("select 1")));
    elements.extend(element(0x10, "TransactionId", &3i32.to_le_bytes()));

    let decoded = QueryMessage::decode(&document(&elements)).expect("decode");
    assert_eq!(decoded.sql, "select 1");
    assert_eq!(decoded.session_id, 7);
    assert_eq!(decoded.transaction_id, 3);
    assert_eq!(decoded.connection_id, 0);
    assert!(decoded.bind_variables.is_empty());
}

#[test]
fn test_unknown_field_rejected() {
    let elements = element(0x12, "Shard", &1i64.to_le_bytes());
    let result = QueryMessage::decode(&document(&elements));
    assert_malformed(&result);
    assert_eq!(
        result.unwrap_err(),
        CodecError::MalformedWireMessage(WireError::UnrecognizedField {
            field: "Shard".to_string()
        })
    );
}

#[test]
fn test_null_bind_variables_is_empty() {
    let mut elements = element(0x02, "Sql", &string_payload("select 2"));
    elements.extend(element(0x0A, "BindVariables", &[]));

    let decoded = QueryMessage::decode(&document(&elements)).expect("decode");
    assert_eq!(decoded.bind_variables, BindVars::new());
}

#[test]
fn test_bind_variables_wrong_type_rejected() {
    let elements = element(0x02, "BindVariables", &string_payload("nope"));
    let result = QueryMessage::decode(&document(&elements));
    assert!(matches!(
        result,
        Err(CodecError::MalformedWireMessage(WireError::UnexpectedType { tag: 0x02, .. }))
    ));
}

#[test]
fn test_uint64_id_reinterpreted() {
    let elements = element(0x3F, "ConnectionId", &u64::MAX.to_le_bytes());
    let decoded = QueryMessage::decode(&document(&elements)).expect("decode");
    assert_eq!(decoded.connection_id, -1);
}

#[test]
fn test_trailing_bytes_and_prefix_decode() {
    let message = update_user_message("9");
    let mut bytes = message.encode().expect("encode").to_vec();
    let len = bytes.len();
    bytes.extend_from_slice(&[0xde, 0xad]);

    assert!(matches!(
        QueryMessage::decode(&bytes),
        Err(CodecError::MalformedWireMessage(WireError::TrailingBytes { count: 2 }))
    ));

    let (decoded, consumed) = QueryMessage::decode_prefix(&bytes).expect("prefix decode");
    assert_eq!(consumed, len);
    assert_eq!(decoded, message);
}

#[test]
fn test_message_limit_enforced() {
    let mut bind_variables = BindVars::new();
    bind_variables.insert("blob".to_string(), Value::Bytes(vec![7; 4096]));
    let bytes = QueryMessage::new("select :blob", bind_variables)
        .encode()
        .expect("encode");

    let config = CodecConfig {
        max_message_bytes: 1024,
        ..CodecConfig::default()
    };
    assert!(matches!(
        QueryMessage::decode_with(&bytes, &config),
        Err(CodecError::MalformedWireMessage(WireError::MessageTooLarge { limit: 1024, .. }))
    ));
}
