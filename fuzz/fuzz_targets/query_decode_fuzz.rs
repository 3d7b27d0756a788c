//! Fuzz test for the query message decoder
//!
//! Feeds arbitrary bytes to the decoder to find:
//! - Panics on malformed or truncated documents
//! - Out-of-bounds reads from hostile length prefixes
//! - Unbounded recursion through nested arrays
//!
//! Run with: cargo +nightly fuzz run query_decode_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use rowcodec_wire::QueryMessage;

fuzz_target!(|data: &[u8]| {
    // Decoding must return an error, never panic
    if let Ok((message, consumed)) = QueryMessage::decode_prefix(data) {
        assert!(consumed <= data.len(), "consumed past the end of the input");

        // Anything accepted must survive a re-encode
        let encoded = message.encode().expect("re-encode decoded message");
        let again = QueryMessage::decode(&encoded).expect("decode re-encoded message");
        assert_eq!(again, message, "re-encoded message differs");
    }
});
