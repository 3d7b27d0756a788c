//! Fuzz test for stream comment escaping
//!
//! Renders arbitrary key values into a stream comment and checks that the
//! comment is closed exactly once, at its end.
//!
//! Run with: cargo +nightly fuzz run stream_comment_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use rowcodec_core::{Table, Value};
use rowcodec_rows::build_stream_comment;

fuzz_target!(|data: &[u8]| {
    let mut table = Table::with_version("fuzz", 1);
    table.add_column("k", "varbinary(255)");
    table.add_column("s", "varchar(255)");
    table.set_pk_columns(vec![0, 1]).expect("pk columns");

    let split = data.first().map_or(0, |&b| b as usize % (data.len() + 1));
    let (left, right) = data.split_at(split);
    let text = String::from_utf8_lossy(right).into_owned();
    let rows = vec![vec![Value::Bytes(left.to_vec()), Value::Text(text)]];

    let comment = build_stream_comment(&table, &rows, None).expect("text values always render");
    assert!(comment.ends_with(b"; */"), "comment must end with its terminator");

    let body = &comment[..comment.len() - 2];
    assert!(
        !body.windows(2).any(|w| w == b"*/"),
        "value closed the comment early"
    );
});
