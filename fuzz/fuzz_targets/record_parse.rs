//! Fuzz target for WheelRecord::from_bytes with arbitrary byte input.
//!
//! This target exercises RECORD parsing with potentially malformed input.
//! Anything that parses must serialize to text that parses to the same
//! entries.
//!
//! Run with: cargo +nightly fuzz run record_parse

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(record) = wheelext::WheelRecord::from_bytes(data) else {
        return;
    };

    let text = record.to_record_string();
    let reparsed = wheelext::WheelRecord::parse(&text).expect("serialized RECORD must parse");
    assert_eq!(reparsed.len(), record.len());
    for (path, entry) in record.iter() {
        assert_eq!(reparsed.get(path), Some(entry), "entry for {:?} changed", path);
    }
});
