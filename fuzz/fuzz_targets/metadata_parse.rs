//! Fuzz target for MetadataFile parsing with arbitrary string input.
//!
//! Parsing never fails, so this looks for panics and checks that
//! serialization is a fixed point after one pass.
//!
//! Run with: cargo +nightly fuzz run metadata_parse

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut metadata) = wheelext::MetadataFile::from_bytes(data) else {
        return;
    };
    metadata.strip_sentinels();

    let once = metadata.to_string();
    let twice = wheelext::MetadataFile::parse(&once).to_string();
    assert_eq!(once, twice);
});
