//! Shared test utilities for integration tests.
//!
//! This module provides common helper functions used across multiple test files.
//! Wheel creation helpers are consolidated here to avoid duplication.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use wheelext::WheelRecord;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Dist-info directory used by the sample wheels.
pub const DIST_INFO: &str = "example_proj-0.1.dist-info";

/// METADATA as a build backend without extra-field support writes it.
pub const SAMPLE_METADATA: &str = "\
Metadata-Version: 2.1
Name: example-proj
Version: 0.1
Summary: example summary
Author: Wim Glenn
Author-email: hey@wimglenn.com
License: MIT
Project-URL: homepage, https://example.org/
Platform: UNKNOWN
Description-Content-Type: text/x-rst

this is the first line of the README.rst file
this is the second line of the README.rst file
";

/// Creates an in-memory zip archive with the given members, in order.
///
/// Members are stored uncompressed with the default zip options.
pub fn create_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    create_zip_with_options(entries, FileOptions::default().compression_method(CompressionMethod::Stored))
}

/// Creates an in-memory zip archive, writing every member with `options`.
pub fn create_zip_with_options(entries: &[(&str, &[u8])], options: FileOptions) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, options).expect("Failed to start member");
        writer.write_all(data).expect("Failed to write member");
    }
    writer.finish().expect("Failed to finish archive").into_inner()
}

/// Creates an in-memory wheel.
///
/// `members` are written first, followed by `<dist-info>/METADATA` and a
/// RECORD that correctly describes every member (and lists itself as
/// `RECORD,,`).
pub fn create_wheel(members: &[(&str, &[u8])], metadata: &str) -> Vec<u8> {
    let metadata_path = format!("{}/METADATA", DIST_INFO);
    let record_path = format!("{}/RECORD", DIST_INFO);

    let mut entries: Vec<(String, Vec<u8>)> = members
        .iter()
        .map(|(name, data)| (name.to_string(), data.to_vec()))
        .collect();
    entries.push((metadata_path, metadata.as_bytes().to_vec()));

    let mut record = WheelRecord::new();
    for (name, data) in &entries {
        record.record_file(name, data);
    }
    record.insert(&record_path, wheelext::RecordEntry::new("", ""));
    entries.push((record_path, record.to_record_string().into_bytes()));

    let borrowed: Vec<(&str, &[u8])> = entries
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();
    create_zip(&borrowed)
}

/// Creates the sample wheel used across tests.
pub fn create_sample_wheel() -> Vec<u8> {
    create_wheel(
        &[
            ("example_proj/__init__.py", b"VERSION = '0.1'\n" as &[u8]),
            ("example_proj/data/table.csv", b"a,b,c\n1,2,3\n"),
        ],
        SAMPLE_METADATA,
    )
}

/// Writes wheel bytes to `dir/name` and returns the path.
pub fn write_wheel_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write wheel");
    path
}

/// Reads every member of an archive as `(name, content)` in archive order.
pub fn read_members(archive_bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes)).expect("Failed to open archive");
    let mut members = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let mut file = archive.by_index(idx).expect("Failed to read member");
        let mut content = Vec::new();
        file.read_to_end(&mut content).expect("Failed to read content");
        members.push((file.name().to_string(), content));
    }
    members
}

/// Reads one member's content, or `None` if the archive has no such member.
pub fn read_member(archive_bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    read_members(archive_bytes)
        .into_iter()
        .find(|(member, _)| member == name)
        .map(|(_, content)| content)
}

/// Reads the member names of an archive in archive order.
pub fn member_names(archive_bytes: &[u8]) -> Vec<String> {
    read_members(archive_bytes)
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}
