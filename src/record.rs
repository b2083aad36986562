//! The wheel `RECORD` manifest.
//!
//! `RECORD` lists every member of a wheel as `path,digest,length`, one entry
//! per line. The format has no quoting or escaping: a line must split into
//! exactly three comma-separated fields, so member paths containing a literal
//! comma cannot be represented and are rejected when loading.
//!
//! Entries keep their insertion order. Re-recording an existing path updates
//! the entry in place, so serializing a loaded record after updating a few
//! members only changes those members' lines.
//!
//! # Example
//!
//! ```rust
//! use wheelext::WheelRecord;
//!
//! let mut record = WheelRecord::parse("a.txt,sha256=AAA,3\nb.txt,sha256=BBB,4")?;
//! record.record_file("a.txt", b"xyz");
//!
//! assert_eq!(record.get("a.txt").unwrap().length(), "3");
//! assert_eq!(record.get("b.txt").unwrap().hash(), "sha256=BBB");
//! # Ok::<(), wheelext::Error>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::checksum::RecordHash;
use crate::{Error, Result};

/// The digest and length recorded for one member.
///
/// Both fields are kept as the text found in RECORD. Entries loaded from an
/// existing wheel may carry empty fields (RECORD conventionally lists itself
/// as `<dist-info>/RECORD,,`) or digests produced by other tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    hash: String,
    length: String,
}

impl RecordEntry {
    /// Creates an entry from raw RECORD fields.
    pub fn new(hash: impl Into<String>, length: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            length: length.into(),
        }
    }

    /// Creates a fresh SHA-256 entry describing `content`.
    pub fn for_content(content: &[u8]) -> Self {
        Self {
            hash: RecordHash::sha256(content).to_string(),
            length: content.len().to_string(),
        }
    }

    /// Returns the digest descriptor text, e.g. `sha256=...`.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns the decimal length text.
    pub fn length(&self) -> &str {
        &self.length
    }

    /// Parses the digest descriptor, if the entry has one.
    pub fn parsed_hash(&self) -> Option<RecordHash> {
        self.hash.parse().ok()
    }

    /// Returns true if this entry's digest and length both describe `content`.
    pub fn matches(&self, content: &[u8]) -> bool {
        self.length.parse::<usize>().ok() == Some(content.len())
            && self.parsed_hash().is_some_and(|h| h.matches(content))
    }
}

/// An in-memory `RECORD` manifest.
#[derive(Debug, Clone, Default)]
pub struct WheelRecord {
    entries: Vec<(String, RecordEntry)>,
    index: HashMap<String, usize>,
}

impl WheelRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses RECORD text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedManifest`] if a line does not split into
    /// exactly three comma-separated fields.
    pub fn parse(text: &str) -> Result<Self> {
        let mut record = Self::new();
        record.update_from_str(text)?;
        Ok(record)
    }

    /// Parses RECORD bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::InvalidManifest(e.to_string()))?;
        Self::parse(text)
    }

    /// Loads RECORD text into this record, overwriting entries for paths
    /// that are already present.
    ///
    /// Lines are validated before any entry is stored, so a malformed line
    /// leaves the record unchanged. A trailing `\r` on any line is dropped.
    pub fn update_from_str(&mut self, text: &str) -> Result<()> {
        let mut parsed = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let fields: Vec<&str> = line.split(',').collect();
            let &[path, hash, length] = fields.as_slice() else {
                return Err(Error::malformed_manifest(idx + 1, line));
            };
            parsed.push((path, RecordEntry::new(hash, length)));
        }
        for (path, entry) in parsed {
            self.insert(path, entry);
        }
        Ok(())
    }

    /// Merges another record into this one; its entries win on conflict.
    pub fn merge(&mut self, other: &WheelRecord) {
        for (path, entry) in other.iter() {
            self.insert(path, entry.clone());
        }
    }

    /// Records a fresh SHA-256 digest and length for `path`.
    pub fn record_file(&mut self, path: &str, content: &[u8]) {
        self.insert(path, RecordEntry::for_content(content));
    }

    /// Inserts or replaces the entry for `path`, keeping its original
    /// position if it was already present.
    pub fn insert(&mut self, path: &str, entry: RecordEntry) {
        match self.index.get(path) {
            Some(&idx) => self.entries[idx].1 = entry,
            None => {
                self.index.insert(path.to_string(), self.entries.len());
                self.entries.push((path.to_string(), entry));
            }
        }
    }

    /// Returns the entry for `path`.
    pub fn get(&self, path: &str) -> Option<&RecordEntry> {
        self.index.get(path).map(|&idx| &self.entries[idx].1)
    }

    /// Returns true if `path` has an entry.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(path, entry)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Serializes the record as RECORD text, one `\n`-terminated line per
    /// entry in record order.
    pub fn to_record_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WheelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, entry) in self.iter() {
            writeln!(f, "{},{},{}", path, entry.hash, entry.length)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_get() {
        let record = WheelRecord::parse("a.txt,sha256=AAA,3\nb.txt,sha256=BBB,4").unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a.txt"), Some(&RecordEntry::new("sha256=AAA", "3")));
        assert_eq!(record.get("b.txt").unwrap().length(), "4");
        assert!(record.get("c.txt").is_none());
    }

    #[test]
    fn test_parse_self_reference_line() {
        let record = WheelRecord::parse("pkg-1.0.dist-info/RECORD,,\n").unwrap();
        let entry = record.get("pkg-1.0.dist-info/RECORD").unwrap();
        assert_eq!(entry.hash(), "");
        assert_eq!(entry.length(), "");
        assert!(entry.parsed_hash().is_none());
    }

    #[test]
    fn test_parse_crlf() {
        let record = WheelRecord::parse("a.txt,sha256=AAA,3\r\nb.txt,sha256=BBB,4\r\n").unwrap();
        assert_eq!(record.get("b.txt").unwrap().length(), "4");
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = WheelRecord::parse("a.txt,sha256=AAA,3\nb.txt,sha256=BBB").unwrap_err();
        match err {
            Error::MalformedManifest { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "b.txt,sha256=BBB");
            }
            e => panic!("Expected MalformedManifest, got: {:?}", e),
        }
    }

    #[test]
    fn test_parse_rejects_comma_in_path() {
        let err = WheelRecord::parse("dir/a,b.txt,sha256=AAA,3").unwrap_err();
        assert!(matches!(err, Error::MalformedManifest { line_number: 1, .. }));
    }

    #[test]
    fn test_parse_strips_bare_carriage_return() {
        let record = WheelRecord::parse("a.txt,sha256=AAA,3\r\nb.txt,sha256=BBB,4\r").unwrap();
        assert_eq!(record.get("a.txt").unwrap().length(), "3");
        assert_eq!(record.get("b.txt").unwrap().length(), "4");

        let reparsed = WheelRecord::parse(&record.to_record_string()).unwrap();
        assert_eq!(reparsed.get("b.txt"), record.get("b.txt"));
        assert_eq!(reparsed.to_record_string(), "a.txt,sha256=AAA,3\nb.txt,sha256=BBB,4\n");
    }

    #[test]
    fn test_parse_rejects_blank_line() {
        let err = WheelRecord::parse("a.txt,sha256=AAA,3\n\nb.txt,sha256=BBB,4").unwrap_err();
        assert!(matches!(err, Error::MalformedManifest { line_number: 2, .. }));
    }

    #[test]
    fn test_failed_update_leaves_record_unchanged() {
        let mut record = WheelRecord::parse("a.txt,sha256=AAA,3").unwrap();
        assert!(record.update_from_str("a.txt,sha256=ZZZ,9\nbad").is_err());
        assert_eq!(record.get("a.txt").unwrap().hash(), "sha256=AAA");
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let err = WheelRecord::from_bytes(&[0x61, 0xff, 0x2c]).unwrap_err();
        assert!(matches!(err, Error::InvalidManifest(_)));
    }

    #[test]
    fn test_record_file_overwrites_in_place() {
        let mut record = WheelRecord::parse("a.txt,sha256=AAA,3\nb.txt,sha256=BBB,4").unwrap();
        record.record_file("a.txt", b"xyz");

        let paths: Vec<_> = record.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["a.txt", "b.txt"]);

        let entry = record.get("a.txt").unwrap();
        assert_eq!(entry.hash(), RecordHash::sha256(b"xyz").to_string());
        assert_eq!(entry.length(), "3");
        assert!(entry.matches(b"xyz"));
        assert_eq!(record.get("b.txt").unwrap().hash(), "sha256=BBB");
    }

    #[test]
    fn test_record_file_appends_new_path() {
        let mut record = WheelRecord::parse("a.txt,sha256=AAA,3").unwrap();
        record.record_file("new/file.py", b"");
        let paths: Vec<_> = record.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, ["a.txt", "new/file.py"]);
        assert_eq!(record.get("new/file.py").unwrap().length(), "0");
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = WheelRecord::parse("a.txt,sha256=AAA,3\nb.txt,sha256=BBB,4").unwrap();
        let other = WheelRecord::parse("b.txt,sha256=CCC,5\nc.txt,sha256=DDD,6").unwrap();
        base.merge(&other);

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("b.txt"), Some(&RecordEntry::new("sha256=CCC", "5")));
        assert!(base.contains("c.txt"));
    }

    #[test]
    fn test_serialize_order_is_stable() {
        let text = "b.txt,sha256=BBB,4\na.txt,sha256=AAA,3\n";
        let record = WheelRecord::parse(text).unwrap();
        assert_eq!(record.to_record_string(), text);
        assert_eq!(WheelRecord::parse(&record.to_string()).unwrap().len(), 2);
    }

    #[test]
    fn test_entry_matches_checks_length() {
        let good = RecordEntry::for_content(b"hello");
        assert!(good.matches(b"hello"));

        let wrong_length = RecordEntry::new(good.hash(), "6");
        assert!(!wrong_length.matches(b"hello"));
    }

    #[test]
    fn test_empty_record() {
        let record = WheelRecord::parse("").unwrap();
        assert!(record.is_empty());
        assert_eq!(record.to_string(), "");
    }
}
