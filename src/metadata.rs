//! Core metadata (`METADATA`) header blocks.
//!
//! A wheel's `<dist-info>/METADATA` member is a block of `Name: value`
//! header lines, terminated by an empty line and followed by a free-text
//! body (usually the long description). Header names are case-insensitive
//! and may repeat.
//!
//! [`MetadataFile`] parses such a block, drops fields that only carry the
//! `UNKNOWN` placeholder, merges in additional fields, and serializes the
//! result without folding long lines.
//!
//! # Example
//!
//! ```rust
//! use wheelext::{ExtraMetadata, MetadataFile};
//!
//! let mut metadata = MetadataFile::parse("Metadata-Version: 2.1\nName: demo\nPlatform: UNKNOWN\n\nBody\n");
//! metadata.strip_sentinels();
//!
//! let mut extra = ExtraMetadata::new();
//! extra.insert("Requires-External", ["C"]);
//! metadata.merge_additional(&extra);
//!
//! assert_eq!(
//!     metadata.to_string(),
//!     "Metadata-Version: 2.1\nName: demo\nRequires-External: C\n\nBody\n"
//! );
//! ```

use std::fmt;

use crate::config::ExtraMetadata;
use crate::{Error, Result};

/// Placeholder value older setuptools releases write for unset fields.
pub const SENTINEL: &str = "UNKNOWN";

/// Identity fields that are kept even when their value is [`SENTINEL`].
pub const PROTECTED_FIELDS: [&str; 3] = ["Metadata-Version", "Name", "Version"];

/// One `Name: value` header occurrence.
///
/// Multi-line values keep their continuation lines, joined with `\n` and
/// with the original leading whitespace of each continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    /// Creates a header occurrence.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the header name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the header value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true if this header has the given name, ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A parsed `METADATA` header block and its body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFile {
    headers: Vec<Header>,
    body: String,
}

impl MetadataFile {
    /// Parses a header block.
    ///
    /// The header section ends at the first empty line; everything after it
    /// is the body, kept verbatim. A line that is neither a header nor a
    /// continuation also ends the header section and becomes the first line
    /// of the body. Parsing never fails.
    pub fn parse(text: &str) -> Self {
        let mut headers: Vec<Header> = Vec::new();
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if content.is_empty() {
                offset += line.len();
                break;
            }
            if content.starts_with([' ', '\t']) {
                if let Some(last) = headers.last_mut() {
                    last.value.push('\n');
                    last.value.push_str(content);
                    offset += line.len();
                    continue;
                }
                break;
            }
            match split_header(content) {
                Some(header) => headers.push(header),
                None => break,
            }
            offset += line.len();
        }

        Self {
            headers,
            body: text[offset..].to_string(),
        }
    }

    /// Parses `METADATA` bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| Error::InvalidMetadata(e.to_string()))?;
        Ok(Self::parse(text))
    }

    /// Returns all header occurrences in order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Returns the body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns every value recorded under `name`, ignoring ASCII case.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| h.is_named(name))
            .map(Header::value)
            .collect()
    }

    /// Returns the first value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|h| h.is_named(name)).map(Header::value)
    }

    /// Appends a header occurrence after the existing ones.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(Header::new(name, value));
    }

    /// Removes every occurrence of `name`, returning how many were removed.
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.headers.len();
        self.headers.retain(|h| !h.is_named(name));
        before - self.headers.len()
    }

    /// Drops fields whose only value is [`SENTINEL`].
    ///
    /// A field repeated several times is kept even if every occurrence is the
    /// sentinel, and [`PROTECTED_FIELDS`] are never dropped. Returns the names
    /// of the removed fields.
    pub fn strip_sentinels(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for header in &self.headers {
            let lower = header.name.to_ascii_lowercase();
            if !seen.contains(&lower) {
                seen.push(lower);
                if self.get_all(&header.name) == [SENTINEL]
                    && !PROTECTED_FIELDS.iter().any(|p| header.is_named(p))
                {
                    removed.push(header.name.clone());
                }
            }
        }
        for name in &removed {
            log::debug!("Dropping placeholder field {}: {}", name, SENTINEL);
            self.remove_all(name);
        }
        removed
    }

    /// Appends each additional value that is not already present under its
    /// field name.
    ///
    /// Fields are visited in `additions` order and values in list order.
    /// Names compare case-insensitively, values exactly, so merging the same
    /// additions twice changes nothing the second time. Returns the number
    /// of header lines added.
    pub fn merge_additional(&mut self, additions: &ExtraMetadata) -> usize {
        let mut added = 0;
        for (name, values) in additions.iter() {
            for value in values {
                if !self.get_all(name).contains(&value.as_str()) {
                    self.add_header(name, value.as_str());
                    added += 1;
                }
            }
        }
        added
    }

    /// Serializes the header block to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for MetadataFile {
    /// Writes `name: value` lines without folding, an empty line, then the
    /// body verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for header in &self.headers {
            writeln!(f, "{}: {}", header.name, header.value)?;
        }
        writeln!(f)?;
        f.write_str(&self.body)
    }
}

/// Splits a `Name: value` line, or returns `None` if the line is not a header.
fn split_header(line: &str) -> Option<Header> {
    let (name, value) = line.split_once(':')?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic()) {
        return None;
    }
    Some(Header::new(name, value.trim_start_matches([' ', '\t'])))
}
