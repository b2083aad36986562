//! Digest computation for RECORD entries.
//!
//! Wheels list every member in `RECORD` with a digest descriptor of the form
//! `<algorithm>=<urlsafe-base64-digest>`, where the base64 text has its
//! trailing `=` padding stripped. This crate always records SHA-256.
//!
//! # Example
//!
//! ```rust
//! use wheelext::checksum::{Checksum, RecordHash, Sha256};
//!
//! // Incremental computation
//! let mut hasher = Sha256::new();
//! hasher.update(b"Hello, ");
//! hasher.update(b"World!");
//! let digest = hasher.finalize();
//!
//! // One-shot computation straight to a RECORD descriptor
//! let hash = RecordHash::sha256(b"Hello, World!");
//! assert_eq!(hash.algorithm(), "sha256");
//! assert_eq!(hash.digest_bytes().as_deref(), Some(&digest[..]));
//! ```

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::Digest;

/// Algorithm tag written into newly recorded RECORD entries.
pub const RECORD_ALGORITHM: &str = "sha256";

/// Common trait for digest computation.
pub trait Checksum: Default + Clone {
    /// The output type of this checksum.
    type Output: AsRef<[u8]> + Eq + fmt::Debug;

    /// Creates a new checksum calculator.
    fn new() -> Self;

    /// Updates the checksum with additional data.
    fn update(&mut self, data: &[u8]);

    /// Finishes the checksum computation and returns the value.
    fn finalize(&self) -> Self::Output;

    /// Resets the checksum to its initial state.
    fn reset(&mut self);

    /// Computes the checksum of a single slice in one call.
    fn compute(data: &[u8]) -> Self::Output {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

/// SHA-256 calculator used for RECORD digests.
#[derive(Clone, Default)]
pub struct Sha256 {
    hasher: sha2::Sha256,
}

impl fmt::Debug for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha256").finish_non_exhaustive()
    }
}

impl Checksum for Sha256 {
    type Output = [u8; 32];

    fn new() -> Self {
        Self {
            hasher: sha2::Sha256::new(),
        }
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.hasher.clone().finalize());
        out
    }

    fn reset(&mut self) {
        sha2::Digest::reset(&mut self.hasher);
    }
}

/// A RECORD digest descriptor, `<algorithm>=<encoded-digest>`.
///
/// Parsing is lenient: RECORD files routinely contain entries this crate did
/// not produce, so the encoded part is kept as text and only decoded on
/// request through [`digest_bytes`](Self::digest_bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordHash {
    algorithm: String,
    encoded: String,
}

impl RecordHash {
    /// Computes the SHA-256 descriptor for `data`.
    pub fn sha256(data: &[u8]) -> Self {
        Self {
            algorithm: RECORD_ALGORITHM.to_string(),
            encoded: URL_SAFE_NO_PAD.encode(Sha256::compute(data)),
        }
    }

    /// Returns the algorithm tag, e.g. `sha256`.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the urlsafe base64 digest without padding.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Decodes the digest, or `None` if the encoded text is not valid base64.
    pub fn digest_bytes(&self) -> Option<Vec<u8>> {
        URL_SAFE_NO_PAD
            .decode(self.encoded.trim_end_matches('='))
            .ok()
    }

    /// Returns true if this descriptor describes `data`.
    ///
    /// Descriptors for algorithms other than SHA-256 never match.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.algorithm.eq_ignore_ascii_case(RECORD_ALGORITHM)
            && self.digest_bytes().as_deref() == Some(&Sha256::compute(data)[..])
    }
}

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.algorithm, self.encoded)
    }
}

impl FromStr for RecordHash {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((algorithm, encoded)) if !algorithm.is_empty() => Ok(Self {
                algorithm: algorithm.to_string(),
                encoded: encoded.to_string(),
            }),
            _ => Err(format!("not an <algorithm>=<digest> descriptor: {s:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty() {
        let hash = RecordHash::sha256(b"");
        assert_eq!(
            hash.to_string(),
            "sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU"
        );
    }

    #[test]
    fn test_sha256_has_no_padding() {
        let inputs: [&[u8]; 4] = [b"a", b"xyz", b"hello world", &[0u8; 1000]];
        for data in inputs {
            let hash = RecordHash::sha256(data);
            assert!(!hash.encoded().ends_with('='));
            assert_eq!(hash.encoded().len(), 43);
        }
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = Sha256::new();
        hasher.update(b"Hello, ");
        hasher.update(b"World!");
        assert_eq!(hasher.finalize(), Sha256::compute(b"Hello, World!"));

        hasher.reset();
        assert_eq!(hasher.finalize(), Sha256::compute(b""));
    }

    #[test]
    fn test_matches() {
        let hash = RecordHash::sha256(b"xyz");
        assert!(hash.matches(b"xyz"));
        assert!(!hash.matches(b"xyzz"));

        let parsed: RecordHash = hash.to_string().parse().unwrap();
        assert_eq!(parsed, hash);
        assert!(parsed.matches(b"xyz"));
    }

    #[test]
    fn test_parse_foreign_descriptor() {
        let hash: RecordHash = "sha256=AAA".parse().unwrap();
        assert_eq!(hash.algorithm(), "sha256");
        assert_eq!(hash.encoded(), "AAA");
        assert!(!hash.matches(b"xyz"));

        let other: RecordHash = "md5=abc".parse().unwrap();
        assert!(!other.matches(b""));
    }

    #[test]
    fn test_parse_rejects_non_descriptor() {
        assert!("".parse::<RecordHash>().is_err());
        assert!("sha256".parse::<RecordHash>().is_err());
        assert!("=abc".parse::<RecordHash>().is_err());
    }
}
