//! Error types for wheel rewriting.
//!
//! This module provides the [`Error`] enum which represents every failure mode
//! of reading, overlaying and re-emitting a wheel, along with a convenient
//! [`Result<T>`] type alias.
//!
//! None of these errors are transient: all inputs are local, already
//! materialized data, so nothing is retried internally and every error
//! propagates to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use wheelext::{Error, ExtraMetadata, rewrite_wheel};
//!
//! fn patch(path: &str, extra: &ExtraMetadata) -> wheelext::Result<()> {
//!     match rewrite_wheel(path, extra) {
//!         Ok(_) => Ok(()),
//!         Err(Error::AmbiguousOrMissingDistInfo { candidates }) => {
//!             eprintln!("not a wheel? dist-info candidates: {:?}", candidates);
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

/// Helper struct for formatting AmbiguousOrMissingDistInfo error messages.
struct DistInfoDisplay<'a>(&'a [String]);

impl std::fmt::Display for DistInfoDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expected exactly one .dist-info directory, found {}",
            self.0.len()
        )?;
        if !self.0.is_empty() {
            write!(f, ": {}", self.0.join(", "))?;
        }
        Ok(())
    }
}

/// The main error type for wheel operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`Zip`][Self::Zip] | File system or container errors |
/// | Layout | [`AmbiguousOrMissingDistInfo`][Self::AmbiguousOrMissingDistInfo] | Not a wheel, or a wheel with several dist-info directories |
/// | Members | [`MemberNotFound`][Self::MemberNotFound], [`MissingMemberMetadata`][Self::MissingMemberMetadata] | Reads or writes of unknown members |
/// | Contents | [`MalformedManifest`][Self::MalformedManifest], [`InvalidManifest`][Self::InvalidManifest], [`InvalidMetadata`][Self::InvalidMetadata] | Unusable RECORD or METADATA bytes |
/// | Configuration | [`ConfigParse`][Self::ConfigParse], [`InvalidConfig`][Self::InvalidConfig] | Bad pyproject input |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading the source or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container could not be read or written.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A RECORD line did not split into exactly three comma-separated fields.
    ///
    /// RECORD lines carry no escaping, so a member path containing a literal
    /// comma also ends up here.
    #[error("Malformed RECORD line {line_number}: {line:?}")]
    MalformedManifest {
        /// One-based line number within the RECORD text.
        line_number: usize,
        /// The offending line.
        line: String,
    },

    /// The RECORD member is not valid UTF-8.
    #[error("Invalid RECORD contents: {0}")]
    InvalidManifest(String),

    /// Zero or several `*.dist-info/METADATA` members were found.
    ///
    /// The dist-info directory is required to locate the RECORD member, so
    /// emission stops before any output is written.
    #[error("{}", DistInfoDisplay(.candidates))]
    AmbiguousOrMissingDistInfo {
        /// The dist-info directories that were found.
        candidates: Vec<String>,
    },

    /// A member was read that is neither staged nor present in the source.
    #[error("Member not found: {path}")]
    MemberNotFound {
        /// The requested member path.
        path: String,
    },

    /// A new member was staged without member options.
    #[error("Cannot write {path}: no existing member to take options from")]
    MissingMemberMetadata {
        /// The member path that was being written.
        path: String,
    },

    /// The METADATA member is not valid UTF-8.
    #[error("Invalid METADATA contents: {0}")]
    InvalidMetadata(String),

    /// The pyproject document is not valid TOML.
    #[error("Invalid pyproject.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value has an unsupported type.
    #[error("Invalid value for {key}: {reason}")]
    InvalidConfig {
        /// The configuration key as written by the user.
        key: String,
        /// What was wrong with the value.
        reason: String,
    },
}

impl Error {
    /// Returns true if the archive contents themselves are unusable.
    ///
    /// These errors will not go away by retrying; the wheel has to be rebuilt.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::MalformedManifest { .. }
                | Self::InvalidManifest(_)
                | Self::InvalidMetadata(_)
                | Self::AmbiguousOrMissingDistInfo { .. }
                | Self::Zip(zip::result::ZipError::InvalidArchive(_))
        )
    }

    /// Returns true for errors about a member that does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::MemberNotFound { .. } | Self::Zip(zip::result::ZipError::FileNotFound) => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns the member path associated with this error, if any.
    pub fn member_path(&self) -> Option<&str> {
        match self {
            Self::MemberNotFound { path } | Self::MissingMemberMetadata { path } => Some(path),
            _ => None,
        }
    }

    /// Creates a malformed manifest error for the given line.
    pub fn malformed_manifest(line_number: usize, line: impl Into<String>) -> Self {
        Self::MalformedManifest {
            line_number,
            line: line.into(),
        }
    }
}

/// A specialized Result type for wheel operations.
pub type Result<T> = std::result::Result<T, Error>;
