//! # wheelext
//!
//! Post-build rewriting of Python wheels.
//!
//! This crate adds core metadata fields that a build backend cannot emit
//! itself (for example `Requires-External` or `Supported-Platform`) to an
//! already built wheel. It rewrites the wheel's `METADATA` member in place
//! and regenerates `RECORD`, copying every other member byte for byte.
//!
//! ## Quick Start
//!
//! ### Patching a Wheel
//!
//! ```rust,no_run
//! use wheelext::{ExtraMetadata, Result, rewrite_wheel};
//!
//! fn main() -> Result<()> {
//!     // Read the [tool.setuptools-ext] table
//!     let extra = ExtraMetadata::from_pyproject_path("pyproject.toml")?;
//!
//!     // Rewrite METADATA and RECORD, replacing the wheel atomically
//!     let result = rewrite_wheel("dist/demo-1.0-py3-none-any.whl", &extra)?;
//!     println!("Copied {} members unchanged", result.entries_kept);
//!     Ok(())
//! }
//! ```
//!
//! ### Editing Members Directly
//!
//! ```rust,no_run
//! use wheelext::{Result, WheelOverlay};
//!
//! fn main() -> Result<()> {
//!     let mut overlay = WheelOverlay::open_path("demo-1.0-py3-none-any.whl")?;
//!
//!     // Stage a replacement; options are taken from the existing member
//!     overlay.write("demo/_version.py", b"VERSION = '1.0.post1'\n".to_vec())?;
//!
//!     // Emit a new wheel with a regenerated RECORD
//!     let result = overlay.emit_path("patched.whl")?;
//!     assert!(result.record_rewritten);
//!     Ok(())
//! }
//! ```
//!
//! ### Working With RECORD
//!
//! ```rust
//! use wheelext::WheelRecord;
//!
//! let mut record = WheelRecord::parse("a.txt,sha256=AAA,3\nb.txt,sha256=BBB,4\n")?;
//! record.record_file("a.txt", b"xyz");
//! assert!(record.get("a.txt").unwrap().matches(b"xyz"));
//! # Ok::<(), wheelext::Error>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`record`]: the `RECORD` manifest model
//! - [`metadata`]: `METADATA` header blocks and the merge rules
//! - [`edit`]: the copy-on-write [`WheelOverlay`]
//! - [`config`]: additional fields from `pyproject.toml`
//! - [`checksum`]: digests in RECORD's `sha256=...` notation
//! - [`error`]: the crate-wide [`Error`] type
//!
//! ## Format Limitations
//!
//! RECORD has no escaping, so member paths containing a comma cannot be
//! represented. Such RECORD files are rejected with
//! [`Error::MalformedManifest`] rather than guessed at.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod checksum;
pub mod config;
pub mod edit;
pub mod error;
pub mod metadata;
pub mod record;
pub mod rewrite;

pub use config::ExtraMetadata;
pub use edit::{EmitResult, MemberOptions, RecordMismatch, StagedMember, WheelOverlay};
pub use error::{Error, Result};
pub use metadata::{Header, MetadataFile};
pub use record::{RecordEntry, WheelRecord};
pub use rewrite::{rewrite_metadata, rewrite_sdist, rewrite_wheel};
