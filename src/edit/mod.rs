//! Wheel overlay editing.
//!
//! This module provides the ability to modify an existing wheel by:
//! - Replacing member contents
//! - Adding new members
//! - Regenerating `RECORD` so it describes the output exactly
//!
//! # Example
//!
//! ```rust,ignore
//! use wheelext::edit::WheelOverlay;
//! use std::fs::File;
//!
//! let mut overlay = WheelOverlay::open_path("demo-1.0-py3-none-any.whl")?;
//! overlay.write("demo/__init__.py", b"VERSION = '1.0'\n".to_vec())?;
//!
//! let result = overlay.emit(File::create("patched.whl")?)?;
//! println!("Kept {} members, updated {}, added {}",
//!          result.entries_kept,
//!          result.entries_updated,
//!          result.entries_added);
//! ```
//!
//! # Implementation Notes
//!
//! The overlay works by:
//! 1. Indexing member names and options when the wheel is opened
//! 2. Staging replacements in memory
//! 3. When `emit()` is called, walking the source members in order
//! 4. Copying unchanged members raw, without recompressing
//! 5. Writing staged members with their source options
//! 6. Appending new members, then the regenerated RECORD

mod member;
mod overlay;

pub use member::{MemberOptions, StagedMember};
pub use overlay::{EmitResult, RecordMismatch, WheelOverlay};
