//! Whole-archive rewrites.
//!
//! [`rewrite_wheel`] ties the pieces together: it opens a wheel, rewrites
//! its METADATA with [`rewrite_metadata`], and replaces the wheel on disk
//! with the re-emitted archive. The new wheel is first written to a hidden
//! temporary file next to the original and then renamed over it, so the
//! original is left untouched if anything fails.

use std::io::Write;
use std::path::Path;

use crate::config::ExtraMetadata;
use crate::edit::{EmitResult, WheelOverlay};
use crate::metadata::MetadataFile;
use crate::Result;

/// Rewrites a METADATA document: drops `UNKNOWN` placeholders and merges in
/// `extra`.
///
/// # Example
///
/// ```rust
/// use wheelext::{ExtraMetadata, rewrite_metadata};
///
/// let mut extra = ExtraMetadata::new();
/// extra.insert("Supported-Platform", ["RedHat 8.3"]);
///
/// let out = rewrite_metadata(b"Name: demo\nPlatform: UNKNOWN\n\n", &extra)?;
/// assert_eq!(out, b"Name: demo\nSupported-Platform: RedHat 8.3\n\n");
/// # Ok::<(), wheelext::Error>(())
/// ```
pub fn rewrite_metadata(metadata: &[u8], extra: &ExtraMetadata) -> Result<Vec<u8>> {
    let mut metadata = MetadataFile::from_bytes(metadata)?;
    metadata.strip_sentinels();
    let added = metadata.merge_additional(extra);
    log::debug!("Added {} metadata header(s)", added);
    Ok(metadata.to_bytes())
}

/// Rewrites the METADATA of the wheel at `path` in place.
///
/// Every other member is copied unchanged and RECORD is regenerated. The
/// rewritten wheel replaces the original atomically and keeps its
/// permissions. The wheel is re-emitted even when `extra` is empty, which
/// still drops `UNKNOWN` placeholders.
///
/// # Errors
///
/// Returns [`Error::AmbiguousOrMissingDistInfo`](crate::Error::AmbiguousOrMissingDistInfo)
/// if the wheel has no unique dist-info directory, and propagates any
/// archive, manifest or I/O error. In every error case the original file is
/// unchanged and no temporary file is left behind.
pub fn rewrite_wheel(path: impl AsRef<Path>, extra: &ExtraMetadata) -> Result<EmitResult> {
    let path = path.as_ref();
    let mut overlay = WheelOverlay::open_path(path)?;

    let metadata_path = overlay.metadata_path()?;
    let original = overlay.read(&metadata_path)?;
    let rewritten = rewrite_metadata(&original, extra)?;
    overlay.write(&metadata_path, rewritten)?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}", file_name))
        .tempfile_in(directory)?;

    let result = overlay.emit(temp.as_file_mut())?;
    temp.as_file_mut().flush()?;
    // Temp files are created owner-only; keep the wheel's own mode.
    temp.as_file().set_permissions(std::fs::metadata(path)?.permissions())?;
    temp.persist(path).map_err(|e| e.error)?;

    log::info!(
        "Rewrote {} ({} kept, {} updated, {} added)",
        path.display(),
        result.entries_kept,
        result.entries_updated,
        result.entries_added
    );
    Ok(result)
}

/// Source distributions are left as they are.
///
/// Their `PKG-INFO` is produced by the build backend and is not patched;
/// this only exists so callers can treat both distribution kinds alike.
pub fn rewrite_sdist(path: impl AsRef<Path>, _extra: &ExtraMetadata) -> Result<()> {
    log::debug!("Leaving sdist {} unchanged", path.as_ref().display());
    Ok(())
}
