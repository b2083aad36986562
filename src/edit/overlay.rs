//! Copy-on-write overlay over an existing wheel.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use zip::{ZipArchive, ZipWriter};

use crate::record::WheelRecord;
use crate::{Error, Result};

use super::member::{MemberOptions, StagedMember};

/// Suffix identifying the core metadata member of a dist-info directory.
const METADATA_SUFFIX: &str = ".dist-info/METADATA";

/// Result of emitting an overlay.
#[must_use = "emit result should be checked to verify the output is complete"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitResult {
    /// Number of source members copied unchanged (raw).
    pub entries_kept: usize,
    /// Number of source members written with staged content.
    pub entries_updated: usize,
    /// Number of staged members that were not in the source.
    pub entries_added: usize,
    /// Whether RECORD was regenerated (false when it was copied raw).
    pub record_rewritten: bool,
}

impl EmitResult {
    /// Returns the number of members written, RECORD included.
    pub fn total_entries(&self) -> usize {
        self.entries_kept + self.entries_updated + self.entries_added + 1
    }
}

/// A disagreement between RECORD and a member's actual bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordMismatch {
    /// The member has no RECORD entry.
    Missing {
        /// Member path.
        path: String,
    },
    /// RECORD lists a member that is not in the archive.
    Stale {
        /// Path listed in RECORD.
        path: String,
    },
    /// The recorded digest does not describe the member's bytes.
    Digest {
        /// Member path.
        path: String,
        /// Digest descriptor found in RECORD.
        recorded: String,
    },
    /// The recorded length differs from the member's byte length.
    Length {
        /// Member path.
        path: String,
        /// Length found in RECORD.
        recorded: String,
        /// Actual byte length.
        actual: usize,
    },
}

impl RecordMismatch {
    /// Returns the member path this mismatch is about.
    pub fn path(&self) -> &str {
        match self {
            Self::Missing { path }
            | Self::Stale { path }
            | Self::Digest { path, .. }
            | Self::Length { path, .. } => path,
        }
    }
}

impl std::fmt::Display for RecordMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "{}: not listed in RECORD", path),
            Self::Stale { path } => write!(f, "{}: listed in RECORD but not in the archive", path),
            Self::Digest { path, recorded } => {
                write!(f, "{}: digest does not match RECORD ({})", path, recorded)
            }
            Self::Length { path, recorded, actual } => {
                write!(f, "{}: RECORD length {} but member has {} bytes", path, recorded, actual)
            }
        }
    }
}

/// Name and options of one source member, in archive order.
#[derive(Debug, Clone)]
struct SourceMember {
    name: String,
    options: MemberOptions,
    is_dir: bool,
}

/// RECORD as resolved before emitting. `base` is `None` when RECORD is
/// copied raw.
struct RecordPlan {
    path: String,
    options: MemberOptions,
    base: Option<WheelRecord>,
}

/// A wheel with pending member replacements.
///
/// The source archive is never modified. Replacements are staged with
/// [`write`](Self::write) and only materialized by [`emit`](Self::emit),
/// which writes a complete new wheel: unchanged members are copied raw in
/// their original order, staged members carry their new content, and
/// RECORD is regenerated to describe exactly the final member bytes.
///
/// # Example
///
/// ```rust,ignore
/// use wheelext::WheelOverlay;
/// use std::fs::File;
///
/// let mut overlay = WheelOverlay::open_path("demo-1.0-py3-none-any.whl")?;
/// let metadata_path = overlay.metadata_path()?;
/// let metadata = overlay.read(&metadata_path)?;
/// overlay.write(&metadata_path, [metadata.as_slice(), b"Extra: yes\n"].concat())?;
///
/// let result = overlay.emit(File::create("patched.whl")?)?;
/// println!("updated {} members", result.entries_updated);
/// ```
pub struct WheelOverlay<R: Read + Seek> {
    archive: ZipArchive<R>,
    members: Vec<SourceMember>,
    index: HashMap<String, usize>,
    staged: Vec<StagedMember>,
    staged_index: HashMap<String, usize>,
}

impl WheelOverlay<BufReader<File>> {
    /// Opens a wheel file from disk.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::open_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> WheelOverlay<R> {
    /// Opens a wheel from any seekable reader.
    pub fn open_reader(reader: R) -> Result<Self> {
        Self::new(ZipArchive::new(reader)?)
    }

    /// Creates an overlay over an already opened archive.
    ///
    /// Reads the member index (names and options, not contents).
    pub fn new(mut archive: ZipArchive<R>) -> Result<Self> {
        let mut members = Vec::with_capacity(archive.len());
        let mut index = HashMap::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let file = archive.by_index_raw(idx)?;
            let name = file.name().to_string();
            index.entry(name.clone()).or_insert(idx);
            members.push(SourceMember {
                options: MemberOptions::from_zip_file(&file),
                is_dir: file.is_dir(),
                name,
            });
        }
        Ok(Self {
            archive,
            members,
            index,
            staged: Vec::new(),
            staged_index: HashMap::new(),
        })
    }

    /// Returns the number of members in the source archive.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the source archive has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterates over source member names in archive order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Returns the number of staged writes.
    pub fn pending_writes(&self) -> usize {
        self.staged.len()
    }

    /// Returns whether any write is staged.
    pub fn has_pending_writes(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Returns true if `path` is staged or present in the source.
    pub fn contains(&self, path: &str) -> bool {
        self.staged_index.contains_key(path) || self.index.contains_key(path)
    }

    /// Finds the wheel's `.dist-info` directory.
    ///
    /// Only directories at the archive root are considered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousOrMissingDistInfo`] unless exactly one
    /// `<dir>.dist-info/METADATA` member exists.
    pub fn dist_info_dir(&self) -> Result<String> {
        let mut candidates: Vec<String> = self
            .members
            .iter()
            .filter(|m| m.name.ends_with(METADATA_SUFFIX))
            .filter_map(|m| m.name.rsplit_once('/').map(|(dir, _)| dir))
            .filter(|dir| !dir.contains('/'))
            .map(str::to_string)
            .collect();
        candidates.sort();
        candidates.dedup();
        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            _ => Err(Error::AmbiguousOrMissingDistInfo { candidates }),
        }
    }

    /// Returns the path of the `METADATA` member.
    pub fn metadata_path(&self) -> Result<String> {
        Ok(format!("{}/METADATA", self.dist_info_dir()?))
    }

    /// Returns the path of the `RECORD` member.
    pub fn record_path(&self) -> Result<String> {
        Ok(format!("{}/RECORD", self.dist_info_dir()?))
    }

    /// Returns the options `path` would be written with: staged options
    /// first, then the source member's.
    pub fn member_options(&self, path: &str) -> Option<MemberOptions> {
        if let Some(&idx) = self.staged_index.get(path) {
            return Some(self.staged[idx].options);
        }
        self.index.get(path).map(|&idx| self.members[idx].options)
    }

    /// Returns the current bytes of `path`: staged content if any,
    /// otherwise the source member's.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if the path is neither staged nor
    /// in the source archive.
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        if let Some(&idx) = self.staged_index.get(path) {
            return Ok(self.staged[idx].content.clone());
        }
        let Some(&idx) = self.index.get(path) else {
            return Err(Error::MemberNotFound {
                path: path.to_string(),
            });
        };
        let mut file = self.archive.by_index(idx)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Stages new content for an existing member, keeping its options.
    ///
    /// Writing the same path again replaces the staged content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingMemberMetadata`] if `path` has no existing
    /// member to take options from; use
    /// [`write_with_options`](Self::write_with_options) for new members.
    pub fn write(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let options = self
            .member_options(path)
            .ok_or_else(|| Error::MissingMemberMetadata {
                path: path.to_string(),
            })?;
        self.write_with_options(path, content, options);
        Ok(())
    }

    /// Stages content for `path` with explicit options.
    pub fn write_with_options(
        &mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
        options: MemberOptions,
    ) {
        let staged = StagedMember::new(path, options, content);
        match self.staged_index.get(path) {
            Some(&idx) => self.staged[idx] = staged,
            None => {
                self.staged_index.insert(path.to_string(), self.staged.len());
                self.staged.push(staged);
            }
        }
    }

    /// Loads RECORD as it currently stands, staged replacement included.
    pub fn current_record(&mut self) -> Result<WheelRecord> {
        let record_path = self.record_path()?;
        WheelRecord::from_bytes(&self.read(&record_path)?)
    }

    /// Checks RECORD against the current bytes of every member.
    ///
    /// Directory members and RECORD itself are not checked. Returns an empty
    /// list when RECORD is fully consistent.
    pub fn verify_record(&mut self) -> Result<Vec<RecordMismatch>> {
        let record_path = self.record_path()?;
        let record = self.current_record()?;

        let mut paths: Vec<String> = self
            .members
            .iter()
            .filter(|m| !m.is_dir)
            .map(|m| m.name.clone())
            .collect();
        paths.extend(
            self.staged
                .iter()
                .filter(|s| !self.index.contains_key(&s.path))
                .map(|s| s.path.clone()),
        );

        let mut mismatches = Vec::new();
        for path in &paths {
            if *path == record_path {
                continue;
            }
            let content = self.read(path)?;
            match record.get(path) {
                None => mismatches.push(RecordMismatch::Missing { path: path.clone() }),
                Some(entry) if entry.length().parse::<usize>().ok() != Some(content.len()) => {
                    mismatches.push(RecordMismatch::Length {
                        path: path.clone(),
                        recorded: entry.length().to_string(),
                        actual: content.len(),
                    });
                }
                Some(entry) if !entry.matches(&content) => {
                    mismatches.push(RecordMismatch::Digest {
                        path: path.clone(),
                        recorded: entry.hash().to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        let listed: HashSet<&str> = paths.iter().map(String::as_str).collect();
        for (path, _) in record.iter() {
            if path != record_path && !listed.contains(path) {
                mismatches.push(RecordMismatch::Stale {
                    path: path.to_string(),
                });
            }
        }
        Ok(mismatches)
    }

    /// Writes the overlaid wheel to `destination` on disk.
    ///
    /// The dist-info directory is located and RECORD is loaded before the
    /// file is created, so a wheel without them or with a malformed RECORD
    /// leaves no file behind. Errors after that point can leave a partial
    /// file; callers replacing a wheel in place should emit to a temporary
    /// path and rename it.
    pub fn emit_path(mut self, destination: impl AsRef<Path>) -> Result<EmitResult> {
        let plan = self.record_plan()?;
        let file = File::create(destination)?;
        let mut writer = BufWriter::new(file);
        let result = self.emit_with_record(plan, &mut writer)?;
        writer.flush()?;
        Ok(result)
    }

    /// Writes the overlaid wheel to `output`, consuming the overlay.
    ///
    /// Members are emitted in source order. A staged member replaces the
    /// source member of the same path and gets a fresh RECORD entry; staged
    /// paths not present in the source are appended afterwards in staging
    /// order. RECORD is emitted last with the source RECORD member's options.
    /// It is loaded from its current bytes, so a staged RECORD replacement
    /// is the starting point for the regenerated one. When nothing was
    /// staged, RECORD is copied raw like every other member.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousOrMissingDistInfo`] if the dist-info
    /// directory cannot be located, and [`Error::MalformedManifest`] if
    /// RECORD has to be regenerated but does not parse. Both are reported
    /// before anything is written.
    pub fn emit<W: Write + Seek>(mut self, output: W) -> Result<EmitResult> {
        let plan = self.record_plan()?;
        self.emit_with_record(plan, output)
    }

    /// Resolves where RECORD goes, its options and its starting entries.
    fn record_plan(&mut self) -> Result<RecordPlan> {
        let path = self.record_path()?;
        let options = self.record_options(&path)?;
        let base = if self.staged.is_empty() {
            None
        } else {
            Some(self.current_record()?)
        };
        Ok(RecordPlan {
            path,
            options,
            base,
        })
    }

    /// Options RECORD is written with: the source member's, or the staged
    /// member's when the source has no RECORD.
    fn record_options(&self, record_path: &str) -> Result<MemberOptions> {
        self.index
            .get(record_path)
            .map(|&idx| self.members[idx].options)
            .or_else(|| self.member_options(record_path))
            .ok_or_else(|| Error::MemberNotFound {
                path: record_path.to_string(),
            })
    }

    fn emit_with_record<W: Write + Seek>(mut self, plan: RecordPlan, output: W) -> Result<EmitResult> {
        let RecordPlan {
            path,
            options: record_options,
            base,
        } = plan;
        let record_path = path.as_str();
        let copy_record_raw = base.is_none();
        let mut record = base.unwrap_or_default();
        let mut result = EmitResult::default();

        let staged_order: Vec<String> = self.staged.iter().map(|s| s.path.clone()).collect();
        let mut pending: HashMap<String, StagedMember> = self
            .staged
            .drain(..)
            .map(|staged| (staged.path.clone(), staged))
            .collect();
        self.staged_index.clear();
        // RECORD is regenerated below, never emitted as a regular member.
        pending.remove(record_path);

        let mut writer = ZipWriter::new(output);
        let mut record_index = None;

        for (idx, member) in self.members.iter().enumerate() {
            if member.name == record_path {
                record_index.get_or_insert(idx);
                continue;
            }
            if let Some(staged) = pending.remove(&member.name) {
                log::debug!("Replacing {} ({} bytes)", member.name, staged.content.len());
                record.record_file(&staged.path, &staged.content);
                write_member(&mut writer, &staged)?;
                result.entries_updated += 1;
            } else {
                writer.raw_copy_file(self.archive.by_index_raw(idx)?)?;
                result.entries_kept += 1;
            }
        }

        for path in &staged_order {
            if let Some(staged) = pending.remove(path) {
                log::debug!("Adding {} ({} bytes)", staged.path, staged.content.len());
                record.record_file(&staged.path, &staged.content);
                write_member(&mut writer, &staged)?;
                result.entries_added += 1;
            }
        }

        match record_index {
            Some(idx) if copy_record_raw => {
                writer.raw_copy_file(self.archive.by_index_raw(idx)?)?;
            }
            _ => {
                let content = record.to_record_string().into_bytes();
                writer.start_file(record_path, record_options.file_options(content.len()))?;
                writer.write_all(&content)?;
                result.record_rewritten = true;
            }
        }

        writer.finish()?;
        Ok(result)
    }
}

/// Writes one staged member with its options.
fn write_member<W: Write + Seek>(writer: &mut ZipWriter<W>, staged: &StagedMember) -> Result<()> {
    writer.start_file(
        staged.path.as_str(),
        staged.options.file_options(staged.content.len()),
    )?;
    writer.write_all(&staged.content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::CompressionMethod;
    use zip::write::FileOptions;

    fn build(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, FileOptions::default().compression_method(CompressionMethod::Stored))
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn overlay(entries: &[(&str, &[u8])]) -> WheelOverlay<Cursor<Vec<u8>>> {
        WheelOverlay::open_reader(Cursor::new(build(entries))).unwrap()
    }

    #[test]
    fn test_emit_result_total_entries() {
        let result = EmitResult {
            entries_kept: 3,
            entries_updated: 1,
            entries_added: 2,
            record_rewritten: true,
        };
        assert_eq!(result.total_entries(), 7);
    }

    #[test]
    fn test_dist_info_dir() {
        let overlay = overlay(&[
            ("demo/__init__.py", b"" as &[u8]),
            ("demo-1.0.dist-info/METADATA", b"Name: demo\n\n"),
            ("demo-1.0.dist-info/RECORD", b""),
        ]);
        assert_eq!(overlay.dist_info_dir().unwrap(), "demo-1.0.dist-info");
        assert_eq!(overlay.metadata_path().unwrap(), "demo-1.0.dist-info/METADATA");
        assert_eq!(overlay.record_path().unwrap(), "demo-1.0.dist-info/RECORD");
    }

    #[test]
    fn test_dist_info_dir_ignores_nested() {
        let overlay = overlay(&[
            ("demo/_vendor/dep-2.0.dist-info/METADATA", b"" as &[u8]),
            ("demo-1.0.dist-info/METADATA", b""),
        ]);
        assert_eq!(overlay.dist_info_dir().unwrap(), "demo-1.0.dist-info");
    }

    #[test]
    fn test_dist_info_dir_ambiguous() {
        let overlay = overlay(&[
            ("a-1.0.dist-info/METADATA", b"" as &[u8]),
            ("b-1.0.dist-info/METADATA", b""),
        ]);
        match overlay.dist_info_dir().unwrap_err() {
            Error::AmbiguousOrMissingDistInfo { candidates } => {
                assert_eq!(candidates, ["a-1.0.dist-info", "b-1.0.dist-info"]);
            }
            e => panic!("Expected AmbiguousOrMissingDistInfo, got: {:?}", e),
        }
    }

    #[test]
    fn test_dist_info_dir_collapses_duplicate_entries() {
        let mut overlay = overlay(&[
            ("demo-1.0.dist-info/METADATA", b"Name: demo\n\n" as &[u8]),
            ("demo/__init__.py", b""),
        ]);
        // Same METADATA name listed twice, not adjacently.
        let duplicate = overlay.members[0].clone();
        overlay.members.push(duplicate);
        assert_eq!(overlay.dist_info_dir().unwrap(), "demo-1.0.dist-info");
    }

    #[test]
    fn test_dist_info_dir_missing() {
        let overlay = overlay(&[("demo/__init__.py", b"" as &[u8])]);
        assert!(matches!(
            overlay.dist_info_dir(),
            Err(Error::AmbiguousOrMissingDistInfo { candidates }) if candidates.is_empty()
        ));
    }

    #[test]
    fn test_read_prefers_staged() {
        let mut overlay = overlay(&[("a.txt", b"abc" as &[u8])]);
        assert_eq!(overlay.read("a.txt").unwrap(), b"abc");

        overlay.write("a.txt", b"xyz".to_vec()).unwrap();
        assert_eq!(overlay.read("a.txt").unwrap(), b"xyz");

        overlay.write("a.txt", b"last".to_vec()).unwrap();
        assert_eq!(overlay.read("a.txt").unwrap(), b"last");
        assert_eq!(overlay.pending_writes(), 1);
    }

    #[test]
    fn test_read_missing_member() {
        let mut overlay = overlay(&[("a.txt", b"abc" as &[u8])]);
        match overlay.read("nope.txt").unwrap_err() {
            Error::MemberNotFound { path } => assert_eq!(path, "nope.txt"),
            e => panic!("Expected MemberNotFound, got: {:?}", e),
        }
    }

    #[test]
    fn test_write_new_path_requires_options() {
        let mut overlay = overlay(&[("a.txt", b"abc" as &[u8])]);
        let err = overlay.write("new.txt", b"data".to_vec()).unwrap_err();
        assert!(matches!(err, Error::MissingMemberMetadata { ref path } if path == "new.txt"));
        assert!(!overlay.has_pending_writes());

        overlay.write_with_options("new.txt", b"data".to_vec(), MemberOptions::default());
        assert!(overlay.contains("new.txt"));

        // Staged options are reused for later writes.
        overlay.write("new.txt", b"more".to_vec()).unwrap();
        assert_eq!(overlay.read("new.txt").unwrap(), b"more");
    }

    #[test]
    fn test_write_reuses_source_options() {
        let mut overlay = overlay(&[("a.txt", b"abc" as &[u8])]);
        let options = overlay.member_options("a.txt").unwrap();
        assert_eq!(options.compression, CompressionMethod::Stored);

        overlay.write("a.txt", b"xyz".to_vec()).unwrap();
        assert_eq!(
            overlay.member_options("a.txt").unwrap().compression,
            CompressionMethod::Stored
        );
    }

    #[test]
    fn test_member_names_in_source_order() {
        let overlay = overlay(&[("z.txt", b"" as &[u8]), ("a.txt", b""), ("m.txt", b"")]);
        let names: Vec<_> = overlay.member_names().collect();
        assert_eq!(names, ["z.txt", "a.txt", "m.txt"]);
        assert_eq!(overlay.len(), 3);
        assert!(!overlay.is_empty());
    }

    #[test]
    fn test_emit_without_dist_info_fails_before_writing() {
        let overlay = overlay(&[("a.txt", b"abc" as &[u8])]);
        let mut output = Cursor::new(Vec::new());
        let err = overlay.emit(&mut output).unwrap_err();
        assert!(matches!(err, Error::AmbiguousOrMissingDistInfo { .. }));
        assert!(output.get_ref().is_empty());
    }

    #[test]
    fn test_emit_without_record_member_fails() {
        let overlay = overlay(&[("demo-1.0.dist-info/METADATA", b"Name: demo\n\n" as &[u8])]);
        let mut output = Cursor::new(Vec::new());
        let err = overlay.emit(&mut output).unwrap_err();
        assert!(matches!(err, Error::MemberNotFound { ref path } if path == "demo-1.0.dist-info/RECORD"));
        assert!(output.get_ref().is_empty());
    }

    #[test]
    fn test_record_mismatch_display() {
        let mismatch = RecordMismatch::Length {
            path: "a.txt".into(),
            recorded: "3".into(),
            actual: 4,
        };
        assert_eq!(mismatch.path(), "a.txt");
        assert_eq!(mismatch.to_string(), "a.txt: RECORD length 3 but member has 4 bytes");
    }
}
