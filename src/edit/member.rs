//! Member options and staged replacements.

use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime};

/// Archive-level attributes of one wheel member.
///
/// These are the attributes that survive when a member's content is
/// replaced: how it is compressed, its timestamp and its Unix mode.
#[derive(Debug, Clone, Copy)]
pub struct MemberOptions {
    /// Compression method used for the member.
    pub compression: CompressionMethod,
    /// Last modification time stored in the zip headers.
    pub last_modified: DateTime,
    /// Unix mode bits, if the member carries them.
    pub unix_mode: Option<u32>,
}

impl Default for MemberOptions {
    /// Deflated, stamped 1980-01-01 00:00:00, mode `0o644`.
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            last_modified: DateTime::default(),
            unix_mode: Some(0o644),
        }
    }
}

impl MemberOptions {
    /// Captures the options of an existing archive member.
    pub fn from_zip_file(file: &zip::read::ZipFile<'_>) -> Self {
        Self {
            compression: file.compression(),
            last_modified: file.last_modified(),
            unix_mode: file.unix_mode(),
        }
    }

    /// Builds writer options for a member of `len` bytes.
    pub(crate) fn file_options(&self, len: usize) -> FileOptions {
        let mut options = FileOptions::default()
            .compression_method(self.compression)
            .last_modified_time(self.last_modified)
            .large_file(len as u64 >= u64::from(u32::MAX));
        if let Some(mode) = self.unix_mode {
            options = options.unix_permissions(mode);
        }
        options
    }
}

/// A pending replacement (or addition) of one member.
#[derive(Debug, Clone)]
pub struct StagedMember {
    /// Member path inside the archive.
    pub path: String,
    /// Options the member is written with.
    pub options: MemberOptions,
    /// New member content.
    pub content: Vec<u8>,
}

impl StagedMember {
    /// Creates a staged member.
    pub fn new(path: impl Into<String>, options: MemberOptions, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            options,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MemberOptions::default();
        assert_eq!(options.compression, CompressionMethod::Deflated);
        assert_eq!(options.unix_mode, Some(0o644));
        assert_eq!(options.last_modified.year(), 1980);
        assert_eq!(options.last_modified.month(), 1);
        assert_eq!(options.last_modified.day(), 1);
    }

    #[test]
    fn test_staged_member_new() {
        let staged = StagedMember::new("pkg/data.txt", MemberOptions::default(), b"abc".to_vec());
        assert_eq!(staged.path, "pkg/data.txt");
        assert_eq!(staged.content, b"abc");
    }
}
