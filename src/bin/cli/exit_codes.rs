//! Exit codes for the CLI tool.

use wheelext::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// RECORD does not match the wheel's members
pub const RECORD_MISMATCH: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Wheel or member format error
pub const BAD_WHEEL: i32 = 3;
/// Invalid pyproject configuration
pub const BAD_CONFIG: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    RecordMismatch,
    FatalError,
    BadWheel,
    BadConfig,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::RecordMismatch => RECORD_MISMATCH,
            Self::FatalError => FATAL_ERROR,
            Self::BadWheel => BAD_WHEEL,
            Self::BadConfig => BAD_CONFIG,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a wheelext error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::Zip(zip::result::ZipError::Io(_)) => ExitCode::IoError,
        Error::Zip(_) => ExitCode::BadWheel,
        Error::MalformedManifest { .. } | Error::InvalidManifest(_) => ExitCode::BadWheel,
        Error::AmbiguousOrMissingDistInfo { .. } => ExitCode::BadWheel,
        Error::MemberNotFound { .. } => ExitCode::BadWheel,
        Error::InvalidMetadata(_) => ExitCode::BadWheel,
        Error::MissingMemberMetadata { .. } => ExitCode::FatalError,
        Error::ConfigParse(_) | Error::InvalidConfig { .. } => ExitCode::BadConfig,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
