//! Command implementations for the CLI tool.

use std::path::Path;

use wheelext::config::canonical_field;
use wheelext::{ExtraMetadata, MetadataFile, WheelOverlay, rewrite_wheel};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;

/// Configuration for the patch command.
pub struct PatchConfig<'a> {
    pub wheel_path: &'a Path,
    pub pyproject: Option<&'a Path>,
    pub fields: &'a [String],
    pub format: OutputFormat,
}

/// Patch command implementation
pub fn patch(config: &PatchConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let mut extra = match config.pyproject {
        Some(path) => match ExtraMetadata::from_pyproject_path(path) {
            Ok(extra) => extra,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                return error_to_exit_code(&e);
            }
        },
        None => ExtraMetadata::new(),
    };

    for field in config.fields {
        match parse_field(field) {
            Ok((name, value)) => extra.push(name, value),
            Err(message) => {
                eprintln!("Error: {}", message);
                return ExitCode::BadArgs;
            }
        }
    }

    if extra.is_empty() {
        log::info!("No extra metadata for {}, leaving it unchanged", config.wheel_path.display());
        return ExitCode::Success;
    }

    match rewrite_wheel(config.wheel_path, &extra) {
        Ok(result) => {
            println!("{}", formatter.format_patch_result(config.wheel_path, &result));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error rewriting {}: {}", config.wheel_path.display(), e);
            error_to_exit_code(&e)
        }
    }
}

/// Show command implementation
pub fn show(wheel_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let mut overlay = match open_wheel(wheel_path) {
        Ok(overlay) => overlay,
        Err(code) => return code,
    };

    let metadata = overlay
        .metadata_path()
        .and_then(|path| overlay.read(&path))
        .and_then(|bytes| MetadataFile::from_bytes(&bytes));
    match metadata {
        Ok(metadata) => {
            print!("{}", formatter.format_metadata(&metadata));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

/// Verify command implementation
pub fn verify(wheel_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let mut overlay = match open_wheel(wheel_path) {
        Ok(overlay) => overlay,
        Err(code) => return code,
    };

    match overlay.verify_record() {
        Ok(mismatches) => {
            println!("{}", formatter.format_verify_result(wheel_path, &mismatches));
            if mismatches.is_empty() {
                ExitCode::Success
            } else {
                ExitCode::RecordMismatch
            }
        }
        Err(e) => {
            eprintln!("Error verifying {}: {}", wheel_path.display(), e);
            error_to_exit_code(&e)
        }
    }
}

/// Opens a wheel, reporting errors to stderr.
fn open_wheel(
    wheel_path: &Path,
) -> Result<WheelOverlay<std::io::BufReader<std::fs::File>>, ExitCode> {
    WheelOverlay::open_path(wheel_path).map_err(|e| {
        eprintln!("Error opening wheel: {}", e);
        error_to_exit_code(&e)
    })
}

/// Parses a `NAME=VALUE` flag into a canonical field name and value.
fn parse_field(field: &str) -> Result<(&'static str, &str), String> {
    let (name, value) = field
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", field))?;
    let name = canonical_field(name.trim())
        .ok_or_else(|| format!("unsupported metadata field {:?}", name.trim()))?;
    Ok((name, value))
}
