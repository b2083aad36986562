//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;
use wheelext::{EmitResult, MetadataFile, RecordMismatch};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the outcome of a patch
    fn format_patch_result(&self, wheel: &Path, result: &EmitResult) -> String;

    /// Formats a METADATA document
    fn format_metadata(&self, metadata: &MetadataFile) -> String;

    /// Formats RECORD verification results
    fn format_verify_result(&self, wheel: &Path, mismatches: &[RecordMismatch]) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_patch_result(&self, wheel: &Path, result: &EmitResult) -> String {
        format!(
            "Patched {}: {} unchanged, {} updated, {} added",
            wheel.display(),
            result.entries_kept,
            result.entries_updated,
            result.entries_added
        )
    }

    fn format_metadata(&self, metadata: &MetadataFile) -> String {
        metadata.to_string()
    }

    fn format_verify_result(&self, wheel: &Path, mismatches: &[RecordMismatch]) -> String {
        if mismatches.is_empty() {
            return format!("{}: RECORD OK", wheel.display());
        }
        let mut output = format!(
            "{}: {} RECORD mismatch(es)\n",
            wheel.display(),
            mismatches.len()
        );
        for mismatch in mismatches {
            output.push_str(&format!("  {}\n", mismatch));
        }
        output.truncate(output.trim_end().len());
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_patch_result(&self, wheel: &Path, result: &EmitResult) -> String {
        let obj = json!({
            "wheel": wheel.display().to_string(),
            "entries_kept": result.entries_kept,
            "entries_updated": result.entries_updated,
            "entries_added": result.entries_added,
            "record_rewritten": result.record_rewritten,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_metadata(&self, metadata: &MetadataFile) -> String {
        let obj = json!({
            "headers": metadata
                .headers()
                .iter()
                .map(|h| json!({"name": h.name(), "value": h.value()}))
                .collect::<Vec<_>>(),
            "body": metadata.body(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_verify_result(&self, wheel: &Path, mismatches: &[RecordMismatch]) -> String {
        let obj = json!({
            "wheel": wheel.display().to_string(),
            "ok": mismatches.is_empty(),
            "mismatches": mismatches
                .iter()
                .map(|m| json!({"path": m.path(), "error": m.to_string()}))
                .collect::<Vec<_>>(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates a formatter for the requested output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
