//! Error types for documentation linting.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// The kind of scan-level failure that prevented a file from being checked.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScanErrorKind {
    /// An I/O error occurred while reading the file.
    IoError,
    /// The file exceeded the configured maximum size limit.
    FileTooLarge,
    /// The file content is not valid UTF-8.
    InvalidEncoding,
    /// The resolved path is outside the scan root (symlink escape).
    OutsideRepository,
    /// A resource limit (`max_files` or `max_total_bytes`) was reached, truncating the scan.
    LimitExceeded,
    /// A directory traversal error (permission denied, loop detected, etc.).
    WalkError,
    /// An exclude glob pattern could not be parsed.
    InvalidExcludePattern,
}

/// A scan-level error: a file that could not be checked at all.
///
/// These are distinct from findings (a term that was found and is
/// inconsistent). A `ScanError` means the file contributed nothing to the
/// run; the run itself continues with the next file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ScanError {
    /// The file path that could not be scanned.
    pub file: PathBuf,
    /// The kind of failure.
    pub kind: ScanErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ScanError {
    /// Build a scan error for `file`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
        }
    }

    /// Format the error for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}: [scan error] {}", self.file.display(), self.message)
    }
}

/// Failure to turn a glossary document into a term table.
///
/// Callers that want the fail-soft behaviour use [`crate::Glossary::load`],
/// which logs this error and falls back to an empty glossary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GlossaryError {
    /// The glossary file could not be read.
    #[error("could not read glossary {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The glossary was readable but contained no usable `###` entries.
    #[error("glossary {path} contains no term entries")]
    Empty {
        /// Path of the empty glossary.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_scan_error() {
        let err = ScanError::new(
            "docs/broken.md",
            ScanErrorKind::InvalidEncoding,
            "File is not valid UTF-8",
        );
        let formatted = err.format_human_readable();
        assert_eq!(formatted, "docs/broken.md: [scan error] File is not valid UTF-8");
    }

    #[test]
    fn test_glossary_error_display_names_path() {
        let err = GlossaryError::Empty {
            path: PathBuf::from("metadata/glossary.md"),
        };
        assert!(err.to_string().contains("metadata/glossary.md"));
    }
}
