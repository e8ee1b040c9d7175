//! Configuration types for documentation linting.
//!
//! Split into core lint config (universal) and source-specific config
//! (how documents are discovered). The checkers never see filesystem
//! concerns; they only receive document text and a path for attribution.

use std::path::PathBuf;

/// Core lint config, applied regardless of input source.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct LintConfig {
    /// Glossary document to load. `None` runs every check that does not
    /// depend on a glossary and skips the rest.
    pub glossary_path: Option<PathBuf>,
    /// Additional words ignored by the bolded/quoted term patterns,
    /// on top of the built-in stop-word list. Compared case-insensitively.
    pub extra_stop_words: Vec<String>,
    /// Additional acronyms that never need a definition, on top of the
    /// built-in skip-list. Compared case-sensitively (acronyms are upper case).
    pub extra_skip_acronyms: Vec<String>,
}

impl LintConfig {
    /// Config using `glossary_path`, with no extra stop words or skips.
    #[must_use]
    pub fn with_glossary(glossary_path: Option<PathBuf>) -> Self {
        Self {
            glossary_path,
            ..Self::default()
        }
    }
}

/// Filesystem-specific source options.
///
/// NOTE: `paths` is required and must be non-empty. Glossary discovery and
/// default roots are a CLI concern, not baked into the library.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct FsSourceConfig {
    /// Paths to scan (files or directories). Required, must be non-empty.
    pub paths: Vec<PathBuf>,
    /// Descend into subdirectories (default: `true`).
    /// When `false`, only the top level of each directory root is scanned.
    pub recursive: bool,
    /// Exclude patterns (glob format).
    pub exclude: Vec<String>,
    /// Maximum file size in bytes (default: 10 MB).
    pub max_file_size: u64,
    /// Whether to follow symbolic links.
    ///
    /// **Defaults to `false`**: following symlinks allows escaping the scan
    /// root. Only enable if every symlink in the tree is trusted.
    pub follow_links: bool,
    /// Maximum directory traversal depth for recursive scans (default: 64).
    pub max_depth: usize,
    /// Maximum total number of files to scan (default: `100_000`).
    pub max_files: usize,
    /// Maximum total bytes to read across all files (default: 512 MB).
    pub max_total_bytes: u64,
}

impl FsSourceConfig {
    /// Config scanning `paths` with every other option at its default.
    #[must_use]
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            ..Self::default()
        }
    }

    /// Depth handed to the directory walker.
    ///
    /// Depth 0 is the root itself, so a non-recursive scan stops at 1.
    #[must_use]
    pub fn effective_max_depth(&self) -> usize {
        if self.recursive { self.max_depth } else { 1 }
    }
}

impl Default for FsSourceConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            recursive: true,
            exclude: Vec::new(),
            max_file_size: 10_485_760,
            follow_links: false,
            max_depth: 64,
            max_files: 100_000,
            max_total_bytes: 536_870_912,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_recursive_depth() {
        let mut cfg = FsSourceConfig::with_paths(vec![PathBuf::from("docs")]);
        assert_eq!(cfg.effective_max_depth(), 64);
        cfg.recursive = false;
        assert_eq!(cfg.effective_max_depth(), 1);
    }
}
