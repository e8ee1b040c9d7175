//! Filesystem document source.
//!
//! Discovers markdown files on disk and reads them safely for the lint
//! pipeline:
//! - Symlinks are not followed by default (`follow_links: false`)
//! - Resolved paths are checked to remain within the scan root
//! - Device files, pipes, and sockets are skipped
//! - Traversal depth is bounded (depth 1 for non-recursive scans)
//! - Bounded streaming reads keep memory use predictable

use std::io::Read;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::FsSourceConfig;
use crate::error::{ScanError, ScanErrorKind};

/// Directories to skip
pub const SKIP_DIRS: &[&str] = &["target", "node_modules", ".git", "vendor"];

/// Result of attempting to read a file for scanning.
pub enum ScanResult {
    /// File was read successfully; contains the UTF-8 content.
    Ok(String),
    /// File could not be read; contains the scan error.
    Err(ScanError),
}

/// Check if a path matches any of the exclude patterns
fn matches_exclude(path: &Path, exclude_patterns: &[Pattern]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

/// Returns `true` if the entry should be **included** (i.e., is NOT a skip dir).
fn is_not_skip_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.file_type().is_dir()
        && entry.depth() > 0
        && let Some(name) = entry.file_name().to_str()
    {
        return !SKIP_DIRS.contains(&name);
    }
    true
}

/// Whether `path` is a markdown document.
#[must_use]
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn compile_excludes(config: &FsSourceConfig, scan_errors: &mut Vec<ScanError>) -> Vec<Pattern> {
    let mut exclude_patterns = Vec::with_capacity(config.exclude.len());
    for pat_str in &config.exclude {
        match Pattern::new(pat_str) {
            Ok(pat) => exclude_patterns.push(pat),
            Err(e) => scan_errors.push(ScanError::new(
                pat_str,
                ScanErrorKind::InvalidExcludePattern,
                format!("Invalid exclude glob pattern '{pat_str}': {e}"),
            )),
        }
    }
    exclude_patterns
}

/// Find all markdown files to scan in the configured paths.
///
/// Returns `(files, scan_errors)`:
/// - `files`: sorted, de-duplicated paths ready to read.
/// - `scan_errors`: walk errors and boundary violations. These are never
///   silently discarded.
#[must_use]
pub fn find_files(config: &FsSourceConfig) -> (Vec<PathBuf>, Vec<ScanError>) {
    let mut files = Vec::new();
    let mut scan_errors = Vec::new();
    let exclude_patterns = compile_excludes(config, &mut scan_errors);

    for root in &config.paths {
        let canonical_root = match root.canonicalize() {
            Ok(r) => r,
            Err(e) => {
                scan_errors.push(ScanError::new(
                    root.clone(),
                    ScanErrorKind::IoError,
                    format!("Failed to canonicalize root path: {e}"),
                ));
                continue;
            }
        };

        if root.is_file() {
            if is_markdown(root) && !matches_exclude(root, &exclude_patterns) {
                files.push(root.clone());
            }
            continue;
        }

        if !root.is_dir() {
            continue;
        }

        for entry_result in WalkDir::new(root)
            .follow_links(config.follow_links)
            .max_depth(config.effective_max_depth())
            .into_iter()
            .filter_entry(is_not_skip_dir)
        {
            let entry = match entry_result {
                Ok(e) => e,
                Err(walk_err) => {
                    let path = walk_err
                        .path()
                        .map_or_else(|| root.clone(), Path::to_path_buf);
                    scan_errors.push(ScanError::new(
                        path,
                        ScanErrorKind::WalkError,
                        format!("Directory traversal error: {walk_err}"),
                    ));
                    continue;
                }
            };

            let file_path = entry.path();
            if !file_path.is_file() || !is_markdown(file_path) {
                continue;
            }

            match file_path.canonicalize() {
                Ok(canonical_path) if !canonical_path.starts_with(&canonical_root) => {
                    scan_errors.push(ScanError::new(
                        file_path,
                        ScanErrorKind::OutsideRepository,
                        format!(
                            "Path resolves outside scan root: {} -> {}",
                            file_path.display(),
                            canonical_path.display()
                        ),
                    ));
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    scan_errors.push(ScanError::new(
                        file_path,
                        ScanErrorKind::IoError,
                        format!("Failed to canonicalize path: {e}"),
                    ));
                    continue;
                }
            }

            // Skip devices, pipes, sockets; only regular files
            #[cfg(unix)]
            {
                use std::os::unix::fs::FileTypeExt;
                if let Ok(ft) = entry.metadata().map(|m| m.file_type())
                    && (ft.is_block_device()
                        || ft.is_char_device()
                        || ft.is_fifo()
                        || ft.is_socket())
                {
                    continue;
                }
            }

            if matches_exclude(file_path, &exclude_patterns) {
                continue;
            }

            files.push(file_path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    (files, scan_errors)
}

/// Read a file using a bounded streaming read, enforcing `max_file_size`.
///
/// Returns `ScanResult::Err` if the file exceeds `max_file_size`, an I/O
/// error occurs, or the content is not valid UTF-8.
#[must_use]
pub fn read_file_bounded(path: &Path, max_file_size: u64) -> ScanResult {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            return ScanResult::Err(ScanError::new(
                path,
                ScanErrorKind::IoError,
                format!("Failed to open file: {e}"),
            ));
        }
    };

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    if let Err(e) = file.take(max_file_size + 1).read_to_end(&mut buffer) {
        return ScanResult::Err(ScanError::new(
            path,
            ScanErrorKind::IoError,
            format!("Failed to read file: {e}"),
        ));
    }

    if buffer.len() as u64 > max_file_size {
        return ScanResult::Err(ScanError::new(
            path,
            ScanErrorKind::FileTooLarge,
            format!("File exceeds maximum size of {max_file_size} bytes"),
        ));
    }

    match String::from_utf8(buffer) {
        Ok(content) => ScanResult::Ok(content),
        Err(_) => ScanResult::Err(ScanError::new(
            path,
            ScanErrorKind::InvalidEncoding,
            "File is not valid UTF-8",
        )),
    }
}
