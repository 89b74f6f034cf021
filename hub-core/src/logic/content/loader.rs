//! Content directory loader
//!
//! Scans the content directory, parses each document and folds the results
//! into a [`LoadReport`]. A bad file is recorded and skipped; it never aborts
//! the batch.

use std::fs;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::constants::CONTENT_EXTENSIONS;
use super::normalize::normalize_document;
use super::types::{ContentRecord, LoadError, LoadErrorKind, LoadReport, LoaderOptions};

/// Load every content document under `options.content_dir`.
///
/// A missing directory yields an empty report and a warning.
pub fn load_content(options: &LoaderOptions) -> LoadReport {
    let dir = &options.content_dir;
    let mut report = LoadReport::default();

    if !dir.is_dir() {
        log::warn!("Content directory {} not found - serving no content", dir.display());
        return report;
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let file = e
                    .path()
                    .map(|p| relative_id(dir, p))
                    .unwrap_or_else(|| dir.display().to_string());
                report.errors.push(LoadError {
                    file,
                    kind: LoadErrorKind::Io(e.to_string()),
                });
                continue;
            }
        };

        if !is_content_document(&entry) {
            continue;
        }

        report.files_seen += 1;
        let id = relative_id(dir, entry.path());

        match load_document(entry.path(), &id, options.max_document_bytes) {
            Ok(record) => {
                report.filters.absorb(&record);
                report.records.push(record);
            }
            Err(kind) => report.errors.push(LoadError { file: id, kind }),
        }
    }

    log::info!(
        "Loaded {} queries from {} files in {}",
        report.records.len(),
        report.files_seen,
        dir.display()
    );
    for error in &report.errors {
        log::error!("Query load error: {}", error);
    }

    report
}

/// Read, parse and normalize a single document
pub fn load_document(path: &Path, id: &str, max_bytes: u64) -> Result<ContentRecord, LoadErrorKind> {
    let size = fs::metadata(path)
        .map_err(|e| LoadErrorKind::Io(e.to_string()))?
        .len();
    if size > max_bytes {
        return Err(LoadErrorKind::TooLarge { size, limit: max_bytes });
    }

    let text = fs::read_to_string(path).map_err(|e| LoadErrorKind::Io(e.to_string()))?;
    let root: serde_yaml::Value =
        serde_yaml::from_str(&text).map_err(|e| LoadErrorKind::Parse(e.to_string()))?;

    normalize_document(id.to_string(), root)
}

fn is_content_document(entry: &DirEntry) -> bool {
    if !has_content_extension(entry.path()) {
        return false;
    }

    // Links are not followed: a symlink reports its own file type
    if entry.path_is_symlink() {
        log::debug!("Skipping symlinked document {}", entry.path().display());
        return false;
    }

    entry.file_type().is_file()
}

fn has_content_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CONTENT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// `/`-joined path relative to the content dir; the bare filename at depth 1
fn relative_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
