//! Directory walk: container discovery and the attachment index.
//!
//! One pass over the tree yields both the list of message containers and a
//! read-only index of every other file, keyed by lowercased filename, for
//! later attachment resolution. Symlinks are not followed; unreadable
//! directories are skipped with a warning, never fatal.

pub mod index;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ChatlineError, Result};
use index::AttachmentIndex;

/// Counters gathered during the walk.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkStats {
    /// Regular files seen (containers + indexed files).
    pub files_seen: u64,
    /// Directory entries skipped because they could not be read.
    pub entries_skipped: u64,
}

/// Everything the walk produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Container files, in deterministic (name-sorted) traversal order.
    pub containers: Vec<PathBuf>,
    /// Filename → path index over every non-container file.
    pub attachments: AttachmentIndex,
    /// Walk counters for the final summary.
    pub stats: WalkStats,
}

/// Walk `root` recursively, separating container files from attachment
/// candidates.
///
/// `container_name` is matched case-insensitively against file names.
/// `report_name` (the workbook this run will write) is excluded from both the
/// index and the counts so a re-run over a tree already holding a report is
/// byte-stable.
///
/// Traversal is sorted by file name so that "first encountered" is
/// deterministic across platforms.
pub fn scan(root: &Path, container_name: &str, report_name: &str) -> Result<ScanOutcome> {
    if !root.exists() {
        return Err(ChatlineError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ChatlineError::NotADirectory(root.to_path_buf()));
    }

    let mut containers = Vec::new();
    let mut attachments = AttachmentIndex::default();
    let mut stats = WalkStats::default();

    let walk = WalkDir::new(root).follow_links(false).sort_by_file_name();

    for entry in walk {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                stats.entries_skipped += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.eq_ignore_ascii_case(report_name) {
            debug!(path = %entry.path().display(), "Ignoring existing report file");
            continue;
        }

        stats.files_seen += 1;

        if name.eq_ignore_ascii_case(container_name) {
            containers.push(entry.path().to_path_buf());
        } else {
            attachments.insert(&name, entry.path().to_path_buf());
        }
    }

    debug!(
        containers = containers.len(),
        indexed = attachments.len(),
        skipped = stats.entries_skipped,
        "Scan complete"
    );

    Ok(ScanOutcome {
        containers,
        attachments,
        stats,
    })
}
