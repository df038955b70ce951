//! Filename → path index over every non-container file under the root.
//!
//! Built once by the walk, read-only afterward, dropped at process end.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Mapping from lowercased filename to the first path seen with that name.
///
/// Exports declare attachments by bare `export_name`, with no directory
/// component, so resolution is exact filename match. When two files in the
/// tree share a name the first one encountered (in the walk's name-sorted
/// order) wins; the collision is logged and counted rather than guessed at.
#[derive(Debug, Default)]
pub struct AttachmentIndex {
    by_name: HashMap<String, PathBuf>,
    collisions: u64,
}

impl AttachmentIndex {
    /// Register a file. Keeps the first path for each name.
    pub fn insert(&mut self, name: &str, path: PathBuf) {
        let key = name.to_lowercase();
        if let Some(existing) = self.by_name.get(&key) {
            warn!(
                name = name,
                kept = %existing.display(),
                ignored = %path.display(),
                "Ambiguous attachment filename, keeping first encountered"
            );
            self.collisions += 1;
        } else {
            self.by_name.insert(key, path);
        }
    }

    /// Look up a declared attachment name.
    pub fn resolve(&self, declared: &str) -> Option<&Path> {
        self.by_name
            .get(&declared.to_lowercase())
            .map(PathBuf::as_path)
    }

    /// Number of distinct filenames indexed.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the index holds nothing.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Number of filename collisions observed during the build.
    pub fn collisions(&self) -> u64 {
        self.collisions
    }
}
