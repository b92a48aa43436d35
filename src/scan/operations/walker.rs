// Bounded directory walker

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::scan::pure::is_hidden;

/// Depth-limited directory walk with a prune list.
///
/// Never follows symlinks. Directories that cannot be read are logged at
/// debug level and skipped; the walk continues with their siblings.
#[derive(Debug, Clone)]
pub struct Walker {
    max_depth: usize,
    prune: BTreeSet<String>,
    prune_hidden: bool,
}

impl Walker {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            prune: BTreeSet::new(),
            prune_hidden: false,
        }
    }

    pub fn prune<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prune.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn prune_hidden(mut self, prune_hidden: bool) -> Self {
        self.prune_hidden = prune_hidden;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_pruned(&self, name: &str) -> bool {
        self.prune.contains(name) || (self.prune_hidden && is_hidden(name))
    }

    /// Lazily yield every directory under `root` (including `root`) down to
    /// `max_depth` path components below it, in file-name order.
    ///
    /// The root itself is never pruned by name.
    pub fn walk<'a>(&'a self, root: &Path) -> impl Iterator<Item = PathBuf> + 'a {
        WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry.file_type().is_dir()
                    && (entry.depth() == 0 || !self.is_pruned(&entry.file_name().to_string_lossy()))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(e) => {
                    tracing::debug!("scan: skipping {}", e);
                    None
                }
            })
    }
}
