//! Full prefix and Proton scan

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::scan::operations::{Walker, inspect_compatdata, list_subdirs, proton_runners_in};
use crate::scan::pure::DEFAULT_PRUNE;
use crate::scan::types::{PrefixRecord, ProtonRecord, ScanReport, ScanRoots};

/// Proton tool directories inside a Steam root.
const PROTON_TOOL_DIRS: &[&str] = &["steamapps/common", "compatibilitytools.d"];

/// Collects records, keeping the first record seen for each resolved path.
struct Dedup<T> {
    seen: HashSet<PathBuf>,
    records: Vec<T>,
}

impl<T> Dedup<T> {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn insert(&mut self, path: &Path, record: T) -> bool {
        let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !self.seen.insert(resolved) {
            return false;
        }
        self.records.push(record);
        true
    }
}

/// Locates compatdata prefixes on well-known Steam roots and on a bounded
/// walk of every mount root.
#[derive(Debug, Clone)]
pub struct PrefixScanner {
    roots: ScanRoots,
    walker: Walker,
}

impl PrefixScanner {
    pub fn new(roots: ScanRoots) -> Self {
        // steamapps is inspected directly, its subtree is never walked
        let walker = Walker::new(roots.max_depth)
            .prune(DEFAULT_PRUNE.iter().copied())
            .prune(["steamapps"])
            .prune_hidden(true);
        Self { roots, walker }
    }

    pub fn roots(&self) -> &ScanRoots {
        &self.roots
    }

    /// Immediate children of `/mnt`, children of each `/media/<user>`, the
    /// home directory and any configured extra roots.
    pub fn mount_roots(&self) -> Vec<PathBuf> {
        let mut mounts = list_subdirs(&self.roots.mnt);
        for user_dir in list_subdirs(&self.roots.media) {
            mounts.extend(list_subdirs(&user_dir));
        }
        mounts.push(self.roots.home.clone());
        mounts.extend(self.roots.extra_roots.iter().cloned());
        mounts
    }

    /// Every discoverable prefix, deduplicated by resolved path.
    ///
    /// Never fails: unreadable directories are skipped.
    pub fn scan(&self) -> Vec<PrefixRecord> {
        let start = Instant::now();
        let mut found = Dedup::new();

        for steam_root in &self.roots.steam_roots {
            collect_compatdata(&steam_root.join("steamapps/compatdata"), &mut found);
        }

        for mount in self.mount_roots() {
            tracing::debug!("scan: walking {}", mount.display());
            for dir in self.walker.walk(&mount) {
                let steamapps = dir.join("steamapps");
                if steamapps.is_dir() {
                    tracing::debug!("scan: found steamapps at {}", dir.display());
                    collect_compatdata(&steamapps.join("compatdata"), &mut found);
                }
            }
        }

        tracing::info!(
            "scan: found {} prefix(es) in {:.1}s",
            found.records.len(),
            start.elapsed().as_secs_f32()
        );
        found.records
    }

    /// Proton distributions under each Steam root's tool directories.
    pub fn scan_protons(&self) -> Vec<ProtonRecord> {
        let mut found = Dedup::new();

        for steam_root in &self.roots.steam_roots {
            for tools in PROTON_TOOL_DIRS {
                for proton in proton_runners_in(&steam_root.join(tools)) {
                    let runner = proton.runner_binary.clone();
                    found.insert(&runner, proton);
                }
            }
        }

        tracing::info!("scan: found {} Proton version(s)", found.records.len());
        found.records
    }

    pub fn scan_all(&self) -> ScanReport {
        ScanReport {
            prefixes: self.scan(),
            protons: self.scan_protons(),
        }
    }
}

fn collect_compatdata(compatdata: &Path, found: &mut Dedup<PrefixRecord>) {
    for (display_name, path) in inspect_compatdata(compatdata) {
        let record = PrefixRecord {
            display_name,
            path: path.clone(),
        };
        found.insert(&path, record);
    }
}
