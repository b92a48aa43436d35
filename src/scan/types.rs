use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Settings;
use crate::paths::{PATH_HOME, PATH_MEDIA, PATH_MNT, steam_library_folders, steam_roots};

/// A discovered or manually added prefix (the `pfx` directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRecord {
    pub display_name: String,
    pub path: PathBuf,
}

/// A Proton distribution with a `proton` launcher inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtonRecord {
    pub name: String,
    pub install_dir: PathBuf,
    pub runner_binary: PathBuf,
}

/// Result of one background scan. Replaces the previous report wholesale.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub prefixes: Vec<PrefixRecord>,
    pub protons: Vec<ProtonRecord>,
}

/// Where the scanner looks.
#[derive(Debug, Clone)]
pub struct ScanRoots {
    pub home: PathBuf,
    /// Children of this directory are mount roots (normally `/mnt`).
    pub mnt: PathBuf,
    /// Grandchildren of this directory are mount roots (normally `/media`).
    pub media: PathBuf,
    /// Steam installs and libraries checked for compatdata without walking.
    pub steam_roots: Vec<PathBuf>,
    /// Extra roots walked like mounts.
    pub extra_roots: Vec<PathBuf>,
    pub max_depth: usize,
}

impl ScanRoots {
    /// The real system layout, including every library the local Steam
    /// installation knows about.
    pub fn system(settings: &Settings) -> Self {
        let mut roots = steam_roots(&PATH_HOME);
        for folder in steam_library_folders() {
            if !roots.contains(&folder) {
                roots.push(folder);
            }
        }

        Self {
            home: PATH_HOME.clone(),
            mnt: PathBuf::from(PATH_MNT),
            media: PathBuf::from(PATH_MEDIA),
            steam_roots: roots,
            extra_roots: settings.extra_scan_roots.clone(),
            max_depth: settings.scan_max_depth,
        }
    }
}
