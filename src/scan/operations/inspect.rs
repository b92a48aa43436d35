// Directory inspection for compatdata and Proton tool folders

use std::path::{Path, PathBuf};

use crate::scan::pure::{looks_like_proton, prefix_display_name};
use crate::scan::types::ProtonRecord;

/// Immediate subdirectories of `dir`, sorted by name. Symlinks to
/// directories count. Unreadable or missing directories yield nothing.
pub fn list_subdirs(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("scan: cannot read {}: {}", dir.display(), e);
            }
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Every `<compatdata>/<child>/pfx` directory, as `(display name, pfx path)`.
pub fn inspect_compatdata(compatdata: &Path) -> Vec<(String, PathBuf)> {
    list_subdirs(compatdata)
        .into_iter()
        .filter_map(|child| {
            let pfx = child.join("pfx");
            if !pfx.is_dir() {
                return None;
            }
            let name = child.file_name()?.to_string_lossy().into_owned();
            Some((prefix_display_name(&name), pfx))
        })
        .collect()
}

/// Proton distributions directly inside `tools_dir` (`steamapps/common` or
/// `compatibilitytools.d`). A candidate only counts if its `proton`
/// launcher exists.
pub fn proton_runners_in(tools_dir: &Path) -> Vec<ProtonRecord> {
    list_subdirs(tools_dir)
        .into_iter()
        .filter_map(|dir| {
            let name = dir.file_name()?.to_string_lossy().into_owned();
            if !looks_like_proton(&name) {
                return None;
            }
            let runner_binary = dir.join("proton");
            if !runner_binary.is_file() {
                tracing::debug!("scan: {} has no proton launcher", dir.display());
                return None;
            }
            Some(ProtonRecord {
                name,
                install_dir: dir,
                runner_binary,
            })
        })
        .collect()
}
