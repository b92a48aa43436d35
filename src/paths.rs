use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub static PATH_HOME: LazyLock<PathBuf> = LazyLock::new(|| {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/"))
});

pub static PATH_CONFIG: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Some(xdg_config_home) = env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config_home).join("cellar");
    }
    PATH_HOME.join(".config/cellar")
});

pub static PATH_CATALOG: LazyLock<PathBuf> = LazyLock::new(|| PATH_CONFIG.join("games.json"));

pub static PATH_SETTINGS: LazyLock<PathBuf> = LazyLock::new(|| PATH_CONFIG.join("settings.json"));

pub const PATH_MNT: &str = "/mnt";
pub const PATH_MEDIA: &str = "/media";

/// Steam installation roots checked directly, before any bounded walk.
///
/// Covers the native install, the legacy `~/.steam/steam` link, Flatpak Steam
/// and a system-wide install.
pub fn steam_roots(home: &Path) -> Vec<PathBuf> {
    vec![
        home.join(".steam/steam"),
        home.join(".local/share/Steam"),
        home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"),
        PathBuf::from("/usr/share/Steam"),
    ]
}

/// Steam library folders reported by the local Steam installation.
///
/// Empty when Steam cannot be located.
pub fn steam_library_folders() -> Vec<PathBuf> {
    let mut folders = Vec::new();

    if let Ok(steam_dir) = steamlocate::SteamDir::locate()
        && let Ok(libraries) = steam_dir.libraries()
    {
        for library in libraries {
            let library = match library {
                Ok(lib) => lib,
                Err(e) => {
                    tracing::debug!("scan: skipping unreadable Steam library: {}", e);
                    continue;
                }
            };
            let path = library.path().to_path_buf();
            if !folders.contains(&path) {
                folders.push(path);
            }
        }
    }

    folders
}
