use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Launcher settings, persisted as `settings.json` in the config directory.
///
/// Every field carries a serde default so settings files written by older
/// versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// How long a launch may stay in `Starting` before it fails.
    #[serde(default = "default_start_timeout_ms")]
    pub start_timeout_ms: u64,
    /// Grace period between SIGTERM and SIGKILL when aborting.
    #[serde(default = "default_abort_grace_ms")]
    pub abort_grace_ms: u64,
    /// Interval of the diagnostic liveness check on running processes.
    #[serde(default = "default_liveness_interval_ms")]
    pub liveness_interval_ms: u64,
    #[serde(default = "default_scan_max_depth")]
    pub scan_max_depth: usize,
    /// Display passed to launched games. Falls back to `$DISPLAY`, then `:0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Environment variables applied to every launch.
    #[serde(default)]
    pub global_env: BTreeMap<String, String>,
    /// Additional roots walked by the prefix scan.
    #[serde(default)]
    pub extra_scan_roots: Vec<PathBuf>,
    #[serde(default = "default_wine_binary")]
    pub wine_binary: PathBuf,
    /// Kill a stale wineserver for the prefix before each launch.
    #[serde(default = "default_wineserver_cleanup")]
    pub wineserver_cleanup: bool,
}

fn default_start_timeout_ms() -> u64 {
    5000
}

fn default_abort_grace_ms() -> u64 {
    3000
}

fn default_liveness_interval_ms() -> u64 {
    2000
}

fn default_scan_max_depth() -> usize {
    3
}

fn default_wine_binary() -> PathBuf {
    PathBuf::from("wine")
}

fn default_wineserver_cleanup() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_timeout_ms: default_start_timeout_ms(),
            abort_grace_ms: default_abort_grace_ms(),
            liveness_interval_ms: default_liveness_interval_ms(),
            scan_max_depth: default_scan_max_depth(),
            display: None,
            global_env: BTreeMap::new(),
            extra_scan_roots: Vec::new(),
            wine_binary: default_wine_binary(),
            wineserver_cleanup: default_wineserver_cleanup(),
        }
    }
}
