// Launch environment construction (pure, no I/O)

use std::collections::BTreeMap;

use crate::catalog::CompatLayer;
use crate::launch::types::LaunchRequest;

pub const WINEDEBUG_VERBOSE: &str = "+all";
/// Keep warnings, drop fixme noise.
pub const WINEDEBUG_QUIET: &str = "warn+all,fixme-all";
/// winemenubuilder creates desktop entries and file associations on the host.
pub const WINEDLLOVERRIDES_DEFAULT: &str = "winemenubuilder.exe=d";
pub const DISPLAY_FALLBACK: &str = ":0";

/// Build the complete process environment for `request`.
///
/// Layers, later wins: `ambient`, global settings environment, per-game
/// launch options, then the variables the launch itself requires.
/// `WINEDEBUG` is `+all` when verbose, else the game's log level, else the
/// quiet default. The
/// result is sorted by key and has no duplicate keys.
pub fn build_env<I, K, V>(request: &LaunchRequest, ambient: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut env: BTreeMap<String, String> = ambient
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    let ambient_display = env.get("DISPLAY").cloned();

    for (key, value) in request.global_env.iter().chain(request.launch_options.iter()) {
        env.insert(key.clone(), value.clone());
    }

    let prefix = request.prefix.to_string_lossy().into_owned();
    env.insert("WINEPREFIX".to_string(), prefix.clone());

    if let CompatLayer::Proton { install_dir, .. } = &request.compat {
        env.insert("STEAM_COMPAT_DATA_PATH".to_string(), prefix);
        env.insert(
            "STEAM_COMPAT_CLIENT_INSTALL_PATH".to_string(),
            install_dir.to_string_lossy().into_owned(),
        );
    }

    let winedebug = match (request.verbose, request.wine_log_level.as_deref()) {
        (true, _) => WINEDEBUG_VERBOSE,
        (false, Some(level)) if !level.trim().is_empty() => level.trim(),
        (false, _) => WINEDEBUG_QUIET,
    };
    env.insert("WINEDEBUG".to_string(), winedebug.to_string());
    env.insert(
        "WINEDLLOVERRIDES".to_string(),
        WINEDLLOVERRIDES_DEFAULT.to_string(),
    );

    let display = request
        .display
        .clone()
        .or(ambient_display)
        .unwrap_or_else(|| DISPLAY_FALLBACK.to_string());
    env.insert("DISPLAY".to_string(), display);

    env.into_iter().collect()
}

/// `KEY=VALUE` strings, in the order given.
pub fn format_env(env: &[(String, String)]) -> Vec<String> {
    env.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
}
