//! Launch preflight: hard preconditions plus advisory checks
//!
//! Preconditions block the launch. Advisory checks only produce warnings
//! (as launcher lines and tracing events) and never fail a launch.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::CompatLayer;
use crate::error::LaunchError;
use crate::launch::pure::CommandSpec;
use crate::launch::types::{LaunchRequest, LifecycleEvent};

/// Registry hives every initialised prefix carries.
const PREFIX_HIVES: [&str; 2] = ["system.reg", "user.reg"];

/// Upper bound on `wineserver -k` before it is killed.
const WINESERVER_KILL_TIMEOUT: Duration = Duration::from_secs(3);

/// Where Proton builds ship their wineserver, relative to the install dir.
const PROTON_WINESERVER_DIRS: [&str; 2] = ["files/bin", "dist/bin"];

/// Check launch preconditions. Returns the absolute executable path.
pub fn validate(request: &LaunchRequest) -> Result<PathBuf, LaunchError> {
    if !request.executable.is_file() {
        return Err(LaunchError::ExecutableNotFound(request.executable.clone()));
    }
    if !request.prefix.is_dir() {
        return Err(LaunchError::PrefixNotFound(request.prefix.clone()));
    }
    if let CompatLayer::Proton { runner, .. } = &request.compat
        && !runner.is_file()
    {
        return Err(LaunchError::ProtonRunnerNotFound(runner.clone()));
    }
    Ok(std::path::absolute(&request.executable)?)
}

/// The launcher's own environment, skipping entries that are not UTF-8.
pub fn ambient_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Resolve a program the way `execvp` would: paths are taken as-is, bare
/// names are searched on `search_path`.
pub fn resolve_program(program: &Path, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }
    std::env::split_paths(search_path?)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

/// Log `<program> --version` in the background.
fn spawn_version_check(program: PathBuf, spec: &CommandSpec) {
    let env = spec.env.clone();
    std::thread::spawn(move || {
        let output = Command::new(&program)
            .arg("--version")
            .env_clear()
            .envs(env)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
                info!("launch: using {} ({})", program.display(), version);
            }
            Ok(out) => warn!(
                "launch: {} --version exited with {}",
                program.display(),
                out.status
            ),
            Err(e) => warn!("launch: could not run {} --version: {}", program.display(), e),
        }
    });
}

fn search_path(spec: &CommandSpec) -> Option<&OsStr> {
    spec.env
        .iter()
        .find(|(k, _)| k == "PATH")
        .map(|(_, v)| OsStr::new(v.as_str()))
}

/// Proton build name from `<install_dir>/version`.
///
/// The file holds `<build timestamp> <name>`; a file without a timestamp is
/// returned whole.
pub fn proton_version(install_dir: &Path) -> Option<String> {
    let raw = fs::read_to_string(install_dir.join("version")).ok()?;
    let raw = raw.trim();
    let name = match raw.split_once(char::is_whitespace) {
        Some((stamp, name)) if stamp.chars().all(|c| c.is_ascii_digit()) => name.trim(),
        _ => raw,
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// Advisory check that the compatibility layer can be found.
pub fn check_compat_layer(request: &LaunchRequest, spec: &CommandSpec) -> Vec<LifecycleEvent> {
    let search_path = search_path(spec);

    match &request.compat {
        CompatLayer::Wine => match resolve_program(&request.wine_binary, search_path) {
            Some(resolved) => {
                debug!("launch: wine resolved to {}", resolved.display());
                spawn_version_check(resolved, spec);
                Vec::new()
            }
            None => {
                let msg = format!(
                    "Warning: {} was not found on PATH, the launch will probably fail",
                    request.wine_binary.display()
                );
                warn!("launch: {}", msg);
                vec![LifecycleEvent::launcher_warning(msg)]
            }
        },
        CompatLayer::Proton {
            runner,
            install_dir,
            ..
        } => {
            if is_executable(runner) {
                match proton_version(install_dir) {
                    Some(version) => {
                        info!("launch: using Proton {} ({})", version, runner.display())
                    }
                    None => info!("launch: using Proton runner {}", runner.display()),
                }
                Vec::new()
            } else {
                let msg = format!("Warning: Proton runner {} is not executable", runner.display());
                warn!("launch: {}", msg);
                vec![LifecycleEvent::launcher_warning(msg)]
            }
        }
    }
}

/// Locate the wineserver that belongs to the request's compatibility layer.
///
/// Wine uses the wineserver next to the resolved wine binary, Proton the
/// one inside its install dir. Both fall back to `wineserver` on the search
/// path.
pub fn wineserver_for(request: &LaunchRequest, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let bundled: Vec<PathBuf> = match &request.compat {
        CompatLayer::Wine => resolve_program(&request.wine_binary, search_path)
            .and_then(|wine| wine.parent().map(|dir| dir.join("wineserver")))
            .into_iter()
            .collect(),
        CompatLayer::Proton { install_dir, .. } => PROTON_WINESERVER_DIRS
            .iter()
            .map(|dir| install_dir.join(dir).join("wineserver"))
            .collect(),
    };
    bundled
        .into_iter()
        .find(|candidate| is_executable(candidate))
        .or_else(|| resolve_program(Path::new("wineserver"), search_path))
}

fn run_with_timeout(mut cmd: Command, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let mut child = cmd.spawn()?;
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(20));
    }
}

/// Advisory `wineserver -k` for the request's prefix.
///
/// Runs with the launch environment so `WINEPREFIX` (and for Proton
/// `STEAM_COMPAT_DATA_PATH`) point at the game's prefix. Failures only
/// produce a note.
pub fn cleanup_wineserver(request: &LaunchRequest, spec: &CommandSpec) -> Vec<LifecycleEvent> {
    let mut events = vec![LifecycleEvent::launcher_line(
        "=== Cleaning up old wineserver ===",
    )];

    let Some(wineserver) = wineserver_for(request, search_path(spec)) else {
        let msg = "Note: wineserver cleanup skipped (wineserver not found)";
        warn!("launch: {}", msg);
        events.push(LifecycleEvent::launcher_warning(msg));
        return events;
    };

    let mut cmd = Command::new(&wineserver);
    cmd.arg("-k")
        .env_clear()
        .envs(spec.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    match run_with_timeout(cmd, WINESERVER_KILL_TIMEOUT) {
        Ok(Some(status)) => {
            debug!("launch: {} -k exited with {}", wineserver.display(), status);
            info!(
                "launch: terminated existing wineserver for {}",
                request.prefix.display()
            );
            events.push(LifecycleEvent::launcher_line(
                "Terminated any existing wineserver for this prefix",
            ));
        }
        Ok(None) => {
            let msg = format!(
                "Note: wineserver cleanup skipped ({} -k timed out)",
                wineserver.display()
            );
            warn!("launch: {}", msg);
            events.push(LifecycleEvent::launcher_warning(msg));
        }
        Err(e) => {
            let msg = format!("Note: wineserver cleanup skipped ({})", e);
            warn!("launch: {}", msg);
            events.push(LifecycleEvent::launcher_warning(msg));
        }
    }
    events
}

/// Advisory check that the prefix has been initialised.
pub fn check_prefix(prefix: &Path) -> Option<LifecycleEvent> {
    let missing: Vec<&str> = PREFIX_HIVES
        .iter()
        .copied()
        .filter(|hive| !prefix.join(hive).is_file())
        .collect();
    if missing.is_empty() {
        return None;
    }

    let msg = format!(
        "Warning: prefix may be incomplete ({} missing in {})",
        missing.join(", "),
        prefix.display()
    );
    warn!("launch: {}", msg);
    Some(LifecycleEvent::launcher_warning(msg))
}
