// Failure categories, messages and remediation hints (pure)

use std::io;

use crate::catalog::CompatLayer;
use crate::launch::types::FailureKind;

pub fn describe_failure(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::NotFound => "Compatibility layer could not be started (not found)",
        FailureKind::Crashed => "Process crashed",
        FailureKind::StartTimeout => "Process did not start in time",
        FailureKind::WriteError => "Write error while talking to the process",
        FailureKind::ReadError => "Read error while capturing process output",
        FailureKind::Unknown => "Unknown process error",
    }
}

/// Map an immediate spawn failure to a failure category.
pub fn failure_kind_for_spawn_error(error: &io::Error) -> FailureKind {
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FailureKind::NotFound,
        io::ErrorKind::BrokenPipe | io::ErrorKind::WriteZero => FailureKind::WriteError,
        io::ErrorKind::UnexpectedEof => FailureKind::ReadError,
        io::ErrorKind::TimedOut => FailureKind::StartTimeout,
        _ => FailureKind::Unknown,
    }
}

/// Signals that indicate a crash rather than a requested termination.
pub fn is_crash_signal(signal: i32) -> bool {
    matches!(
        signal,
        libc::SIGSEGV | libc::SIGABRT | libc::SIGBUS | libc::SIGILL | libc::SIGFPE
    )
}

/// Actionable follow-ups for a failure; empty when there is nothing to add.
pub fn failure_hints(kind: FailureKind, compat: &CompatLayer) -> Vec<String> {
    match (kind, compat) {
        (FailureKind::NotFound, CompatLayer::Wine) => vec![
            "Make sure Wine is installed and on your PATH:".to_string(),
            "  Ubuntu/Debian: sudo apt install wine".to_string(),
            "  Arch: sudo pacman -S wine".to_string(),
            "  Fedora: sudo dnf install wine".to_string(),
            "Or set wine_binary in settings.json to the full path of your wine binary.".to_string(),
        ],
        (FailureKind::NotFound, CompatLayer::Proton { runner, .. }) => vec![
            format!("Check that {} exists and is executable.", runner.display()),
            "Rescan Proton versions and reselect one for this game.".to_string(),
        ],
        (FailureKind::StartTimeout, _) => vec![
            "The compatibility layer may be waiting on a dialog or a stuck wineserver.".to_string(),
            "Try again, or run `wineserver -k` with this WINEPREFIX first.".to_string(),
        ],
        (FailureKind::Crashed, _) => {
            vec!["Enable verbose logging and relaunch to capture Wine debug output.".to_string()]
        }
        _ => Vec::new(),
    }
}
