use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use crate::catalog::{CompatLayer, GameRecord};
use crate::config::Settings;
use crate::launch::pure::LineClass;

/// Everything needed to start one game.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub game_name: String,
    pub executable: PathBuf,
    pub prefix: PathBuf,
    pub compat: CompatLayer,
    pub verbose: bool,
    /// Per-game environment variables.
    pub launch_options: BTreeMap<String, String>,
    /// Environment variables applied to every launch.
    pub global_env: BTreeMap<String, String>,
    pub display: Option<String>,
    pub wine_binary: PathBuf,
    /// `WINEDEBUG` used when not verbose.
    pub wine_log_level: Option<String>,
    /// Run `wineserver -k` on the prefix before launching.
    pub wineserver_cleanup: bool,
}

impl LaunchRequest {
    pub fn from_game(game: &GameRecord, verbose: bool, settings: &Settings) -> Self {
        Self {
            game_name: game.name.clone(),
            executable: game.executable_path.clone(),
            prefix: game.prefix_path.clone(),
            compat: game.compat_layer(),
            verbose,
            launch_options: game.launch_options.clone(),
            global_env: settings.global_env.clone(),
            display: settings.display.clone(),
            wine_binary: settings.wine_binary.clone(),
            wine_log_level: game.wine_log_level.clone(),
            wineserver_cleanup: settings.wineserver_cleanup,
        }
    }
}

/// Timeouts governing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub start_timeout: Duration,
    pub abort_grace: Duration,
    pub liveness_interval: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for SessionTiming {
    fn from(settings: &Settings) -> Self {
        Self {
            start_timeout: Duration::from_millis(settings.start_timeout_ms),
            abort_grace: Duration::from_millis(settings.abort_grace_ms),
            liveness_interval: Duration::from_millis(settings.liveness_interval_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Starting,
    Running,
    Finished,
    Failed,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Finished | SessionState::Failed | SessionState::Aborted
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
            SessionState::Finished => "finished",
            SessionState::Failed => "failed",
            SessionState::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Where an output line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputChannel {
    Stdout,
    Stderr,
    /// Status lines written by the launcher itself.
    Launcher,
}

/// Category of an asynchronous launch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NotFound,
    Crashed,
    StartTimeout,
    WriteError,
    ReadError,
    Unknown,
}

/// Lifecycle events, delivered in order per session.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Started {
        pid: u32,
    },
    OutputLine {
        channel: OutputChannel,
        class: LineClass,
        text: String,
    },
    StateChanged {
        state: SessionState,
    },
    /// `exit_code` is the signal number when `signaled` is set.
    Finished {
        exit_code: i32,
        signaled: bool,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl LifecycleEvent {
    pub(crate) fn launcher_line(text: impl Into<String>) -> Self {
        LifecycleEvent::OutputLine {
            channel: OutputChannel::Launcher,
            class: LineClass::Plain,
            text: text.into(),
        }
    }

    pub(crate) fn launcher_warning(text: impl Into<String>) -> Self {
        LifecycleEvent::OutputLine {
            channel: OutputChannel::Launcher,
            class: LineClass::Warning,
            text: text.into(),
        }
    }

    pub(crate) fn launcher_error(text: impl Into<String>) -> Self {
        LifecycleEvent::OutputLine {
            channel: OutputChannel::Launcher,
            class: LineClass::Error,
            text: text.into(),
        }
    }
}

/// Returned by a successful `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub game_name: String,
    pub started_at: SystemTime,
}

/// How a session ended, for play statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub game_name: String,
    pub state: SessionState,
    pub started_at: SystemTime,
    /// Wall time from spawn request to the terminal state.
    pub duration: Duration,
    /// Exit code, or signal number when `signaled`.
    pub exit_code: Option<i32>,
    pub signaled: bool,
    pub failure: Option<FailureKind>,
    /// Whether the process was confirmed started.
    pub ran: bool,
}

impl SessionSummary {
    /// Abnormal end of a game that actually ran. Aborts never count.
    pub fn is_crash(&self) -> bool {
        match self.state {
            SessionState::Finished => self.exit_code != Some(0),
            SessionState::Failed => self.ran,
            _ => false,
        }
    }
}
