//! Launch orchestrator: at most one active session per game
//!
//! Owns every session and routes their events to a single `OutputSink`.
//! Sessions that reach a terminal state are retired on `poll`/`abort` and
//! kept until the next launch of the same game, so their output can still
//! be read and exported.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

use tracing::{error, info, warn};

use crate::catalog::GameRecord;
use crate::config::Settings;
use crate::error::LaunchError;
use crate::launch::operations::OutputLog;
use crate::launch::pipelines::session::LaunchSession;
use crate::launch::pure::LineClass;
use crate::launch::types::{
    LaunchRequest, LifecycleEvent, SessionHandle, SessionState, SessionSummary, SessionTiming,
};

/// Receives every lifecycle event, in order per game.
pub trait OutputSink {
    fn on_event(&mut self, game: &str, event: &LifecycleEvent);
}

/// Forwards output lines and lifecycle changes to `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn on_event(&mut self, game: &str, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::OutputLine { class, text, .. } => match class {
                LineClass::Error => error!("[{}] {}", game, text),
                LineClass::Warning => warn!("[{}] {}", game, text),
                _ => info!("[{}] {}", game, text),
            },
            LifecycleEvent::StateChanged { state } => info!("[{}] state: {}", game, state),
            LifecycleEvent::Started { pid } => info!("[{}] started (pid {})", game, pid),
            LifecycleEvent::Finished {
                exit_code,
                signaled,
            } => info!(
                "[{}] finished (exit code {}, signaled {})",
                game, exit_code, signaled
            ),
            LifecycleEvent::Failed { kind, message } => {
                error!("[{}] failed ({:?}): {}", game, kind, message)
            }
        }
    }
}

pub struct LaunchOrchestrator<S: OutputSink> {
    settings: Settings,
    active: BTreeMap<String, LaunchSession>,
    retired: BTreeMap<String, LaunchSession>,
    sink: S,
}

impl<S: OutputSink> LaunchOrchestrator<S> {
    pub fn new(settings: Settings, sink: S) -> Self {
        Self {
            settings,
            active: BTreeMap::new(),
            retired: BTreeMap::new(),
            sink,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Launch a catalog game.
    ///
    /// Fails with `AlreadyRunning` while the game has an active session and
    /// with a precondition error when the executable, prefix or Proton
    /// runner is missing; in both cases nothing is spawned or registered.
    pub fn start(&mut self, game: &GameRecord, verbose: bool) -> Result<SessionHandle, LaunchError> {
        if self.active.contains_key(&game.name) {
            return Err(LaunchError::AlreadyRunning(game.name.clone()));
        }

        let request =
            LaunchRequest::from_game(game, verbose || game.verbose_logging, &self.settings);
        let mut session = LaunchSession::new(request, SessionTiming::from(&self.settings));
        let events = session.start()?;

        for event in &events {
            self.sink.on_event(&game.name, event);
        }
        let handle = SessionHandle {
            game_name: game.name.clone(),
            started_at: session.started_at().unwrap_or_else(SystemTime::now),
        };
        self.retired.remove(&game.name);
        self.active.insert(game.name.clone(), session);
        Ok(handle)
    }

    /// Abort a running game. Blocks for at most the abort grace period.
    pub fn abort(&mut self, name: &str) -> Result<SessionSummary, LaunchError> {
        let session = self
            .active
            .get_mut(name)
            .ok_or_else(|| LaunchError::NotFound(name.to_string()))?;
        let events = session.abort()?;
        let summary = session.summary().ok_or_else(|| LaunchError::InvalidState {
            name: name.to_string(),
            state: session.state(),
        });

        for event in &events {
            self.sink.on_event(name, event);
        }
        self.retire(name);
        summary
    }

    /// Deliver pending events of every active session. Returns a summary
    /// for each session that ended during this call.
    pub fn poll(&mut self) -> Vec<SessionSummary> {
        let mut ended = Vec::new();
        for (name, session) in self.active.iter_mut() {
            for event in session.poll() {
                self.sink.on_event(name, &event);
            }
            if let Some(summary) = session.summary() {
                ended.push(summary);
            }
        }
        for summary in &ended {
            self.retire(&summary.game_name);
        }
        ended
    }

    fn retire(&mut self, name: &str) {
        if let Some(session) = self.active.remove(name) {
            info!("launch: {} ended ({})", name, session.state());
            self.retired.insert(name.to_string(), session);
        }
    }

    /// State of the game's current or most recent session.
    pub fn state(&self, name: &str) -> Option<SessionState> {
        self.session(name).map(LaunchSession::state)
    }

    /// Outcome of the game's most recent session, once it has ended.
    pub fn summary(&self, name: &str) -> Option<SessionSummary> {
        self.session(name).and_then(LaunchSession::summary)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn active_games(&self) -> impl Iterator<Item = &str> {
        self.active.keys().map(String::as_str)
    }

    fn session(&self, name: &str) -> Option<&LaunchSession> {
        self.active.get(name).or_else(|| self.retired.get(name))
    }

    /// Output of the game's current or most recent session.
    pub fn log(&self, name: &str) -> Option<&OutputLog> {
        self.session(name).map(LaunchSession::log)
    }

    pub fn clear_log(&mut self, name: &str) -> Result<(), LaunchError> {
        let session = match self.active.get_mut(name) {
            Some(session) => session,
            None => self
                .retired
                .get_mut(name)
                .ok_or_else(|| LaunchError::NoLog(name.to_string()))?,
        };
        session.clear_log();
        Ok(())
    }

    pub fn export_log(&self, name: &str, path: &Path) -> Result<(), LaunchError> {
        let log = self
            .log(name)
            .ok_or_else(|| LaunchError::NoLog(name.to_string()))?;
        log.export(path)?;
        info!("launch: exported {} log lines to {}", log.len(), path.display());
        Ok(())
    }
}
