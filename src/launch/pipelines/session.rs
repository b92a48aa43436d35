//! Per-launch state machine
//!
//! `Idle -> Starting -> Running -> {Finished | Failed | Aborted}`. All
//! methods run on the control thread; the process itself is driven by the
//! worker in `operations::process` and observed through `poll`.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, warn};

use crate::error::LaunchError;
use crate::launch::operations::{
    OutputLog, ProcessMsg, ambient_env, check_compat_layer, check_prefix, cleanup_wineserver,
    is_alive, kill, spawn_process, terminate, validate,
};
use crate::launch::pure::{
    build_env, classify_line, command_spec, describe_failure, failure_hints,
    failure_kind_for_spawn_error, is_crash_signal, launch_banner, should_deliver,
};
use crate::launch::types::{
    FailureKind, LaunchRequest, LifecycleEvent, OutputChannel, SessionState, SessionSummary,
    SessionTiming,
};

pub struct LaunchSession {
    request: LaunchRequest,
    timing: SessionTiming,
    state: SessionState,
    pid: Option<u32>,
    rx: Option<Receiver<ProcessMsg>>,
    log: OutputLog,
    started_at: Option<SystemTime>,
    starting_since: Option<Instant>,
    ended_at: Option<Instant>,
    last_liveness: Instant,
    exit_code: Option<i32>,
    signaled: bool,
    failure: Option<FailureKind>,
}

impl LaunchSession {
    pub fn new(request: LaunchRequest, timing: SessionTiming) -> Self {
        Self {
            request,
            timing,
            state: SessionState::Idle,
            pid: None,
            rx: None,
            log: OutputLog::new(),
            started_at: None,
            starting_since: None,
            ended_at: None,
            last_liveness: Instant::now(),
            exit_code: None,
            signaled: false,
            failure: None,
        }
    }

    pub fn request(&self) -> &LaunchRequest {
        &self.request
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    /// Started and not yet terminal.
    pub fn is_active(&self) -> bool {
        self.state != SessionState::Idle && !self.state.is_terminal()
    }

    /// Outcome of a session that reached a terminal state.
    pub fn summary(&self) -> Option<SessionSummary> {
        if !self.state.is_terminal() {
            return None;
        }
        let started_at = self.started_at?;
        let duration = match (self.starting_since, self.ended_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        };
        Some(SessionSummary {
            game_name: self.request.game_name.clone(),
            state: self.state,
            started_at,
            duration,
            exit_code: self.exit_code,
            signaled: self.signaled,
            failure: self.failure,
            ran: self.pid.is_some(),
        })
    }

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn into_log(self) -> OutputLog {
        self.log
    }

    /// Validate preconditions and spawn the process.
    ///
    /// On a precondition error nothing is spawned and the session stays
    /// `Idle`. Otherwise the session is `Starting` and the returned events
    /// (state change, banner, advisory warnings) should be delivered
    /// before anything `poll` returns.
    pub fn start(&mut self) -> Result<Vec<LifecycleEvent>, LaunchError> {
        if self.state != SessionState::Idle {
            return Err(LaunchError::InvalidState {
                name: self.request.game_name.clone(),
                state: self.state,
            });
        }

        let executable = validate(&self.request)?;
        let env = build_env(&self.request, ambient_env());
        let spec = command_spec(&self.request, &executable, env);

        let mut events = Vec::new();
        self.transition(SessionState::Starting, &mut events);
        for line in launch_banner(&self.request, &spec) {
            self.emit(LifecycleEvent::launcher_line(line), &mut events);
        }
        for warning in check_compat_layer(&self.request, &spec) {
            self.emit(warning, &mut events);
        }
        if let Some(warning) = check_prefix(&self.request.prefix) {
            self.emit(warning, &mut events);
        }
        if self.request.wineserver_cleanup {
            for event in cleanup_wineserver(&self.request, &spec) {
                self.emit(event, &mut events);
            }
        }

        info!(
            "launch: starting {} with {}",
            self.request.game_name,
            spec.display_line()
        );
        self.rx = Some(spawn_process(&spec));
        self.started_at = Some(SystemTime::now());
        self.starting_since = Some(Instant::now());
        Ok(events)
    }

    /// Drain everything the process worker has produced so far. Never blocks.
    pub fn poll(&mut self) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();

        while !self.state.is_terminal() {
            let received = match &self.rx {
                Some(rx) => rx.try_recv(),
                None => break,
            };
            match received {
                Ok(msg) => self.handle(msg, &mut events),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.fail(
                        FailureKind::Unknown,
                        "Process worker stopped unexpectedly".to_string(),
                        &mut events,
                    );
                }
            }
        }

        match self.state {
            SessionState::Starting => self.check_start_timeout(&mut events),
            SessionState::Running => self.check_liveness(),
            _ => {}
        }
        events
    }

    /// Terminate a running process and close the session.
    ///
    /// Sends SIGTERM, waits up to the abort grace for exit (delivering any
    /// output produced meanwhile), then SIGKILLs if needed. The session is
    /// `Aborted` afterwards either way.
    pub fn abort(&mut self) -> Result<Vec<LifecycleEvent>, LaunchError> {
        let pid = match (self.state, self.pid) {
            (SessionState::Running, Some(pid)) => pid,
            (state, _) => {
                return Err(LaunchError::InvalidState {
                    name: self.request.game_name.clone(),
                    state,
                });
            }
        };

        info!("launch: aborting {} (pid {})", self.request.game_name, pid);
        terminate(pid);

        let mut events = Vec::new();
        let mut exited = false;
        let deadline = Instant::now() + self.timing.abort_grace;
        if let Some(rx) = self.rx.take() {
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(remaining) {
                    Ok(ProcessMsg::Line { channel, text }) => {
                        self.deliver_line(channel, text, &mut events)
                    }
                    Ok(ProcessMsg::Exited(_)) | Ok(ProcessMsg::WaitFailed(_)) => {
                        exited = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        exited = true;
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => break,
                }
            }
        }

        if !exited {
            warn!(
                "launch: {} (pid {}) ignored SIGTERM for {:?}, sending SIGKILL",
                self.request.game_name, pid, self.timing.abort_grace
            );
            kill(pid);
        }

        self.emit(
            LifecycleEvent::launcher_line(format!("=== {} aborted ===", self.request.game_name)),
            &mut events,
        );
        self.transition(SessionState::Aborted, &mut events);
        Ok(events)
    }

    fn handle(&mut self, msg: ProcessMsg, events: &mut Vec<LifecycleEvent>) {
        match msg {
            ProcessMsg::Spawned { pid } => {
                if self.state != SessionState::Starting {
                    return;
                }
                info!("launch: {} running as pid {}", self.request.game_name, pid);
                self.pid = Some(pid);
                self.last_liveness = Instant::now();
                events.push(LifecycleEvent::Started { pid });
                self.transition(SessionState::Running, events);
            }
            ProcessMsg::SpawnFailed(e) => {
                let kind = failure_kind_for_spawn_error(&e);
                let message = format!("{}: {}", describe_failure(kind), e);
                self.fail(kind, message, events);
            }
            ProcessMsg::Line { channel, text } => self.deliver_line(channel, text, events),
            ProcessMsg::ReadFailed { channel, error } => {
                if let Some(pid) = self.pid {
                    terminate(pid);
                }
                let message = format!(
                    "{} ({:?}): {}",
                    describe_failure(FailureKind::ReadError),
                    channel,
                    error
                );
                self.fail(FailureKind::ReadError, message, events);
            }
            ProcessMsg::Exited(status) => self.finish(status, events),
            ProcessMsg::WaitFailed(e) => {
                let message = format!("{}: {}", describe_failure(FailureKind::Unknown), e);
                self.fail(FailureKind::Unknown, message, events);
            }
        }
    }

    fn deliver_line(
        &mut self,
        channel: OutputChannel,
        text: String,
        events: &mut Vec<LifecycleEvent>,
    ) {
        let class = classify_line(&text);
        if should_deliver(class, self.request.verbose) {
            self.emit(
                LifecycleEvent::OutputLine {
                    channel,
                    class,
                    text,
                },
                events,
            );
        }
    }

    fn finish(&mut self, status: ExitStatus, events: &mut Vec<LifecycleEvent>) {
        let name = self.request.game_name.clone();
        let (exit_code, signaled) = match (status.code(), status.signal()) {
            (Some(code), _) => (code, false),
            (None, Some(sig)) if is_crash_signal(sig) => {
                let message = format!("{} (signal {})", describe_failure(FailureKind::Crashed), sig);
                self.fail(FailureKind::Crashed, message, events);
                return;
            }
            (None, Some(sig)) => (sig, true),
            (None, None) => {
                let message = format!("{}: {}", describe_failure(FailureKind::Unknown), status);
                self.fail(FailureKind::Unknown, message, events);
                return;
            }
        };

        if signaled {
            warn!("launch: {} terminated by signal {}", name, exit_code);
        } else if exit_code != 0 {
            warn!("launch: {} exited with code {}", name, exit_code);
        } else {
            info!("launch: {} exited normally", name);
        }

        self.emit(
            LifecycleEvent::launcher_line(format!("=== {} exited ({}) ===", name, status)),
            events,
        );
        self.rx = None;
        self.exit_code = Some(exit_code);
        self.signaled = signaled;
        events.push(LifecycleEvent::Finished {
            exit_code,
            signaled,
        });
        self.transition(SessionState::Finished, events);
    }

    fn fail(&mut self, kind: FailureKind, message: String, events: &mut Vec<LifecycleEvent>) {
        warn!("launch: {} failed: {}", self.request.game_name, message);
        self.emit(LifecycleEvent::launcher_error(message.clone()), events);
        for hint in failure_hints(kind, &self.request.compat) {
            self.emit(LifecycleEvent::launcher_line(hint), events);
        }
        // Dropping the receiver makes the worker kill a child it spawns late.
        self.rx = None;
        self.failure = Some(kind);
        events.push(LifecycleEvent::Failed { kind, message });
        self.transition(SessionState::Failed, events);
    }

    fn check_start_timeout(&mut self, events: &mut Vec<LifecycleEvent>) {
        let Some(since) = self.starting_since else {
            return;
        };
        if since.elapsed() >= self.timing.start_timeout {
            let message = format!(
                "{} (no start within {:?})",
                describe_failure(FailureKind::StartTimeout),
                self.timing.start_timeout
            );
            self.fail(FailureKind::StartTimeout, message, events);
        }
    }

    fn check_liveness(&mut self) {
        if self.last_liveness.elapsed() < self.timing.liveness_interval {
            return;
        }
        self.last_liveness = Instant::now();
        if let Some(pid) = self.pid {
            debug!(
                "launch: {} pid {} alive={}",
                self.request.game_name,
                pid,
                is_alive(pid)
            );
        }
    }

    /// Push an event, recording output lines in the log.
    fn emit(&mut self, event: LifecycleEvent, events: &mut Vec<LifecycleEvent>) {
        if let LifecycleEvent::OutputLine {
            channel,
            class,
            text,
        } = &event
        {
            self.log.push(*channel, *class, text.clone());
        }
        events.push(event);
    }

    fn transition(&mut self, state: SessionState, events: &mut Vec<LifecycleEvent>) {
        debug!(
            "launch: {} {} -> {}",
            self.request.game_name, self.state, state
        );
        self.state = state;
        if state.is_terminal() {
            self.ended_at = Some(Instant::now());
        }
        events.push(LifecycleEvent::StateChanged { state });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CompatLayer;
    use crate::launch::pure::LineClass;
    use std::collections::BTreeMap;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn timing() -> SessionTiming {
        SessionTiming {
            start_timeout: Duration::from_secs(5),
            abort_grace: Duration::from_secs(2),
            liveness_interval: Duration::from_millis(50),
        }
    }

    /// `/bin/sh` stands in for wine; the "executable" is a shell script.
    fn request(tmp: &TempDir, script: &str) -> LaunchRequest {
        let game_dir = tmp.path().join("game");
        let prefix = tmp.path().join("pfx");
        fs::create_dir_all(&game_dir).unwrap();
        fs::create_dir_all(&prefix).unwrap();
        fs::write(prefix.join("system.reg"), "").unwrap();
        fs::write(prefix.join("user.reg"), "").unwrap();
        fs::write(game_dir.join("foo.exe"), script).unwrap();

        LaunchRequest {
            game_name: "Foo".to_string(),
            executable: game_dir.join("foo.exe"),
            prefix,
            compat: CompatLayer::Wine,
            verbose: false,
            launch_options: BTreeMap::new(),
            global_env: BTreeMap::new(),
            display: Some(":99".to_string()),
            wine_binary: "/bin/sh".into(),
            wine_log_level: None,
            wineserver_cleanup: false,
        }
    }

    fn run_to_end(session: &mut LaunchSession) -> Vec<LifecycleEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while !session.state().is_terminal() && Instant::now() < deadline {
            events.extend(session.poll());
            std::thread::sleep(Duration::from_millis(10));
        }
        events
    }

    fn wait_running(session: &mut LaunchSession) -> Vec<LifecycleEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while session.state() == SessionState::Starting && Instant::now() < deadline {
            events.extend(session.poll());
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(session.state(), SessionState::Running);
        events
    }

    fn states(events: &[LifecycleEvent]) -> Vec<SessionState> {
        events
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    fn stdout_lines(events: &[LifecycleEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::OutputLine {
                    channel: OutputChannel::Stdout,
                    text,
                    ..
                } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    // ── start ──

    #[test]
    fn start_emits_starting_and_banner() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exit 0\n"), timing());

        let events = session.start().unwrap();
        assert_eq!(
            events[0],
            LifecycleEvent::StateChanged {
                state: SessionState::Starting
            }
        );
        assert_eq!(session.state(), SessionState::Starting);
        assert_eq!(
            session.log().lines().next(),
            Some("=== Launching Foo ===")
        );
        run_to_end(&mut session);
    }

    #[test]
    fn precondition_failure_leaves_session_idle() {
        let tmp = TempDir::new().unwrap();
        let mut req = request(&tmp, "exit 0\n");
        req.prefix = tmp.path().join("missing");
        let mut session = LaunchSession::new(req, timing());

        assert!(matches!(session.start(), Err(LaunchError::PrefixNotFound(_))));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.pid().is_none());
        assert!(session.log().is_empty());
    }

    #[test]
    fn start_twice_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exit 0\n"), timing());
        session.start().unwrap();

        assert!(matches!(
            session.start(),
            Err(LaunchError::InvalidState {
                state: SessionState::Starting,
                ..
            })
        ));
        run_to_end(&mut session);
    }

    // ── lifecycle ──

    #[test]
    fn normal_exit_finishes() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "echo hello\necho world\n"), timing());
        let mut events = session.start().unwrap();
        events.extend(run_to_end(&mut session));

        assert_eq!(
            states(&events),
            vec![
                SessionState::Starting,
                SessionState::Running,
                SessionState::Finished
            ]
        );
        assert_eq!(stdout_lines(&events), vec!["hello", "world"]);

        let n = events.len();
        assert_eq!(
            events[n - 2],
            LifecycleEvent::Finished {
                exit_code: 0,
                signaled: false
            }
        );
        let started = events
            .iter()
            .position(|e| matches!(e, LifecycleEvent::Started { .. }))
            .unwrap();
        let first_line = events
            .iter()
            .position(|e| matches!(e, LifecycleEvent::OutputLine { channel: OutputChannel::Stdout, .. }))
            .unwrap();
        assert!(started < first_line);
    }

    #[test]
    fn exit_code_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exit 3\n"), timing());
        session.start().unwrap();
        let events = run_to_end(&mut session);

        assert!(events.contains(&LifecycleEvent::Finished {
            exit_code: 3,
            signaled: false
        }));
        assert_eq!(session.state(), SessionState::Finished);
    }

    #[test]
    fn termination_signal_is_signaled_finish() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "kill -TERM $$\n"), timing());
        session.start().unwrap();
        let events = run_to_end(&mut session);

        assert!(events.contains(&LifecycleEvent::Finished {
            exit_code: libc::SIGTERM,
            signaled: true
        }));
    }

    #[test]
    fn crash_signal_fails() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "kill -SEGV $$\n"), timing());
        session.start().unwrap();
        let events = run_to_end(&mut session);

        assert_eq!(session.state(), SessionState::Failed);
        assert!(events.iter().any(|e| matches!(
            e,
            LifecycleEvent::Failed {
                kind: FailureKind::Crashed,
                ..
            }
        )));
    }

    #[test]
    fn environment_reaches_process() {
        let tmp = TempDir::new().unwrap();
        let mut req = request(&tmp, "echo \"$WINEPREFIX\"\necho \"$WINEDEBUG\"\necho \"$MY_FLAG\"\n");
        req.launch_options
            .insert("MY_FLAG".to_string(), "on".to_string());
        let prefix = req.prefix.display().to_string();
        let mut session = LaunchSession::new(req, timing());
        session.start().unwrap();
        let events = run_to_end(&mut session);

        assert_eq!(
            stdout_lines(&events),
            vec![prefix, "warn+all,fixme-all".to_string(), "on".to_string()]
        );
    }

    #[test]
    fn working_directory_is_executable_dir() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "pwd -P\n"), timing());
        session.start().unwrap();
        let events = run_to_end(&mut session);

        let expected = fs::canonicalize(tmp.path().join("game")).unwrap();
        assert_eq!(stdout_lines(&events), vec![expected.display().to_string()]);
    }

    #[test]
    fn proton_runner_gets_run_verb() {
        let tmp = TempDir::new().unwrap();
        let mut req = request(&tmp, "echo \"$STEAM_COMPAT_DATA_PATH\"\n");
        let proton_dir = tmp.path().join("Proton 9.0");
        fs::create_dir_all(&proton_dir).unwrap();
        let runner = proton_dir.join("proton");
        fs::write(&runner, "#!/bin/sh\n[ \"$1\" = run ] || exit 9\nshift\nexec /bin/sh \"$1\"\n")
            .unwrap();
        fs::set_permissions(&runner, fs::Permissions::from_mode(0o755)).unwrap();
        req.compat = CompatLayer::Proton {
            name: Some("Proton 9.0".to_string()),
            install_dir: proton_dir.clone(),
            runner,
        };
        let prefix = req.prefix.display().to_string();

        let mut session = LaunchSession::new(req, timing());
        session.start().unwrap();
        let events = run_to_end(&mut session);

        assert_eq!(stdout_lines(&events), vec![prefix]);
        assert!(events.contains(&LifecycleEvent::Finished {
            exit_code: 0,
            signaled: false
        }));
    }

    // ── output classification ──

    #[test]
    fn fixme_lines_hidden_unless_verbose() {
        let script = "echo 'fixme:d3d:wined3d_guess_card unknown'\necho 'err:module:import_dll failed'\necho plain\n";

        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, script), timing());
        session.start().unwrap();
        let quiet = run_to_end(&mut session);
        assert_eq!(
            stdout_lines(&quiet),
            vec!["err:module:import_dll failed", "plain"]
        );
        assert!(quiet.iter().any(|e| matches!(
            e,
            LifecycleEvent::OutputLine { class: LineClass::Error, channel: OutputChannel::Stdout, .. }
        )));

        let tmp = TempDir::new().unwrap();
        let mut req = request(&tmp, script);
        req.verbose = true;
        let mut session = LaunchSession::new(req, timing());
        session.start().unwrap();
        let verbose = run_to_end(&mut session);
        assert_eq!(stdout_lines(&verbose).len(), 3);
        assert!(session
            .log()
            .lines()
            .any(|l| l.starts_with("fixme:d3d")));
    }

    // ── failures ──

    #[test]
    fn missing_compat_layer_fails_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut req = request(&tmp, "exit 0\n");
        req.wine_binary = tmp.path().join("no-such-wine");
        let mut session = LaunchSession::new(req, timing());
        let mut events = session.start().unwrap();
        events.extend(run_to_end(&mut session));

        assert_eq!(
            states(&events),
            vec![SessionState::Starting, SessionState::Failed]
        );
        assert!(events.iter().any(|e| matches!(
            e,
            LifecycleEvent::Failed {
                kind: FailureKind::NotFound,
                ..
            }
        )));
        assert!(session.log().lines().any(|l| l.contains("apt install wine")));
        assert!(session.pid().is_none());
    }

    #[test]
    fn start_timeout_fails_session() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exit 0\n"), timing());
        let (_tx, rx) = mpsc::channel();
        session.state = SessionState::Starting;
        session.rx = Some(rx);
        session.starting_since = Instant::now().checked_sub(Duration::from_secs(6));

        let events = session.poll();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(events.iter().any(|e| matches!(
            e,
            LifecycleEvent::Failed {
                kind: FailureKind::StartTimeout,
                ..
            }
        )));
        assert_eq!(
            events.last(),
            Some(&LifecycleEvent::StateChanged {
                state: SessionState::Failed
            })
        );
        assert!(session.poll().is_empty());
    }

    // ── abort ──

    #[test]
    fn abort_requires_running() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exit 0\n"), timing());
        assert!(matches!(
            session.abort(),
            Err(LaunchError::InvalidState {
                state: SessionState::Idle,
                ..
            })
        ));
    }

    #[test]
    fn abort_terminates_process() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "echo ready\nexec sleep 30\n"), timing());
        session.start().unwrap();
        wait_running(&mut session);

        let begun = Instant::now();
        let events = session.abort().unwrap();
        assert!(begun.elapsed() < timing().abort_grace);
        assert_eq!(session.state(), SessionState::Aborted);
        assert_eq!(
            events.last(),
            Some(&LifecycleEvent::StateChanged {
                state: SessionState::Aborted
            })
        );
        assert!(!events
            .iter()
            .any(|e| matches!(e, LifecycleEvent::Finished { .. })));
        assert!(session.poll().is_empty());
    }

    #[test]
    fn abort_kills_process_ignoring_sigterm() {
        let tmp = TempDir::new().unwrap();
        let mut t = timing();
        t.abort_grace = Duration::from_millis(300);
        let script = "trap '' TERM\necho ready\nwhile :; do sleep 0.05; done\n";
        let mut session = LaunchSession::new(request(&tmp, script), t);
        session.start().unwrap();
        wait_running(&mut session);
        let pid = session.pid().unwrap();

        let begun = Instant::now();
        session.abort().unwrap();
        assert!(begun.elapsed() < t.abort_grace + Duration::from_secs(1));
        assert_eq!(session.state(), SessionState::Aborted);

        let deadline = Instant::now() + Duration::from_secs(5);
        while is_alive(pid) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(!is_alive(pid));
    }

    #[test]
    fn liveness_checks_never_change_running_state() {
        let tmp = TempDir::new().unwrap();
        let mut t = timing();
        t.liveness_interval = Duration::from_millis(20);
        let mut session = LaunchSession::new(request(&tmp, "exec sleep 30\n"), t);
        session.start().unwrap();
        wait_running(&mut session);
        let first_check = session.last_liveness;

        let deadline = Instant::now() + Duration::from_millis(200);
        while Instant::now() < deadline {
            assert!(session.poll().is_empty());
            assert_eq!(session.state(), SessionState::Running);
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(session.last_liveness > first_check);

        session.abort().unwrap();
    }

    // ── summary ──

    #[test]
    fn summary_only_after_terminal_state() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "sleep 0.1\nexit 3\n"), timing());
        assert!(session.summary().is_none());
        session.start().unwrap();
        assert!(session.summary().is_none());
        run_to_end(&mut session);

        let summary = session.summary().unwrap();
        assert_eq!(summary.game_name, "Foo");
        assert_eq!(summary.state, SessionState::Finished);
        assert_eq!(summary.exit_code, Some(3));
        assert!(summary.ran);
        assert!(summary.duration >= Duration::from_millis(100));
        assert!(summary.is_crash());
    }

    #[test]
    fn aborted_session_is_not_a_crash() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exec sleep 30\n"), timing());
        session.start().unwrap();
        wait_running(&mut session);
        session.abort().unwrap();

        let summary = session.summary().unwrap();
        assert_eq!(summary.state, SessionState::Aborted);
        assert_eq!(summary.failure, None);
        assert!(!summary.is_crash());
    }

    #[test]
    fn failure_before_spawn_is_not_a_crash() {
        let tmp = TempDir::new().unwrap();
        let mut req = request(&tmp, "exit 0\n");
        req.wine_binary = tmp.path().join("no-such-wine");
        let mut session = LaunchSession::new(req, timing());
        session.start().unwrap();
        run_to_end(&mut session);

        let summary = session.summary().unwrap();
        assert_eq!(summary.failure, Some(FailureKind::NotFound));
        assert!(!summary.ran);
        assert!(!summary.is_crash());
    }

    #[test]
    fn terminal_state_is_final() {
        let tmp = TempDir::new().unwrap();
        let mut session = LaunchSession::new(request(&tmp, "exit 0\n"), timing());
        session.start().unwrap();
        run_to_end(&mut session);
        assert_eq!(session.state(), SessionState::Finished);

        assert!(session.poll().is_empty());
        assert!(session.abort().is_err());
        assert!(session.start().is_err());
        assert_eq!(session.state(), SessionState::Finished);
    }
}
