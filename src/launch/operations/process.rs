//! Process worker: spawns the compatibility layer and streams its output
//!
//! Everything the child produces reaches the control thread as
//! `ProcessMsg` values over one channel. Lines from one stream keep their
//! order; `Exited` is sent after both streams reach EOF (or a short drain
//! window passes, for children whose descendants keep the pipes open).

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::launch::pure::{CommandSpec, decode_line};
use crate::launch::types::OutputChannel;

/// How long to wait for output readers after the child has been reaped.
const READER_DRAIN: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum ProcessMsg {
    Spawned { pid: u32 },
    SpawnFailed(io::Error),
    Line { channel: OutputChannel, text: String },
    ReadFailed { channel: OutputChannel, error: io::Error },
    Exited(ExitStatus),
    WaitFailed(io::Error),
}

/// Spawn `spec` on a worker thread. The first message is always
/// `Spawned` or `SpawnFailed`; the last is `Exited` or `WaitFailed`.
pub fn spawn_process(spec: &CommandSpec) -> Receiver<ProcessMsg> {
    let (tx, rx) = mpsc::channel();
    let mut cmd = spec.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    thread::spawn(move || run_process(cmd, tx));
    rx
}

fn run_process(mut cmd: Command, tx: Sender<ProcessMsg>) {
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            let _ = tx.send(ProcessMsg::SpawnFailed(e));
            return;
        }
    };

    let pid = child.id();
    if tx.send(ProcessMsg::Spawned { pid }).is_err() {
        // Session already gone (start timeout)
        debug!("launch: session dropped before start of pid {}, killing", pid);
        let _ = child.kill();
        let _ = child.wait();
        return;
    }

    let (done_tx, done_rx) = mpsc::channel::<()>();
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(stdout, OutputChannel::Stdout, tx.clone(), done_tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(stderr, OutputChannel::Stderr, tx.clone(), done_tx.clone());
    }
    drop(done_tx);

    let status = child.wait();

    // Readers only ever drop their sender, so Disconnected means both hit EOF.
    let deadline = Instant::now() + READER_DRAIN;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match done_rx.recv_timeout(remaining) {
            Ok(()) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                debug!("launch: output of pid {} still open after exit", pid);
                break;
            }
        }
    }

    let msg = match status {
        Ok(status) => ProcessMsg::Exited(status),
        Err(e) => ProcessMsg::WaitFailed(e),
    };
    let _ = tx.send(msg);
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: R,
    channel: OutputChannel,
    tx: Sender<ProcessMsg>,
    done: Sender<()>,
) {
    thread::spawn(move || {
        let _done = done;
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let text = decode_line(&buf);
                    if tx.send(ProcessMsg::Line { channel, text }).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    let _ = tx.send(ProcessMsg::ReadFailed { channel, error });
                    break;
                }
            }
        }
    });
}

fn signal(pid: u32, sig: libc::c_int) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    unsafe { libc::kill(pid, sig) == 0 }
}

/// Ask the process to exit (SIGTERM).
pub fn terminate(pid: u32) -> bool {
    signal(pid, libc::SIGTERM)
}

/// SIGKILL.
pub fn kill(pid: u32) -> bool {
    signal(pid, libc::SIGKILL)
}

/// Whether `pid` still exists (signal 0).
pub fn is_alive(pid: u32) -> bool {
    signal(pid, 0)
}
