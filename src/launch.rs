//! Launch module - running catalog games through Wine or Proton
//!
//! This module provides:
//! - Environment construction for a launch
//! - Preflight checks (preconditions and advisory compatibility-layer checks)
//! - The per-launch session state machine with streamed, classified output
//! - The orchestrator keeping at most one active session per game
//!
//! ## Module Structure
//! - `types.rs`: Requests, states, lifecycle events
//! - `pure/`: Environment, command, line classification, failure text
//! - `operations/`: Preflight, process worker, output log
//! - `pipelines/`: Session and orchestrator

mod operations;
mod pipelines;
mod pure;
mod types;

pub use operations::{LogEntry, OutputLog};
pub use pipelines::{LaunchOrchestrator, LaunchSession, OutputSink, TracingSink};
pub use pure::{
    CommandSpec, LineClass, build_env, classify_line, command_spec, describe_failure,
    failure_hints, format_env, launch_banner,
};
pub use types::{
    FailureKind, LaunchRequest, LifecycleEvent, OutputChannel, SessionHandle, SessionState,
    SessionSummary, SessionTiming,
};
