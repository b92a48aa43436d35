pub mod classify;
pub mod command;
pub mod env;
pub mod failure;

pub use classify::{LineClass, classify_line, decode_line, should_deliver};
pub use command::{CommandSpec, command_spec, launch_banner};
pub use env::{build_env, format_env};
pub use failure::{describe_failure, failure_hints, failure_kind_for_spawn_error, is_crash_signal};
