pub mod output;
pub mod preflight;
pub mod process;

pub use output::{LogEntry, OutputLog};
pub use preflight::{ambient_env, check_compat_layer, check_prefix, cleanup_wineserver, validate};
pub use process::{ProcessMsg, is_alive, kill, spawn_process, terminate};
