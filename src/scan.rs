//! Prefix scan module - locating Wine/Proton prefixes and Proton runners
//!
//! This module provides:
//! - A bounded, prunable directory walker
//! - Discovery of `steamapps/compatdata/<appid>/pfx` prefixes
//! - Discovery of Proton runners in Steam tool directories
//! - A background task that runs the scan off the control thread
//!
//! ## Module Structure
//! - `types.rs`: Records and scan roots
//! - `pure/`: Prune rules and display names
//! - `operations/`: Walker and directory inspection
//! - `pipelines/`: The full scan and the background task

mod operations;
mod pipelines;
mod pure;
mod types;

pub use operations::Walker;
pub use pipelines::{PrefixScanner, ScanTask};
pub use pure::{DEFAULT_PRUNE, is_hidden};
pub use types::{PrefixRecord, ProtonRecord, ScanReport, ScanRoots};
