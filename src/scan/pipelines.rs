//! Pipelines module (orchestration)

pub mod prefixes;
pub mod task;

pub use prefixes::PrefixScanner;
pub use task::ScanTask;
