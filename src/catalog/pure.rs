pub mod stats;
pub mod validation;

pub use stats::record_play;
pub use validation::{unique_name, validate_name};
