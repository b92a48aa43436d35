pub mod operations;
pub mod types;

pub use types::Settings;

pub use operations::{load_settings, load_settings_from, save_settings, save_settings_to};
