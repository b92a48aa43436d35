pub mod io;

pub use io::{load_settings, load_settings_from, save_settings, save_settings_to};
