//! Operations module (filesystem reads)

pub mod inspect;
pub mod walker;

pub use inspect::{inspect_compatdata, list_subdirs, proton_runners_in};
pub use walker::Walker;
