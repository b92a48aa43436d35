pub mod naming;
pub mod prune;

pub use naming::prefix_display_name;
pub use prune::{DEFAULT_PRUNE, is_hidden, looks_like_proton};
