//! Game catalog - the persisted list of Windows games
//!
//! ## Module Structure
//! - `types.rs`: `GameRecord`, `Catalog` and the request types used by the UI
//! - `pure/`: Name validation
//! - `operations/`: JSON persistence and catalog mutations

mod operations;
mod pure;
mod types;

pub use pure::validate_name;
pub use types::{AddGameRequest, Catalog, CompatLayer, GameRecord, RenameRequest};
