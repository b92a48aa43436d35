pub mod orchestrator;
pub mod session;

pub use orchestrator::{LaunchOrchestrator, OutputSink, TracingSink};
pub use session::LaunchSession;
