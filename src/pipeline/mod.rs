//! Build pipeline: classify, resolve, consult the cache, run the engine

mod orchestrator;
mod result;
mod state;

pub use orchestrator::Orchestrator;
pub use result::{BuildResult, BuildStats, ResolvedBuild};
pub use state::BuildState;
