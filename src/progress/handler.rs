//! Build observer trait and events

use crate::pipeline::BuildState;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Events emitted by the orchestrator during one build invocation
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// Build requested for a project root
    Started { build_id: Uuid, root: PathBuf },

    /// Pipeline moved between states
    StateChanged {
        build_id: Uuid,
        from: BuildState,
        to: BuildState,
    },

    /// A cached result short-circuited the engine
    CacheHit { build_id: Uuid, key: String },

    /// Engine finished (or cache answered)
    Completed {
        build_id: Uuid,
        duration: Duration,
        outputs: usize,
        cache_hit: bool,
    },

    /// Engine or configuration failure
    Failed { build_id: Uuid, error: String },
}

impl BuildEvent {
    pub fn build_id(&self) -> Uuid {
        match self {
            Self::Started { build_id, .. }
            | Self::StateChanged { build_id, .. }
            | Self::CacheHit { build_id, .. }
            | Self::Completed { build_id, .. }
            | Self::Failed { build_id, .. } => *build_id,
        }
    }
}

/// Receives build events in the order they are published
pub trait BuildObserver: Send + Sync {
    fn on_event(&self, event: &BuildEvent);
}

/// Observer that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl BuildObserver for NoOpObserver {
    fn on_event(&self, _event: &BuildEvent) {}
}
