//! Logging-based build observer

use super::{BuildEvent, BuildObserver};
use tracing::{debug, info, warn};

/// Observer that logs build events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl BuildObserver for LoggingObserver {
    fn on_event(&self, event: &BuildEvent) {
        match event {
            BuildEvent::Started { build_id, root } => {
                info!(build = %build_id, root = %root.display(), "Starting build");
            }
            BuildEvent::StateChanged { build_id, from, to } => {
                debug!(build = %build_id, from = %from, to = %to, "State changed");
            }
            BuildEvent::CacheHit { build_id, key } => {
                info!(build = %build_id, key = %key, "Reusing cached build result");
            }
            BuildEvent::Completed {
                build_id,
                duration,
                outputs,
                cache_hit,
            } => {
                info!(
                    build = %build_id,
                    outputs,
                    cache_hit,
                    duration_ms = duration.as_millis(),
                    "Build complete"
                );
            }
            BuildEvent::Failed { build_id, error } => {
                warn!(build = %build_id, error = %error, "Build failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BuildState;
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_logging_all_events() {
        let observer = LoggingObserver;
        let build_id = Uuid::new_v4();

        let events = vec![
            BuildEvent::Started {
                build_id,
                root: PathBuf::from("/test"),
            },
            BuildEvent::StateChanged {
                build_id,
                from: BuildState::CacheLookup,
                to: BuildState::Building,
            },
            BuildEvent::CacheHit {
                build_id,
                key: "k".to_string(),
            },
            BuildEvent::Completed {
                build_id,
                duration: Duration::from_secs(1),
                outputs: 1,
                cache_hit: true,
            },
            BuildEvent::Failed {
                build_id,
                error: "Test error".to_string(),
            },
        ];

        for event in events {
            observer.on_event(&event);
        }
    }
}
