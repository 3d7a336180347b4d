use serde::Serialize;
use std::fmt;

/// Per-invocation build state
///
/// `Idle -> Classifying -> Resolving -> CacheLookup`, then either straight to
/// `Done` on a hit or `Building -> Done | Failed`, and back to `Idle`.
/// Configuration errors move `Resolving -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Idle,
    Classifying,
    Resolving,
    CacheLookup,
    Building,
    Done,
    Failed,
}

impl BuildState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Classifying => "classifying",
            Self::Resolving => "resolving",
            Self::CacheLookup => "cache_lookup",
            Self::Building => "building",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn can_transition_to(&self, next: BuildState) -> bool {
        use BuildState::*;
        matches!(
            (self, next),
            (Idle, Classifying)
                | (Classifying, Resolving)
                | (Resolving, CacheLookup)
                | (Resolving, Failed)
                | (CacheLookup, Done)
                | (CacheLookup, Building)
                | (Building, Done)
                | (Building, Failed)
                | (Done, Idle)
                | (Failed, Idle)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            BuildState::Idle,
            BuildState::Classifying,
            BuildState::Resolving,
            BuildState::CacheLookup,
            BuildState::Building,
            BuildState::Done,
            BuildState::Idle,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!BuildState::Idle.can_transition_to(BuildState::Building));
        assert!(!BuildState::CacheLookup.can_transition_to(BuildState::Failed));
        assert!(!BuildState::Done.can_transition_to(BuildState::Building));
    }

    #[test]
    fn test_terminal_states() {
        assert!(BuildState::Done.is_terminal());
        assert!(BuildState::Failed.is_terminal());
        assert!(!BuildState::Building.is_terminal());
    }
}
