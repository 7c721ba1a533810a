//! Poll loop states

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    /// Looking for the target window and opening its process
    Searching,
    /// Holding a handle, waiting for the module to be loaded
    Attaching,
    /// Reading snapshots on a fixed cadence
    Polling,
    /// Session over, handle released
    Terminated,
}

impl ProbeState {
    /// Whether the loop may move from `self` to `next`.
    ///
    /// `Terminated -> Searching` is only taken when restarting is enabled.
    pub fn can_transition_to(&self, next: ProbeState) -> bool {
        use ProbeState::*;
        matches!(
            (self, next),
            (Searching, Attaching)
                | (Searching, Terminated)
                | (Attaching, Polling)
                | (Attaching, Terminated)
                | (Polling, Attaching)
                | (Polling, Terminated)
                | (Terminated, Searching)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == ProbeState::Terminated
    }
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeState::Searching => "searching",
            ProbeState::Attaching => "attaching",
            ProbeState::Polling => "polling",
            ProbeState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::ProbeState::*;

    #[test]
    fn test_forward_path() {
        assert!(Searching.can_transition_to(Attaching));
        assert!(Attaching.can_transition_to(Polling));
        assert!(Polling.can_transition_to(Terminated));
    }

    #[test]
    fn test_no_skipping_or_self_loops() {
        assert!(!Searching.can_transition_to(Polling));
        assert!(!Polling.can_transition_to(Searching));
        assert!(!Terminated.can_transition_to(Polling));
        for state in [Searching, Attaching, Polling, Terminated] {
            assert!(!state.can_transition_to(state));
        }
    }

    #[test]
    fn test_stale_and_restart_edges() {
        assert!(Polling.can_transition_to(Attaching));
        assert!(Terminated.can_transition_to(Searching));
        assert!(Terminated.is_terminal());
    }
}
