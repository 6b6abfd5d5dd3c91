// Run State Machine

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Lifecycle of one run
///
/// ```text
/// Idle -> Dispatching -> AwaitingWorkers -> Aggregating -> Done
///   |
///   +-> ConfigError | CredentialError   (terminal, no job dispatched)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Idle,
    Dispatching,
    AwaitingWorkers,
    Aggregating,
    Done,
    ConfigError,
    CredentialError,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "IDLE"),
            RunState::Dispatching => write!(f, "DISPATCHING"),
            RunState::AwaitingWorkers => write!(f, "AWAITING_WORKERS"),
            RunState::Aggregating => write!(f, "AGGREGATING"),
            RunState::Done => write!(f, "DONE"),
            RunState::ConfigError => write!(f, "CONFIG_ERROR"),
            RunState::CredentialError => write!(f, "CREDENTIAL_ERROR"),
        }
    }
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Done | RunState::ConfigError | RunState::CredentialError
        )
    }

    /// Move to `next`, rejecting any edge not in the state diagram
    pub fn transition(&mut self, next: RunState) -> Result<()> {
        let allowed = matches!(
            (*self, next),
            (RunState::Idle, RunState::Dispatching)
                | (RunState::Idle, RunState::ConfigError)
                | (RunState::Idle, RunState::CredentialError)
                | (RunState::Dispatching, RunState::AwaitingWorkers)
                | (RunState::AwaitingWorkers, RunState::Aggregating)
                | (RunState::Aggregating, RunState::Done)
        );
        if !allowed {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = RunState::Idle;
        for next in [
            RunState::Dispatching,
            RunState::AwaitingWorkers,
            RunState::Aggregating,
            RunState::Done,
        ] {
            state.transition(next).unwrap();
        }
        assert_eq!(state, RunState::Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_fatal_states_only_from_idle() {
        let mut state = RunState::Idle;
        state.transition(RunState::CredentialError).unwrap();
        assert!(state.is_terminal());

        let mut state = RunState::Dispatching;
        let err = state.transition(RunState::ConfigError).unwrap_err();
        assert!(err.to_string().contains("DISPATCHING -> CONFIG_ERROR"));
        assert_eq!(state, RunState::Dispatching);
    }

    #[test]
    fn test_cannot_skip_aggregation() {
        let mut state = RunState::AwaitingWorkers;
        assert!(state.transition(RunState::Done).is_err());
    }
}
