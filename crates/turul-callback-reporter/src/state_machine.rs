//! Invocation state machine enforcement.
//!
//! One pass per invocation:
//!
//! ```text
//! Idle -> Validating
//! Validating -> Rejected | Working
//! Working -> Reporting
//! Reporting -> Done
//! Rejected/Done -> ERROR (terminal, no further transitions)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Where an invocation is in its single pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationState {
    Idle,
    Validating,
    Rejected,
    Working,
    Reporting,
    Done,
}

/// Validate an invocation state transition.
///
/// Returns `Ok(())` if the transition is valid, or `Err(ReportError)` if not.
pub fn validate_transition(from: InvocationState, to: InvocationState) -> Result<(), ReportError> {
    use InvocationState::*;

    match (from, to) {
        (Rejected | Done, _) => Err(ReportError::TerminalState(from)),
        (Idle, Validating)
        | (Validating, Rejected)
        | (Validating, Working)
        | (Working, Reporting)
        | (Reporting, Done) => Ok(()),
        _ => Err(ReportError::InvalidTransition {
            current: from,
            requested: to,
        }),
    }
}

/// Returns `true` if the state is terminal (no further transitions allowed).
pub fn is_terminal(state: InvocationState) -> bool {
    matches!(state, InvocationState::Rejected | InvocationState::Done)
}

/// Move `state` to `next`, enforcing the transition rules
pub(crate) fn advance(
    state: &mut InvocationState,
    next: InvocationState,
) -> Result<(), ReportError> {
    validate_transition(*state, next)?;
    tracing::debug!(from = ?*state, to = ?next, "Invocation state transition");
    *state = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvocationState::*;

    const ALL: [InvocationState; 6] = [Idle, Validating, Rejected, Working, Reporting, Done];

    #[test]
    fn test_happy_path_transitions() {
        assert!(validate_transition(Idle, Validating).is_ok());
        assert!(validate_transition(Validating, Working).is_ok());
        assert!(validate_transition(Working, Reporting).is_ok());
        assert!(validate_transition(Reporting, Done).is_ok());
    }

    #[test]
    fn test_rejection_path() {
        assert!(validate_transition(Validating, Rejected).is_ok());
    }

    #[test]
    fn test_skipping_states_is_invalid() {
        assert!(validate_transition(Idle, Working).is_err());
        assert!(validate_transition(Validating, Reporting).is_err());
        assert!(validate_transition(Working, Done).is_err());
        assert!(validate_transition(Working, Working).is_err());
        assert!(matches!(
            validate_transition(Reporting, Working),
            Err(ReportError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_terminal_states_reject_all_transitions() {
        for terminal in [Rejected, Done] {
            for target in ALL {
                match validate_transition(terminal, target) {
                    Err(ReportError::TerminalState(s)) => assert_eq!(s, terminal),
                    other => panic!("Expected TerminalState, got: {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_is_terminal() {
        assert!(is_terminal(Rejected));
        assert!(is_terminal(Done));
        for state in [Idle, Validating, Working, Reporting] {
            assert!(!is_terminal(state));
        }
    }

    #[test]
    fn test_advance_updates_state() {
        let mut state = Idle;
        advance(&mut state, Validating).unwrap();
        assert_eq!(state, Validating);
        assert!(advance(&mut state, Done).is_err());
        assert_eq!(state, Validating);
    }
}
