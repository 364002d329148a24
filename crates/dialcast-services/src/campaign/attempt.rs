use dialcast_core::models::{CallOutcome, CallState};

/// Tracks one call attempt through its states.
#[derive(Debug)]
pub(crate) struct CallAttempt {
    phone_number: String,
    state: CallState,
}

impl CallAttempt {
    pub(crate) fn new(phone_number: &str) -> Self {
        Self {
            phone_number: phone_number.to_string(),
            state: CallState::Idle,
        }
    }

    pub(crate) fn state(&self) -> CallState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: CallState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal call transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(phone_number = %self.phone_number, from = %self.state, to = %next, "Call state");
        self.state = next;
    }

    pub(crate) fn finish(mut self, duration_ms: u64) -> CallOutcome {
        self.advance(CallState::Done);
        CallOutcome {
            phone_number: self.phone_number,
            final_state: CallState::Done,
            failed_during: None,
            error: None,
            duration_ms,
        }
    }

    pub(crate) fn fail(self, error: String, duration_ms: u64) -> CallOutcome {
        CallOutcome {
            phone_number: self.phone_number,
            final_state: CallState::Failed,
            failed_during: Some(self.state),
            error: Some(error),
            duration_ms,
        }
    }
}
