use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of one call attempt.
///
/// `Idle -> Connecting -> Calling -> Playing -> HangingUp -> Done`, and any
/// non-terminal state may drop to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Idle,
    Connecting,
    Calling,
    Playing,
    HangingUp,
    Done,
    Failed,
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Done | CallState::Failed)
    }

    pub fn can_transition_to(self, next: CallState) -> bool {
        use CallState::*;
        match (self, next) {
            (Idle, Connecting)
            | (Connecting, Calling)
            | (Calling, Playing)
            | (Playing, HangingUp)
            | (HangingUp, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallState::Idle => "idle",
            CallState::Connecting => "connecting",
            CallState::Calling => "calling",
            CallState::Playing => "playing",
            CallState::HangingUp => "hanging_up",
            CallState::Done => "done",
            CallState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one subscriber during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CallOutcome {
    pub phone_number: String,
    pub final_state: CallState,
    /// State the attempt was in when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_during: Option<CallState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl CallOutcome {
    pub fn succeeded(&self) -> bool {
        self.final_state == CallState::Done
    }
}

/// Summary of a whole campaign run. Returned to the caller, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CampaignReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<CallOutcome>,
}

impl CampaignReport {
    pub fn record(&mut self, outcome: CallOutcome) {
        self.attempted += 1;
        if outcome.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}
