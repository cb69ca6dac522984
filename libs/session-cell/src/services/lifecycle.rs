// libs/session-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{SessionError, SessionStatus};

#[derive(Debug, Default)]
pub struct SessionLifecycleService;

impl SessionLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &SessionStatus,
        new_status: &SessionStatus,
    ) -> Result<(), SessionError> {
        debug!("Validating status transition from {:?} to {:?}", current_status, new_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(new_status) {
            warn!("Invalid status transition attempted: {:?} -> {:?}", current_status, new_status);
            return Err(SessionError::InvalidStatusTransition(*current_status));
        }

        info!("Status transition validated: {:?} -> {:?}", current_status, new_status);
        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &SessionStatus) -> Vec<SessionStatus> {
        match current_status {
            SessionStatus::Scheduled => vec![SessionStatus::Completed, SessionStatus::Cancelled],
            // Terminal states - no transitions allowed
            SessionStatus::Completed => vec![],
            SessionStatus::Cancelled => vec![],
        }
    }

    pub fn is_terminal(&self, status: &SessionStatus) -> bool {
        self.get_valid_transitions(status).is_empty()
    }
}
