// libs/session-cell/src/services/calendar.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{DaySummary, ScheduledSession, SessionError, SessionStatus};
use crate::services::lifecycle::SessionLifecycleService;
use crate::services::store::{SessionStore, StatusUpdate};

/// Day view over the session list, plus the status changes made from it.
pub struct CalendarService {
    store: Arc<dyn SessionStore>,
    lifecycle: SessionLifecycleService,
}

impl CalendarService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            lifecycle: SessionLifecycleService::new(),
        }
    }

    /// Sessions on `date`, earliest slot first.
    pub async fn sessions_on(&self, date: NaiveDate) -> Result<Vec<ScheduledSession>, SessionError> {
        debug!("Listing sessions on {}", date);

        let mut sessions: Vec<ScheduledSession> = self
            .store
            .list_sessions()
            .await?
            .into_iter()
            .filter(|s| s.date == date)
            .collect();
        sessions.sort_by_key(|s| s.time);
        Ok(sessions)
    }

    pub async fn day_summary(&self, date: NaiveDate) -> Result<DaySummary, SessionError> {
        let sessions = self.sessions_on(date).await?;
        let count = |status: SessionStatus| sessions.iter().filter(|s| s.status == status).count();

        Ok(DaySummary {
            date: Some(date),
            scheduled: count(SessionStatus::Scheduled),
            completed: count(SessionStatus::Completed),
            cancelled: count(SessionStatus::Cancelled),
        })
    }

    /// Still-scheduled sessions from `today` on, soonest first.
    pub async fn upcoming_sessions(
        &self,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<ScheduledSession>, SessionError> {
        let mut sessions: Vec<ScheduledSession> = self
            .store
            .list_sessions()
            .await?
            .into_iter()
            .filter(|s| s.status == SessionStatus::Scheduled && s.date >= today)
            .collect();
        sessions.sort_by_key(|s| (s.date, s.time));
        sessions.truncate(limit);
        Ok(sessions)
    }

    pub async fn complete_session(&self, session_id: Uuid) -> Result<ScheduledSession, SessionError> {
        self.transition(session_id, SessionStatus::Completed).await
    }

    pub async fn cancel_session(&self, session_id: Uuid) -> Result<ScheduledSession, SessionError> {
        self.transition(session_id, SessionStatus::Cancelled).await
    }

    async fn transition(
        &self,
        session_id: Uuid,
        new_status: SessionStatus,
    ) -> Result<ScheduledSession, SessionError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound)?;

        self.lifecycle
            .validate_status_transition(&session.status, &new_status)?;

        match self
            .store
            .update_status(session_id, session.status, new_status)
            .await?
        {
            StatusUpdate::Updated(updated) => {
                info!("Session {} is now {}", session_id, new_status);
                Ok(updated)
            }
            StatusUpdate::NotFound => Err(SessionError::NotFound),
            StatusUpdate::Stale(current) => {
                warn!("Session {} changed to {} concurrently", session_id, current);
                Err(SessionError::InvalidStatusTransition(current))
            }
        }
    }
}
