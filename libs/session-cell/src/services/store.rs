// libs/session-cell/src/services/store.rs
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{PersistenceError, ScheduledSession, SessionStatus};
use crate::services::validation::ValidatedDraft;

/// Owner of the scheduled session list.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session with status `scheduled` and a fresh id.
    async fn create_session(&self, draft: ValidatedDraft) -> Result<ScheduledSession, PersistenceError>;

    async fn list_sessions(&self) -> Result<Vec<ScheduledSession>, PersistenceError>;

    async fn get_session(&self, session_id: Uuid) -> Result<Option<ScheduledSession>, PersistenceError>;

    /// Sets `status` only if the session is still in `expected`. Check and
    /// write happen atomically.
    async fn update_status(
        &self,
        session_id: Uuid,
        expected: SessionStatus,
        status: SessionStatus,
    ) -> Result<StatusUpdate, PersistenceError>;
}

/// Outcome of a compare-and-set status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated(ScheduledSession),
    NotFound,
    /// The session had moved on; carries the status it was found in.
    Stale(SessionStatus),
}

impl ScheduledSession {
    pub fn from_validated(draft: ValidatedDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: draft.patient_id(),
            patient_name: draft.patient_name().to_string(),
            date: draft.date(),
            time: draft.time(),
            session_type: draft.session_type(),
            status: SessionStatus::Scheduled,
            notes: draft.notes().map(str::to_string),
            created_at: Utc::now(),
        }
    }
}

/// Session list kept in process, resolving after a fixed delay.
///
/// `fail_next` makes the following create calls fail, which stands in for a
/// backend outage.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Vec<ScheduledSession>>,
    delay: Duration,
    pending_failures: AtomicU32,
}

impl InMemorySessionStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            sessions: RwLock::new(Vec::new()),
            delay: config.submit_delay(),
            pending_failures: AtomicU32::new(config.fail_first_submissions),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn with_sessions(sessions: Vec<ScheduledSession>) -> Self {
        Self {
            sessions: RwLock::new(sessions),
            ..Self::default()
        }
    }

    pub fn fail_next(&self, count: u32) {
        self.pending_failures.fetch_add(count, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self, draft), fields(patient_id = %draft.patient_id()))]
    async fn create_session(&self, draft: ValidatedDraft) -> Result<ScheduledSession, PersistenceError> {
        debug!("Persisting session for {} on {} at {}", draft.patient_name(), draft.date(), draft.time());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.take_failure() {
            error!("Simulated backend failure while saving session");
            return Err(PersistenceError::new("Simulated backend failure"));
        }

        let session = ScheduledSession::from_validated(draft);
        self.sessions.write().await.push(session.clone());

        info!("Session {} saved", session.id);
        Ok(session)
    }

    async fn list_sessions(&self) -> Result<Vec<ScheduledSession>, PersistenceError> {
        Ok(self.sessions.read().await.clone())
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<ScheduledSession>, PersistenceError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().find(|s| s.id == session_id).cloned())
    }

    async fn update_status(
        &self,
        session_id: Uuid,
        expected: SessionStatus,
        status: SessionStatus,
    ) -> Result<StatusUpdate, PersistenceError> {
        let mut sessions = self.sessions.write().await;

        let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) else {
            return Ok(StatusUpdate::NotFound);
        };

        if session.status != expected {
            debug!("Session {} is {}, expected {}", session_id, session.status, expected);
            return Ok(StatusUpdate::Stale(session.status));
        }

        session.status = status;
        Ok(StatusUpdate::Updated(session.clone()))
    }
}
