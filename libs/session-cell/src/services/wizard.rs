// libs/session-cell/src/services/wizard.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use patient_cell::PatientRepository;
use shared_models::SessionType;
use shared_utils::validation::non_blank;
use shared_utils::Clock;

use crate::models::{
    DraftField, PatientRef, ScheduledSession, SessionDraft, SessionError, SubmissionStatus,
    ValidationError, WizardSnapshot, WizardStep,
};
use crate::services::store::SessionStore;
use crate::services::validation::validate_draft;

#[derive(Debug, Default)]
struct WizardState {
    step: WizardStep,
    draft: SessionDraft,
    submission: SubmissionStatus,
    errors: Vec<ValidationError>,
    last_session: Option<ScheduledSession>,
    last_failure: Option<String>,
    /// A store call is pending. Survives `reset` so a new run cannot start a
    /// second one.
    in_flight: bool,
    /// Bumped by `reset`; a submission started under an older run does not
    /// write back into the new one.
    run: u64,
}

impl WizardState {
    fn reject_validation(&mut self, errors: Vec<ValidationError>) -> SessionError {
        warn!("Wizard step {} rejected: {:?}", self.step, errors);
        self.errors = errors.clone();
        SessionError::Validation(errors)
    }

    fn ensure_editable(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.submission == SubmissionStatus::Submitting {
            warn!("{} rejected while a submission is in progress", operation);
            return Err(SessionError::AlreadyInProgress);
        }
        Ok(())
    }
}

/// Four-step scheduling flow: patient, date and time, session type, review.
///
/// One instance serves one user flow. It is shared behind an `Arc` so the
/// presentation layer can keep reading state while `submit` is awaiting the
/// store; the state lock is never held across that await.
pub struct SessionWizard {
    patients: Arc<dyn PatientRepository>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    state: Mutex<WizardState>,
}

impl SessionWizard {
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            store,
            clock,
            state: Mutex::new(WizardState::default()),
        }
    }

    pub fn step_titles() -> Vec<&'static str> {
        WizardStep::ALL.iter().map(WizardStep::title).collect()
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let state = self.state.lock().await;
        WizardSnapshot {
            step: state.step,
            step_index: state.step.index(),
            step_title: state.step.title().to_string(),
            draft: state.draft.clone(),
            submission: state.submission,
            errors: state.errors.clone(),
            last_session: state.last_session.clone(),
            last_failure: state.last_failure.clone(),
            in_flight: state.in_flight,
        }
    }

    pub async fn current_step(&self) -> WizardStep {
        self.state.lock().await.step
    }

    pub async fn draft(&self) -> SessionDraft {
        self.state.lock().await.draft.clone()
    }

    pub async fn submission(&self) -> SubmissionStatus {
        self.state.lock().await.submission
    }

    /// Only on the first step. The name is captured now and carried into the
    /// session as-is.
    pub async fn select_patient(&self, patient_id: Uuid) -> Result<PatientRef, SessionError> {
        let mut state = self.state.lock().await;
        state.ensure_editable("select_patient")?;

        if state.step != WizardStep::SelectPatient {
            warn!("select_patient called at step {}", state.step);
            return Err(SessionError::InvalidTransition {
                operation: "select_patient",
                step: state.step,
            });
        }

        let patient = self
            .patients
            .get(patient_id)
            .await
            .map_err(|e| SessionError::Directory(e.to_string()))?;

        let Some(patient) = patient else {
            return Err(state.reject_validation(vec![ValidationError::new(
                DraftField::Patient,
                format!("Unknown patient {}", patient_id),
            )]));
        };

        let selected = PatientRef {
            id: patient.id,
            name: patient.name,
        };
        debug!("Selected patient {} ({})", selected.name, selected.id);

        state.draft.patient = Some(selected.clone());
        state.errors.retain(|e| e.field != DraftField::Patient);
        Ok(selected)
    }

    pub async fn set_date_time(&self, date: NaiveDate, time: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.ensure_editable("set_date_time")?;

        state.draft.date = Some(date);
        state.draft.time = non_blank(Some(time.to_string()));
        debug!("Draft date/time set to {} {:?}", date, state.draft.time);
        Ok(())
    }

    pub async fn set_session_type(&self, session_type: SessionType) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.ensure_editable("set_session_type")?;

        state.draft.session_type = Some(session_type);
        debug!("Draft session type set to {}", session_type);
        Ok(())
    }

    /// Blank text clears the notes.
    pub async fn set_notes(&self, notes: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.ensure_editable("set_notes")?;

        state.draft.notes = non_blank(Some(notes.to_string()));
        Ok(())
    }

    /// Moves forward only when the current step validates.
    pub async fn advance(&self) -> Result<WizardStep, SessionError> {
        let mut state = self.state.lock().await;
        state.ensure_editable("advance")?;

        let Some(next) = state.step.next() else {
            warn!("advance called at the final step");
            return Err(SessionError::InvalidTransition {
                operation: "advance",
                step: state.step,
            });
        };

        if let Err(errors) = state.step.validate(&state.draft, self.clock.today()) {
            return Err(state.reject_validation(errors));
        }

        if state.step == WizardStep::SelectPatient {
            if let Err(errors) = self.check_patient_known(&state.draft).await? {
                return Err(state.reject_validation(errors));
            }
        }

        info!("Wizard advanced from {} to {}", state.step, next);
        state.step = next;
        state.errors.clear();
        Ok(next)
    }

    /// Moves back without validation. A no-op on the first step.
    pub async fn retreat(&self) -> Result<WizardStep, SessionError> {
        let mut state = self.state.lock().await;
        state.ensure_editable("retreat")?;

        if let Some(previous) = state.step.previous() {
            info!("Wizard moved back from {} to {}", state.step, previous);
            state.step = previous;
            state.errors.clear();
        }
        Ok(state.step)
    }

    /// Re-validates the whole draft and hands it to the store.
    ///
    /// Success resets the wizard for the next booking. Failure keeps the draft
    /// and the review step so the user can retry.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<ScheduledSession, SessionError> {
        let (validated, run) = {
            let mut state = self.state.lock().await;

            if state.in_flight {
                warn!("submit rejected, a submission is already in progress");
                return Err(SessionError::AlreadyInProgress);
            }

            if state.step != WizardStep::ReviewConfirm {
                warn!("submit called at step {}", state.step);
                return Err(SessionError::InvalidTransition {
                    operation: "submit",
                    step: state.step,
                });
            }

            let validated = match validate_draft(&state.draft, self.clock.today()) {
                Ok(validated) => validated,
                Err(errors) => return Err(state.reject_validation(errors)),
            };

            if let Err(errors) = self.check_patient_known(&state.draft).await? {
                return Err(state.reject_validation(errors));
            }

            state.submission = SubmissionStatus::Submitting;
            state.in_flight = true;
            state.errors.clear();
            state.last_failure = None;
            (validated, state.run)
        };

        info!("Submitting session for {} on {}", validated.patient_name(), validated.date());
        let result = self.store.create_session(validated).await;

        let mut state = self.state.lock().await;
        state.in_flight = false;

        if state.run != run {
            info!("Wizard was reset during submission; result not applied to the new run");
            return result.map_err(SessionError::from);
        }

        match result {
            Ok(session) => {
                info!("Session {} scheduled for {}", session.id, session.patient_name);
                state.submission = SubmissionStatus::Succeeded;
                state.step = WizardStep::SelectPatient;
                state.draft = SessionDraft::default();
                state.last_session = Some(session.clone());
                Ok(session)
            }
            Err(e) => {
                error!("Failed to save session: {}", e);
                state.submission = SubmissionStatus::Failed;
                state.last_failure = Some(e.to_string());
                Err(SessionError::Persistence(e))
            }
        }
    }

    /// Back to an empty first step. Allowed at any time.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;

        state.run += 1;
        state.step = WizardStep::SelectPatient;
        state.draft = SessionDraft::default();
        state.submission = SubmissionStatus::Idle;
        state.errors.clear();
        state.last_failure = None;
        info!("Wizard reset");
    }

    /// Outer error: the directory itself failed. Inner error: the patient is gone.
    async fn check_patient_known(
        &self,
        draft: &SessionDraft,
    ) -> Result<Result<(), Vec<ValidationError>>, SessionError> {
        let Some(selected) = &draft.patient else {
            return Ok(Ok(()));
        };

        let found = self
            .patients
            .get(selected.id)
            .await
            .map_err(|e| SessionError::Directory(e.to_string()))?;

        match found {
            Some(_) => Ok(Ok(())),
            None => Ok(Err(vec![ValidationError::new(
                DraftField::Patient,
                format!("{} is no longer in the patient directory", selected.name),
            )])),
        }
    }
}
