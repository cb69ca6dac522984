// libs/session-cell/src/services/validation.rs
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use shared_models::SessionType;

use crate::models::{
    DraftField, PatientRef, SessionDraft, TimeSlot, ValidationError, WizardStep,
};

/// A draft that passed every step's checks. Only `validate_draft` builds one,
/// and it is the only thing a `SessionStore` accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    patient: PatientRef,
    date: NaiveDate,
    time: TimeSlot,
    session_type: SessionType,
    notes: Option<String>,
}

impl ValidatedDraft {
    pub fn patient_id(&self) -> Uuid {
        self.patient.id
    }

    pub fn patient_name(&self) -> &str {
        &self.patient.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> TimeSlot {
        self.time
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

impl WizardStep {
    /// Checks the fields this step owns. The review step checks everything.
    ///
    /// Whether the selected patient still exists is the wizard's job; it
    /// needs the directory.
    pub fn validate(&self, draft: &SessionDraft, today: NaiveDate) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        match self {
            WizardStep::SelectPatient => {
                check_patient(draft, &mut errors);
            }
            WizardStep::ChooseDateTime => {
                check_date(draft, today, &mut errors);
                check_time(draft, &mut errors);
            }
            WizardStep::SelectType => {
                check_session_type(draft, &mut errors);
            }
            WizardStep::ReviewConfirm => {
                return validate_draft(draft, today).map(|_| ());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!("Step {} failed validation: {:?}", self, errors);
            Err(errors)
        }
    }
}

/// Runs every step's checks and, if they all hold, seals the draft.
pub fn validate_draft(draft: &SessionDraft, today: NaiveDate) -> Result<ValidatedDraft, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let patient = check_patient(draft, &mut errors);
    let date = check_date(draft, today, &mut errors);
    let time = check_time(draft, &mut errors);
    let session_type = check_session_type(draft, &mut errors);

    match (patient, date, time, session_type) {
        (Some(patient), Some(date), Some(time), Some(session_type)) if errors.is_empty() => {
            Ok(ValidatedDraft {
                patient,
                date,
                time,
                session_type,
                notes: draft.notes.clone(),
            })
        }
        _ => {
            debug!("Draft failed validation: {:?}", errors);
            Err(errors)
        }
    }
}

fn check_patient(draft: &SessionDraft, errors: &mut Vec<ValidationError>) -> Option<PatientRef> {
    if draft.patient.is_none() {
        errors.push(ValidationError::new(DraftField::Patient, "Please select a patient"));
    }
    draft.patient.clone()
}

fn check_date(draft: &SessionDraft, today: NaiveDate, errors: &mut Vec<ValidationError>) -> Option<NaiveDate> {
    match draft.date {
        None => {
            errors.push(ValidationError::new(DraftField::Date, "Session date is required"));
            None
        }
        Some(date) if date < today => {
            errors.push(ValidationError::new(
                DraftField::Date,
                format!("Session date {} is in the past", date),
            ));
            None
        }
        Some(date) => Some(date),
    }
}

fn check_time(draft: &SessionDraft, errors: &mut Vec<ValidationError>) -> Option<TimeSlot> {
    let Some(label) = draft.time.as_deref() else {
        errors.push(ValidationError::new(DraftField::Time, "Session time is required"));
        return None;
    };

    let slot = TimeSlot::parse(label);
    if slot.is_none() {
        errors.push(ValidationError::new(
            DraftField::Time,
            format!("{:?} is not an available time slot", label),
        ));
    }
    slot
}

fn check_session_type(draft: &SessionDraft, errors: &mut Vec<ValidationError>) -> Option<SessionType> {
    if draft.session_type.is_none() {
        errors.push(ValidationError::new(
            DraftField::SessionType,
            "Session type is required",
        ));
    }
    draft.session_type
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    fn full_draft() -> SessionDraft {
        SessionDraft {
            patient: Some(PatientRef {
                id: Uuid::from_u128(1),
                name: "John Doe".to_string(),
            }),
            date: Some(today()),
            time: Some("10:00 AM".to_string()),
            session_type: Some(SessionType::Online),
            notes: Some("First visit".to_string()),
        }
    }

    fn fields(result: Result<(), Vec<ValidationError>>) -> Vec<DraftField> {
        result.unwrap_err().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_each_step_checks_only_its_fields() {
        let draft = SessionDraft::default();

        assert_eq!(fields(WizardStep::SelectPatient.validate(&draft, today())), vec![DraftField::Patient]);
        assert_eq!(
            fields(WizardStep::ChooseDateTime.validate(&draft, today())),
            vec![DraftField::Date, DraftField::Time]
        );
        assert_eq!(fields(WizardStep::SelectType.validate(&draft, today())), vec![DraftField::SessionType]);
        assert_eq!(
            fields(WizardStep::ReviewConfirm.validate(&draft, today())),
            vec![DraftField::Patient, DraftField::Date, DraftField::Time, DraftField::SessionType]
        );
    }

    #[test]
    fn test_today_is_bookable_yesterday_is_not() {
        let mut draft = full_draft();
        assert!(WizardStep::ChooseDateTime.validate(&draft, today()).is_ok());

        draft.date = Some(today() - Duration::days(1));
        assert_eq!(fields(WizardStep::ChooseDateTime.validate(&draft, today())), vec![DraftField::Date]);
    }

    #[test]
    fn test_time_must_be_a_slot() {
        let mut draft = full_draft();
        draft.time = Some("7:00 PM".to_string());
        assert_eq!(fields(WizardStep::ChooseDateTime.validate(&draft, today())), vec![DraftField::Time]);
    }

    #[test]
    fn test_validated_draft_echoes_fields() {
        let sealed = validate_draft(&full_draft(), today()).unwrap();
        assert_eq!(sealed.patient_id(), Uuid::from_u128(1));
        assert_eq!(sealed.patient_name(), "John Doe");
        assert_eq!(sealed.date(), today());
        assert_eq!(sealed.time().label(), "10:00 AM");
        assert_eq!(sealed.session_type(), SessionType::Online);
        assert_eq!(sealed.notes(), Some("First visit"));
    }
}
