use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use patient_cell::seed::sample_patients;
use patient_cell::{InMemoryPatientRepository, PatientRepository};
use session_cell::*;
use shared_models::SessionType;
use shared_utils::test_utils::{date, FixedClock};

// ==============================================================================
// TEST FIXTURES
// ==============================================================================

const JOHN: u128 = 1;
const JANE: u128 = 2;

fn today() -> NaiveDate {
    date(2025, 6, 20)
}

struct Harness {
    wizard: SessionWizard,
    patients: Arc<InMemoryPatientRepository>,
    store: Arc<InMemorySessionStore>,
    clock: Arc<FixedClock>,
}

fn harness() -> Harness {
    let patients = Arc::new(InMemoryPatientRepository::with_patients(sample_patients()));
    let store = Arc::new(InMemorySessionStore::default());
    let clock = Arc::new(FixedClock::new(today()));
    let wizard = SessionWizard::new(patients.clone(), store.clone(), clock.clone());
    Harness {
        wizard,
        patients,
        store,
        clock,
    }
}

/// Fills every field and walks to the review step.
async fn fill_to_review(wizard: &SessionWizard) {
    wizard.select_patient(Uuid::from_u128(JOHN)).await.unwrap();
    wizard.advance().await.unwrap();
    wizard.set_date_time(today(), "10:00 AM").await.unwrap();
    wizard.advance().await.unwrap();
    wizard.set_session_type(SessionType::InPerson).await.unwrap();
    wizard.advance().await.unwrap();
}

// ==============================================================================
// STEP NAVIGATION
// ==============================================================================

#[tokio::test]
async fn test_select_patient_then_advance_reaches_date_step() {
    let h = harness();

    let selected = h.wizard.select_patient(Uuid::from_u128(JOHN)).await.unwrap();
    assert_eq!(selected.name, "John Doe");

    let step = h.wizard.advance().await.unwrap();
    assert_eq!(step, WizardStep::ChooseDateTime);
    assert_eq!(h.wizard.current_step().await.index(), 1);
}

#[tokio::test]
async fn test_advance_without_patient_is_rejected() {
    let h = harness();

    let error = h.wizard.advance().await.unwrap_err();

    assert_matches!(error, SessionError::Validation(_));
    assert_eq!(error.fields(), vec![DraftField::Patient]);
    assert_eq!(h.wizard.current_step().await, WizardStep::SelectPatient);

    let snapshot = h.wizard.snapshot().await;
    assert_eq!(snapshot.errors.len(), 1);
    assert_eq!(snapshot.errors[0].reason, "Please select a patient");
}

#[tokio::test]
async fn test_past_date_is_rejected_at_date_step() {
    let h = harness();
    h.wizard.select_patient(Uuid::from_u128(JOHN)).await.unwrap();
    h.wizard.advance().await.unwrap();

    h.wizard
        .set_date_time(today() - Duration::days(1), "10:00 AM")
        .await
        .unwrap();
    let error = h.wizard.advance().await.unwrap_err();

    assert_eq!(error.fields(), vec![DraftField::Date]);
    assert_eq!(h.wizard.current_step().await, WizardStep::ChooseDateTime);
}

#[tokio::test]
async fn test_failed_advance_never_moves_the_step() {
    let h = harness();
    h.wizard.select_patient(Uuid::from_u128(JOHN)).await.unwrap();
    h.wizard.advance().await.unwrap();

    for (day, time) in [(today(), "   "), (today(), "7:00 PM"), (today(), "10:15 AM")] {
        assert_ok!(h.wizard.set_date_time(day, time).await);
        assert_err!(h.wizard.advance().await);
        assert_eq!(h.wizard.current_step().await, WizardStep::ChooseDateTime);
    }

    h.wizard.set_date_time(today(), "10:30 AM").await.unwrap();
    assert_ok!(h.wizard.advance().await);
    assert_err!(h.wizard.advance().await);
    assert_eq!(h.wizard.current_step().await, WizardStep::SelectType);
}

#[tokio::test]
async fn test_retreat_keeps_draft() {
    let h = harness();
    fill_to_review(&h.wizard).await;
    h.wizard.set_notes("Bring reports").await.unwrap();
    let before = h.wizard.draft().await;

    assert_eq!(h.wizard.retreat().await.unwrap(), WizardStep::SelectType);
    assert_eq!(h.wizard.retreat().await.unwrap(), WizardStep::ChooseDateTime);
    assert_eq!(h.wizard.retreat().await.unwrap(), WizardStep::SelectPatient);
    assert_eq!(h.wizard.retreat().await.unwrap(), WizardStep::SelectPatient);

    assert_eq!(h.wizard.draft().await, before);
}

#[tokio::test]
async fn test_out_of_place_operations_are_contract_errors() {
    let h = harness();

    assert_matches!(
        h.wizard.submit().await,
        Err(SessionError::InvalidTransition { operation: "submit", step: WizardStep::SelectPatient })
    );

    fill_to_review(&h.wizard).await;

    assert_matches!(
        h.wizard.advance().await,
        Err(SessionError::InvalidTransition { operation: "advance", .. })
    );
    let error = h.wizard.select_patient(Uuid::from_u128(JANE)).await.unwrap_err();
    assert_matches!(error, SessionError::InvalidTransition { operation: "select_patient", .. });
    assert!(!error.is_user_facing());
}

#[tokio::test]
async fn test_unknown_patient_cannot_be_selected() {
    let h = harness();

    let error = h.wizard.select_patient(Uuid::from_u128(99)).await.unwrap_err();

    assert_eq!(error.fields(), vec![DraftField::Patient]);
    assert!(h.wizard.draft().await.patient.is_none());
}

#[tokio::test]
async fn test_patient_removed_before_submit_is_rejected() {
    let h = harness();
    fill_to_review(&h.wizard).await;

    h.patients.delete(Uuid::from_u128(JOHN)).await.unwrap();
    let error = h.wizard.submit().await.unwrap_err();

    assert_eq!(error.fields(), vec![DraftField::Patient]);
    assert_eq!(h.wizard.current_step().await, WizardStep::ReviewConfirm);
    assert!(h.store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_date_that_passed_before_submit_is_rejected() {
    let h = harness();
    fill_to_review(&h.wizard).await;

    h.clock.advance_days(1);
    let error = h.wizard.submit().await.unwrap_err();

    assert_eq!(error.fields(), vec![DraftField::Date]);
    assert_eq!(h.wizard.current_step().await, WizardStep::ReviewConfirm);
    assert_eq!(h.wizard.submission().await, SubmissionStatus::Idle);
    assert!(h.store.list_sessions().await.unwrap().is_empty());
}

// ==============================================================================
// REVIEW AND RESET
// ==============================================================================

#[tokio::test]
async fn test_snapshot_echoes_collected_draft() {
    let h = harness();
    fill_to_review(&h.wizard).await;
    h.wizard.set_notes("  Follow-up on sleep  ").await.unwrap();

    let snapshot = h.wizard.snapshot().await;

    assert_eq!(snapshot.step, WizardStep::ReviewConfirm);
    assert_eq!(snapshot.step_index, 3);
    assert_eq!(snapshot.step_title, "Review & Confirm");
    assert_eq!(snapshot.submission, SubmissionStatus::Idle);

    let patient = snapshot.draft.patient.unwrap();
    assert_eq!(patient.id, Uuid::from_u128(JOHN));
    assert_eq!(patient.name, "John Doe");
    assert_eq!(snapshot.draft.date, Some(today()));
    assert_eq!(snapshot.draft.time.as_deref(), Some("10:00 AM"));
    assert_eq!(snapshot.draft.session_type, Some(SessionType::InPerson));
    assert_eq!(snapshot.draft.notes.as_deref(), Some("Follow-up on sleep"));
}

#[tokio::test]
async fn test_blank_notes_clear_the_field() {
    let h = harness();
    h.wizard.set_notes("call first").await.unwrap();
    h.wizard.set_notes("   ").await.unwrap();

    assert_eq!(h.wizard.draft().await.notes, None);
}

#[tokio::test]
async fn test_reset_returns_to_empty_first_step() {
    let h = harness();
    fill_to_review(&h.wizard).await;

    h.wizard.reset().await;

    let snapshot = h.wizard.snapshot().await;
    assert_eq!(snapshot.step, WizardStep::SelectPatient);
    assert!(snapshot.draft.is_empty());
    assert_eq!(snapshot.submission, SubmissionStatus::Idle);
    assert!(snapshot.errors.is_empty());
}

#[test]
fn test_step_titles_in_order() {
    assert_eq!(
        SessionWizard::step_titles(),
        vec!["Select Patient", "Choose Date & Time", "Select Session Type", "Review & Confirm"]
    );
}
