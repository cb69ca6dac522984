use std::sync::Arc;

use assert_matches::assert_matches;
use tokio_test::assert_ok;
use uuid::Uuid;

use patient_cell::seed::sample_patients;
use patient_cell::*;
use shared_utils::test_utils::{date, test_config, FixedClock};

// ==============================================================================
// TEST FIXTURES
// ==============================================================================

fn service_with(patients: Vec<Patient>) -> PatientService {
    let repository = Arc::new(InMemoryPatientRepository::with_patients(patients));
    let clock = Arc::new(FixedClock::on(2025, 3, 10));
    PatientService::new(&test_config(), repository, clock)
}

fn valid_request() -> CreatePatientRequest {
    CreatePatientRequest {
        name: "Meera Iyer".to_string(),
        mobile_number: "9123456780".to_string(),
        whatsapp_number: None,
        whatsapp_same_as_mobile: true,
        email: Some("meera.iyer@email.com".to_string()),
        address: Some("22 Temple Street, Chennai".to_string()),
    }
}

// ==============================================================================
// INTAKE
// ==============================================================================

#[tokio::test]
async fn test_create_patient_assigns_id_and_date() {
    let service = service_with(vec![]);

    let patient = service.create_patient(valid_request()).await.unwrap();

    assert_eq!(patient.name, "Meera Iyer");
    assert_eq!(patient.whatsapp_number, "9123456780");
    assert_eq!(patient.created_at, date(2025, 3, 10));
    assert_eq!(service.get_patient(patient.id).await.unwrap(), patient);
}

#[tokio::test]
async fn test_create_patient_reports_every_invalid_field() {
    let service = service_with(vec![]);

    let request = CreatePatientRequest {
        name: "M".to_string(),
        mobile_number: "912345678".to_string(),
        whatsapp_number: Some("12".to_string()),
        whatsapp_same_as_mobile: false,
        email: Some("meera@".to_string()),
        address: Some("Chennai".to_string()),
    };

    let error = service.create_patient(request).await.unwrap_err();
    let fields: Vec<PatientField> = error.issues().iter().map(|i| i.field).collect();
    assert_eq!(
        fields,
        vec![
            PatientField::Name,
            PatientField::MobileNumber,
            PatientField::WhatsappNumber,
            PatientField::Email,
            PatientField::Address,
        ]
    );
    assert!(service.list_patients().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_whatsapp_required_when_not_same_as_mobile() {
    let service = service_with(vec![]);

    let request = CreatePatientRequest {
        whatsapp_same_as_mobile: false,
        whatsapp_number: Some("   ".to_string()),
        ..valid_request()
    };

    let error = service.create_patient(request).await.unwrap_err();
    assert_matches!(error, PatientError::Validation(ref issues) if issues.len() == 1);
    assert_eq!(error.issues()[0].message, "WhatsApp number is required");
}

#[tokio::test]
async fn test_duplicate_mobile_rejected() {
    let service = service_with(sample_patients());

    let request = CreatePatientRequest {
        mobile_number: "9876543210".to_string(),
        ..valid_request()
    };

    let result = service.create_patient(request).await;
    assert_matches!(result, Err(PatientError::MobileAlreadyExists { .. }));
}

// ==============================================================================
// EDIT / DELETE
// ==============================================================================

#[tokio::test]
async fn test_update_patient_revalidates_merged_record() {
    let service = service_with(sample_patients());
    let jane = sample_patients().remove(1);

    let updated = service
        .update_patient(
            jane.id,
            UpdatePatientRequest {
                address: Some("9 Residency Road, Bengaluru".to_string()),
                whatsapp_same_as_mobile: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.whatsapp_number, jane.mobile_number);
    assert_eq!(updated.created_at, jane.created_at);
    assert_eq!(updated.address.as_deref(), Some("9 Residency Road, Bengaluru"));

    let invalid = service
        .update_patient(
            jane.id,
            UpdatePatientRequest {
                mobile_number: Some("123".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(invalid, Err(PatientError::Validation(_)));
    assert_eq!(service.get_patient(jane.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_and_delete_unknown_patient() {
    let service = service_with(sample_patients());

    let update = service
        .update_patient(Uuid::new_v4(), UpdatePatientRequest::default())
        .await;
    assert_matches!(update, Err(PatientError::NotFound));

    let delete = service.delete_patient(Uuid::new_v4()).await;
    assert_matches!(delete, Err(PatientError::NotFound));
}

#[tokio::test]
async fn test_delete_patient_removes_from_directory() {
    let service = service_with(sample_patients());
    let john = sample_patients().remove(0);

    assert_ok!(service.delete_patient(john.id).await);

    let remaining = service.list_patients().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert_matches!(service.get_patient(john.id).await, Err(PatientError::NotFound));
}

// ==============================================================================
// SEARCH
// ==============================================================================

#[tokio::test]
async fn test_search_matches_name_phone_and_email() {
    let service = service_with(sample_patients());

    let by_name = service.search_patients("jan").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Jane Smith");

    let by_phone = service.search_patients("543213").await.unwrap();
    assert_eq!(by_phone[0].name, "Bob Johnson");

    let by_email = service.search_patients("JOHN.DOE@").await.unwrap();
    assert_eq!(by_email[0].name, "John Doe");

    let everyone = service.search_patients("").await.unwrap();
    let names: Vec<&str> = everyone.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["John Doe", "Jane Smith", "Bob Johnson"]);
}
