use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::directory;
use shared_utils::Clock;

use crate::models::{CreatePatientRequest, Patient, PatientError, PatientFields, UpdatePatientRequest};
use crate::services::repository::PatientRepository;

pub struct PatientService {
    repository: Arc<dyn PatientRepository>,
    clock: Arc<dyn Clock>,
    intake_delay: Duration,
}

impl PatientService {
    pub fn new(
        config: &AppConfig,
        repository: Arc<dyn PatientRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            clock,
            intake_delay: config.intake_delay(),
        }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Creating new patient profile for mobile {}", request.mobile_number);

        let fields = request.validate().map_err(|e| {
            warn!("Patient intake rejected: {}", e);
            e
        })?;

        let existing = self.repository.list().await?;
        if existing.iter().any(|p| p.mobile_number == fields.mobile_number) {
            warn!("Patient with mobile {} already exists", fields.mobile_number);
            return Err(PatientError::MobileAlreadyExists {
                mobile_number: fields.mobile_number,
            });
        }

        self.simulate_latency().await;

        let patient = build_patient(Uuid::new_v4(), fields, self.clock.today());
        let patient = self.repository.insert(patient).await?;

        info!("Patient profile created successfully with ID: {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient profile: {}", patient_id);

        self.repository
            .get(patient_id)
            .await?
            .ok_or(PatientError::NotFound)
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        let current = self.get_patient(patient_id).await?;
        let fields = request.merge_into(&current).validate().map_err(|e| {
            warn!("Patient update rejected for {}: {}", patient_id, e);
            e
        })?;

        self.simulate_latency().await;

        let updated = build_patient(current.id, fields, current.created_at);
        let updated = self.repository.update(updated).await?;

        info!("Patient profile updated: {}", patient_id);
        Ok(updated)
    }

    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        debug!("Deleting patient profile: {}", patient_id);

        self.repository.delete(patient_id).await?;

        info!("Patient profile deleted: {}", patient_id);
        Ok(())
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        self.repository.list().await
    }

    pub async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, PatientError> {
        debug!("Searching patients with query: {:?}", query);

        let patients = self.repository.list().await?;
        Ok(directory::filter(&patients, query).into_iter().cloned().collect())
    }

    async fn simulate_latency(&self) {
        if !self.intake_delay.is_zero() {
            tokio::time::sleep(self.intake_delay).await;
        }
    }
}

fn build_patient(id: Uuid, fields: PatientFields, created_at: chrono::NaiveDate) -> Patient {
    Patient {
        id,
        name: fields.name,
        mobile_number: fields.mobile_number,
        whatsapp_number: fields.whatsapp_number,
        whatsapp_same_as_mobile: fields.whatsapp_same_as_mobile,
        email: fields.email,
        address: fields.address,
        created_at,
    }
}
