use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Patient, PatientError};

/// Owner of the patient list. Passed into the services that need it.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// All patients in insertion order.
    async fn list(&self) -> Result<Vec<Patient>, PatientError>;

    async fn get(&self, patient_id: Uuid) -> Result<Option<Patient>, PatientError>;

    async fn insert(&self, patient: Patient) -> Result<Patient, PatientError>;

    async fn update(&self, patient: Patient) -> Result<Patient, PatientError>;

    async fn delete(&self, patient_id: Uuid) -> Result<(), PatientError>;
}

#[derive(Debug, Default)]
pub struct InMemoryPatientRepository {
    patients: RwLock<Vec<Patient>>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(patients: Vec<Patient>) -> Self {
        Self {
            patients: RwLock::new(patients),
        }
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn list(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.patients.read().await.clone())
    }

    async fn get(&self, patient_id: Uuid) -> Result<Option<Patient>, PatientError> {
        let patients = self.patients.read().await;
        Ok(patients.iter().find(|p| p.id == patient_id).cloned())
    }

    async fn insert(&self, patient: Patient) -> Result<Patient, PatientError> {
        let mut patients = self.patients.write().await;
        if patients.iter().any(|p| p.mobile_number == patient.mobile_number) {
            return Err(PatientError::MobileAlreadyExists {
                mobile_number: patient.mobile_number,
            });
        }
        patients.push(patient.clone());
        Ok(patient)
    }

    async fn update(&self, patient: Patient) -> Result<Patient, PatientError> {
        let mut patients = self.patients.write().await;

        if patients
            .iter()
            .any(|p| p.id != patient.id && p.mobile_number == patient.mobile_number)
        {
            return Err(PatientError::MobileAlreadyExists {
                mobile_number: patient.mobile_number,
            });
        }

        let slot = patients
            .iter_mut()
            .find(|p| p.id == patient.id)
            .ok_or(PatientError::NotFound)?;
        *slot = patient.clone();
        Ok(patient)
    }

    async fn delete(&self, patient_id: Uuid) -> Result<(), PatientError> {
        let mut patients = self.patients.write().await;
        let before = patients.len();
        patients.retain(|p| p.id != patient_id);

        if patients.len() == before {
            return Err(PatientError::NotFound);
        }
        Ok(())
    }
}
