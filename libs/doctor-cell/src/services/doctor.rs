use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{directory, SessionType};

use crate::models::{Doctor, DoctorError};

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn list(&self) -> Vec<Doctor>;
}

#[derive(Debug, Default)]
pub struct InMemoryDoctorRepository {
    doctors: RwLock<Vec<Doctor>>,
}

impl InMemoryDoctorRepository {
    pub fn with_doctors(doctors: Vec<Doctor>) -> Self {
        Self {
            doctors: RwLock::new(doctors),
        }
    }
}

#[async_trait]
impl DoctorRepository for InMemoryDoctorRepository {
    async fn list(&self) -> Vec<Doctor> {
        self.doctors.read().await.clone()
    }
}

pub struct DoctorService {
    repository: Arc<dyn DoctorRepository>,
}

impl DoctorService {
    pub fn new(repository: Arc<dyn DoctorRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_doctors(&self) -> Vec<Doctor> {
        self.repository.list().await
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        self.repository
            .list()
            .await
            .into_iter()
            .find(|d| d.id == doctor_id)
            .ok_or(DoctorError::NotFound)
    }

    /// Matches name and expertise.
    pub async fn search_doctors(&self, query: &str) -> Vec<Doctor> {
        debug!("Searching doctors with query: {:?}", query);

        let doctors = self.repository.list().await;
        directory::filter(&doctors, query).into_iter().cloned().collect()
    }

    pub async fn doctors_offering(&self, session_type: SessionType) -> Vec<Doctor> {
        self.repository
            .list()
            .await
            .into_iter()
            .filter(|d| d.offers(session_type))
            .collect()
    }
}
