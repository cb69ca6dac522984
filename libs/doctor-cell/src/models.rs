use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::{AppError, SessionType, Searchable};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub expertise: String,
    pub gender: Gender,
    pub session_modes: Vec<SessionType>,
    /// Fee per session in whole rupees.
    pub session_fee: u32,
}

impl Doctor {
    pub fn offers(&self, session_type: SessionType) -> bool {
        self.session_modes.contains(&session_type)
    }

    /// "In-Person & Online", "Online", ...
    pub fn session_modes_label(&self) -> String {
        self.session_modes
            .iter()
            .map(SessionType::label)
            .collect::<Vec<_>>()
            .join(" & ")
    }

    /// Indian digit grouping, e.g. "₹1,500/-".
    pub fn fee_label(&self) -> String {
        let digits = self.session_fee.to_string();
        let grouped = if digits.len() <= 3 {
            digits
        } else {
            let (head, tail) = digits.split_at(digits.len() - 3);
            let mut groups = Vec::new();
            let mut rest = head;
            while rest.len() > 2 {
                let (left, right) = rest.split_at(rest.len() - 2);
                groups.push(right);
                rest = left;
            }
            groups.push(rest);
            groups.reverse();
            format!("{},{}", groups.join(","), tail)
        };
        format!("₹{}/-", grouped)
    }
}

impl Searchable for Doctor {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.expertise.as_str()]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,
}

impl From<DoctorError> for AppError {
    fn from(error: DoctorError) -> Self {
        AppError::NotFound(error.to_string())
    }
}
