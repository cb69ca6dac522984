use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::{AppError, Searchable};
use shared_utils::validation::{has_min_chars, is_email, is_phone_number, non_blank};

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_ADDRESS_CHARS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub mobile_number: String,
    pub whatsapp_number: String,
    pub whatsapp_same_as_mobile: bool,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDate,
}

impl Patient {
    /// Initials shown in the patient avatar, e.g. "JD" for "John Doe".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

impl Searchable for Patient {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.mobile_number.as_str()];
        if let Some(email) = &self.email {
            fields.push(email.as_str());
        }
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub name: String,
    pub mobile_number: String,
    pub whatsapp_number: Option<String>,
    pub whatsapp_same_as_mobile: bool,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub mobile_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub whatsapp_same_as_mobile: Option<bool>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Intake fields after trimming and WhatsApp defaulting, checked against the
/// intake rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    pub name: String,
    pub mobile_number: String,
    pub whatsapp_number: String,
    pub whatsapp_same_as_mobile: bool,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CreatePatientRequest {
    /// Normalizes the request and reports every failing field at once.
    pub fn validate(self) -> Result<PatientFields, PatientError> {
        let mut issues = Vec::new();

        let name = self.name.trim().to_string();
        if !has_min_chars(&name, MIN_NAME_CHARS) {
            issues.push(FieldIssue::new(
                PatientField::Name,
                "Name must be at least 2 characters",
            ));
        }

        let mobile_number = self.mobile_number.trim().to_string();
        if mobile_number.is_empty() {
            issues.push(FieldIssue::new(
                PatientField::MobileNumber,
                "Mobile number is required",
            ));
        } else if !is_phone_number(&mobile_number) {
            issues.push(FieldIssue::new(
                PatientField::MobileNumber,
                "Mobile number must be 10 digits",
            ));
        }

        let whatsapp_number = if self.whatsapp_same_as_mobile {
            mobile_number.clone()
        } else {
            match non_blank(self.whatsapp_number) {
                Some(number) if is_phone_number(&number) => number,
                Some(number) => {
                    issues.push(FieldIssue::new(
                        PatientField::WhatsappNumber,
                        "WhatsApp number must be 10 digits",
                    ));
                    number
                }
                None => {
                    issues.push(FieldIssue::new(
                        PatientField::WhatsappNumber,
                        "WhatsApp number is required",
                    ));
                    String::new()
                }
            }
        };

        let email = non_blank(self.email);
        if let Some(email) = &email {
            if !is_email(email) {
                issues.push(FieldIssue::new(PatientField::Email, "Invalid email format"));
            }
        }

        let address = non_blank(self.address);
        if let Some(address) = &address {
            if !has_min_chars(address, MIN_ADDRESS_CHARS) {
                issues.push(FieldIssue::new(
                    PatientField::Address,
                    "Address must be at least 10 characters",
                ));
            }
        }

        if !issues.is_empty() {
            return Err(PatientError::Validation(issues));
        }

        Ok(PatientFields {
            name,
            mobile_number,
            whatsapp_number,
            whatsapp_same_as_mobile: self.whatsapp_same_as_mobile,
            email,
            address,
        })
    }
}

impl UpdatePatientRequest {
    /// Overlays the changes on an existing record. Unchecked; run `validate`
    /// on the result.
    pub fn merge_into(self, patient: &Patient) -> CreatePatientRequest {
        let whatsapp_same_as_mobile = self
            .whatsapp_same_as_mobile
            .unwrap_or(patient.whatsapp_same_as_mobile);

        CreatePatientRequest {
            name: self.name.unwrap_or_else(|| patient.name.clone()),
            mobile_number: self
                .mobile_number
                .unwrap_or_else(|| patient.mobile_number.clone()),
            whatsapp_number: self
                .whatsapp_number
                .or_else(|| Some(patient.whatsapp_number.clone())),
            whatsapp_same_as_mobile,
            email: self.email.or_else(|| patient.email.clone()),
            address: self.address.or_else(|| patient.address.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatientField {
    Name,
    MobileNumber,
    WhatsappNumber,
    Email,
    Address,
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientField::Name => write!(f, "name"),
            PatientField::MobileNumber => write!(f, "mobile_number"),
            PatientField::WhatsappNumber => write!(f, "whatsapp_number"),
            PatientField::Email => write!(f, "email"),
            PatientField::Address => write!(f, "address"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: PatientField,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: PatientField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient with mobile number {mobile_number} already exists")]
    MobileAlreadyExists { mobile_number: String },

    #[error("Validation error: {}", join_issues(.0))]
    Validation(Vec<FieldIssue>),
}

impl PatientError {
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            PatientError::Validation(issues) => issues,
            _ => &[],
        }
    }
}

impl From<PatientError> for AppError {
    fn from(error: PatientError) -> Self {
        match error {
            PatientError::NotFound => AppError::NotFound(error.to_string()),
            PatientError::MobileAlreadyExists { .. } => AppError::Conflict(error.to_string()),
            PatientError::Validation(issues) => AppError::ValidationError(join_issues(&issues)),
        }
    }
}
