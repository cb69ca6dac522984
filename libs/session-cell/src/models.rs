// libs/session-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use shared_models::{AppError, SessionType};

// ==============================================================================
// TIME SLOTS
// ==============================================================================

pub const SLOT_MINUTES: i64 = 30;
const FIRST_SLOT: (u32, u32) = (9, 0);
const LAST_SLOT: (u32, u32) = (17, 30);

/// One bookable 30-minute start time between 9:00 AM and 5:30 PM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    /// Every slot of the day, earliest first.
    pub fn all() -> Vec<TimeSlot> {
        let (first, last) = match (slot_bound(FIRST_SLOT), slot_bound(LAST_SLOT)) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec::new(),
        };

        let mut slots = Vec::new();
        let mut current = first;
        while current <= last {
            slots.push(TimeSlot(current));
            current += Duration::minutes(SLOT_MINUTES);
        }
        slots
    }

    /// `None` unless the time is on the half-hour grid inside opening hours.
    pub fn from_time(time: NaiveTime) -> Option<Self> {
        let first = slot_bound(FIRST_SLOT)?;
        let last = slot_bound(LAST_SLOT)?;

        let on_grid = time.second() == 0
            && time.nanosecond() == 0
            && i64::from(time.minute()) % SLOT_MINUTES == 0;

        (on_grid && time >= first && time <= last).then_some(TimeSlot(time))
    }

    /// Parses "10:00 AM", "09:30 am", "5:30PM".
    pub fn parse(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        let (clock, afternoon) = if let Some(rest) = upper.strip_suffix("PM") {
            (rest.trim_end(), true)
        } else if let Some(rest) = upper.strip_suffix("AM") {
            (rest.trim_end(), false)
        } else {
            return None;
        };

        let (hour, minute) = clock.split_once(':')?;
        if minute.len() != 2 {
            return None;
        }
        let hour: u32 = hour.parse().ok()?;
        let minute: u32 = minute.parse().ok()?;
        if !(1..=12).contains(&hour) {
            return None;
        }

        let hour = match (hour, afternoon) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };

        Self::from_time(NaiveTime::from_hms_opt(hour, minute, 0)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.0
    }

    pub fn end(&self) -> NaiveTime {
        self.0 + Duration::minutes(SLOT_MINUTES)
    }

    pub fn label(&self) -> String {
        let hour = self.0.hour();
        let meridiem = if hour < 12 { "AM" } else { "PM" };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour12, self.0.minute(), meridiem)
    }
}

fn slot_bound((hour, minute): (u32, u32)) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.label())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        TimeSlot::parse(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("not a bookable time slot: {}", label)))
    }
}

// ==============================================================================
// WIZARD STATE
// ==============================================================================

/// The four screens of the scheduling flow. Validation per step lives in
/// `services::validation`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectPatient,
    ChooseDateTime,
    SelectType,
    ReviewConfirm,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::SelectPatient,
        WizardStep::ChooseDateTime,
        WizardStep::SelectType,
        WizardStep::ReviewConfirm,
    ];

    pub fn index(&self) -> usize {
        match self {
            WizardStep::SelectPatient => 0,
            WizardStep::ChooseDateTime => 1,
            WizardStep::SelectType => 2,
            WizardStep::ReviewConfirm => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectPatient => "Select Patient",
            WizardStep::ChooseDateTime => "Choose Date & Time",
            WizardStep::SelectType => "Select Session Type",
            WizardStep::ReviewConfirm => "Review & Confirm",
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectPatient => Some(WizardStep::ChooseDateTime),
            WizardStep::ChooseDateTime => Some(WizardStep::SelectType),
            WizardStep::SelectType => Some(WizardStep::ReviewConfirm),
            WizardStep::ReviewConfirm => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectPatient => None,
            WizardStep::ChooseDateTime => Some(WizardStep::SelectPatient),
            WizardStep::SelectType => Some(WizardStep::ChooseDateTime),
            WizardStep::ReviewConfirm => Some(WizardStep::SelectType),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.title())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Idle => write!(f, "idle"),
            SubmissionStatus::Submitting => write!(f, "submitting"),
            SubmissionStatus::Succeeded => write!(f, "succeeded"),
            SubmissionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Id and display name of the selected patient, captured at selection time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientRef {
    pub id: Uuid,
    pub name: String,
}

/// In-progress session data. Fields are unchecked until a step validates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDraft {
    pub patient: Option<PatientRef>,
    pub date: Option<NaiveDate>,
    /// Raw slot label as entered, e.g. "10:00 AM".
    pub time: Option<String>,
    pub session_type: Option<SessionType>,
    pub notes: Option<String>,
}

impl SessionDraft {
    pub fn is_empty(&self) -> bool {
        *self == SessionDraft::default()
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub step: WizardStep,
    pub step_index: usize,
    pub step_title: String,
    pub draft: SessionDraft,
    pub submission: SubmissionStatus,
    pub errors: Vec<ValidationError>,
    pub last_session: Option<ScheduledSession>,
    pub last_failure: Option<String>,
    /// A store call from this or an earlier run is still pending; `submit`
    /// is refused until it clears.
    pub in_flight: bool,
}

// ==============================================================================
// SCHEDULED SESSIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Scheduled => write!(f, "scheduled"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A booked session. Built only by `ScheduledSession::from_validated`, so every
/// session went through draft validation; outside this crate it cannot be
/// written as a literal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ScheduledSession {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySummary {
    pub date: Option<NaiveDate>,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Patient,
    Date,
    Time,
    SessionType,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::Patient => write!(f, "patient"),
            DraftField::Date => write!(f, "date"),
            DraftField::Time => write!(f, "time"),
            DraftField::SessionType => write!(f, "session_type"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: DraftField,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: DraftField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure reported by the session store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct PersistenceError {
    pub cause: String,
}

impl PersistenceError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Validation error: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Session could not be saved: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("A submission is already in progress")]
    AlreadyInProgress,

    #[error("{operation} is not allowed at step {step}")]
    InvalidTransition {
        operation: &'static str,
        step: WizardStep,
    },

    #[error("Patient directory error: {0}")]
    Directory(String),

    #[error("Session not found")]
    NotFound,

    #[error("Session cannot be modified in current status: {0}")]
    InvalidStatusTransition(SessionStatus),
}

impl SessionError {
    /// Fields named by a validation failure, in report order.
    pub fn fields(&self) -> Vec<DraftField> {
        match self {
            SessionError::Validation(errors) => errors.iter().map(|e| e.field).collect(),
            _ => Vec::new(),
        }
    }

    /// Contract violations are for the caller to fix, not the user.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            SessionError::AlreadyInProgress
                | SessionError::InvalidTransition { .. }
                | SessionError::Directory(_)
        )
    }
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Validation(errors) => AppError::ValidationError(join_errors(&errors)),
            SessionError::Persistence(e) => AppError::Persistence(e.cause),
            SessionError::NotFound => AppError::NotFound(error.to_string()),
            SessionError::InvalidStatusTransition(_) => AppError::Conflict(error.to_string()),
            SessionError::AlreadyInProgress
            | SessionError::InvalidTransition { .. }
            | SessionError::Directory(_) => AppError::Internal(error.to_string()),
        }
    }
}
