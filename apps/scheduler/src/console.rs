use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use doctor_cell::{Doctor, DoctorService};
use patient_cell::{CreatePatientRequest, Patient, PatientService};
use session_cell::{
    CalendarService, ScheduledSession, SessionWizard, SubmissionStatus, TimeSlot, WizardSnapshot,
    WizardStep,
};
use shared_models::{AppError, SessionType, UnknownSessionType};
use shared_utils::Clock;

pub const HELP: &str = "\
Commands:
  patients [query]            list or search patients
  doctors [query]             list or search doctors
  add-patient name | mobile | whatsapp or 'same' | email | address
  select <number|id>          pick a patient (step 1)
  date <YYYY-MM-DD> <time>    set session date and slot, e.g. date 2025-06-23 10:00 AM
  type <in-person|online>     set session type
  notes <text>                set notes, empty text clears them
  next | back                 move between steps
  submit                      book the session (step 4)
  reset                       start over
  show                        print the current step and draft
  slots                       list bookable time slots
  calendar [YYYY-MM-DD]       sessions on a day, today by default
  upcoming                    next scheduled sessions
  complete <id> | cancel <id> close a session
  help | quit";

const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Patients(String),
    Doctors(String),
    AddPatient(CreatePatientRequest),
    Select(String),
    Date(NaiveDate, String),
    Type(SessionType),
    Notes(String),
    Next,
    Back,
    Submit,
    Reset,
    Show,
    Slots,
    Calendar(Option<NaiveDate>),
    Upcoming,
    Complete(Uuid),
    Cancel(Uuid),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, AppError> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "patients" => Command::Patients(rest.to_string()),
            "doctors" => Command::Doctors(rest.to_string()),
            "add-patient" => Command::AddPatient(parse_patient(rest)?),
            "select" if !rest.is_empty() => Command::Select(rest.to_string()),
            "date" => {
                let (day, time) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| bad_request("usage: date <YYYY-MM-DD> <time>"))?;
                Command::Date(parse_date(day)?, time.trim().to_string())
            }
            "type" => Command::Type(
                rest.parse()
                    .map_err(|e: UnknownSessionType| bad_request(e.to_string()))?,
            ),
            "notes" => Command::Notes(rest.to_string()),
            "next" => Command::Next,
            "back" => Command::Back,
            "submit" => Command::Submit,
            "reset" => Command::Reset,
            "show" => Command::Show,
            "slots" => Command::Slots,
            "calendar" if rest.is_empty() => Command::Calendar(None),
            "calendar" => Command::Calendar(Some(parse_date(rest)?)),
            "upcoming" => Command::Upcoming,
            "complete" => Command::Complete(parse_id(rest)?),
            "cancel" => Command::Cancel(parse_id(rest)?),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(bad_request(format!("unknown command {:?}, try 'help'", line))),
        };

        Ok(command)
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::BadRequest(message.into())
}

fn parse_date(text: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| bad_request(format!("{:?} is not a date, expected YYYY-MM-DD", text)))
}

fn parse_id(text: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(text.trim()).map_err(|_| bad_request(format!("{:?} is not a session id", text)))
}

fn parse_patient(text: &str) -> Result<CreatePatientRequest, AppError> {
    let parts: Vec<&str> = text.split('|').map(str::trim).collect();
    let [name, mobile, whatsapp, email, address] = parts.as_slice() else {
        return Err(bad_request(
            "usage: add-patient name | mobile | whatsapp or 'same' | email | address",
        ));
    };

    let same = whatsapp.eq_ignore_ascii_case("same");
    let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

    Ok(CreatePatientRequest {
        name: name.to_string(),
        mobile_number: mobile.to_string(),
        whatsapp_number: if same { None } else { optional(whatsapp) },
        whatsapp_same_as_mobile: same,
        email: optional(email),
        address: optional(address),
    })
}

/// Whether the loop should keep reading input.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Presentation layer: turns commands into service calls and renders the
/// results as text.
pub struct Console {
    pub wizard: Arc<SessionWizard>,
    pub patients: PatientService,
    pub doctors: DoctorService,
    pub calendar: CalendarService,
    pub clock: Arc<dyn Clock>,
}

impl Console {
    pub async fn handle(&self, command: Command) -> Result<(String, Flow), AppError> {
        let output = match command {
            Command::Patients(query) => {
                let patients = self.patients.search_patients(&query).await?;
                render_patients(&patients)
            }
            Command::Doctors(query) => render_doctors(&self.doctors.search_doctors(&query).await),
            Command::AddPatient(request) => {
                let patient = self.patients.create_patient(request).await?;
                format!("Added {} ({})", patient.name, patient.id)
            }
            Command::Select(target) => {
                let patient_id = self.resolve_patient(&target).await?;
                let selected = self.wizard.select_patient(patient_id).await?;
                format!("Selected {}", selected.name)
            }
            Command::Date(date, time) => {
                self.wizard.set_date_time(date, &time).await?;
                self.render_snapshot().await
            }
            Command::Type(session_type) => {
                self.wizard.set_session_type(session_type).await?;
                format!("Session type: {}", session_type)
            }
            Command::Notes(notes) => {
                self.wizard.set_notes(&notes).await?;
                "Notes updated".to_string()
            }
            Command::Next => {
                self.wizard.advance().await?;
                self.render_snapshot().await
            }
            Command::Back => {
                self.wizard.retreat().await?;
                self.render_snapshot().await
            }
            Command::Submit => {
                let session = self.wizard.submit().await?;
                format!("Session scheduled:\n{}", render_session_json(&session)?)
            }
            Command::Reset => {
                self.wizard.reset().await;
                self.render_snapshot().await
            }
            Command::Show => self.render_snapshot().await,
            Command::Slots => TimeSlot::all()
                .iter()
                .map(TimeSlot::label)
                .collect::<Vec<_>>()
                .join(", "),
            Command::Calendar(date) => {
                let date = date.unwrap_or_else(|| self.clock.today());
                let sessions = self.calendar.sessions_on(date).await?;
                let summary = self.calendar.day_summary(date).await?;
                format!(
                    "{}: {} scheduled, {} completed, {} cancelled\n{}",
                    date,
                    summary.scheduled,
                    summary.completed,
                    summary.cancelled,
                    render_sessions(&sessions)
                )
            }
            Command::Upcoming => {
                let sessions = self
                    .calendar
                    .upcoming_sessions(self.clock.today(), UPCOMING_LIMIT)
                    .await?;
                render_sessions(&sessions)
            }
            Command::Complete(id) => {
                let session = self.calendar.complete_session(id).await?;
                format!("Session {} is {}", session.id, session.status)
            }
            Command::Cancel(id) => {
                let session = self.calendar.cancel_session(id).await?;
                format!("Session {} is {}", session.id, session.status)
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(("Bye".to_string(), Flow::Quit)),
        };

        Ok((output, Flow::Continue))
    }

    /// A 1-based position in the patient list, or a patient id.
    async fn resolve_patient(&self, target: &str) -> Result<Uuid, AppError> {
        if let Ok(id) = Uuid::parse_str(target) {
            return Ok(id);
        }

        let position: usize = target
            .parse()
            .map_err(|_| bad_request(format!("{:?} is neither a list number nor an id", target)))?;
        let patients = self.patients.list_patients().await?;

        position
            .checked_sub(1)
            .and_then(|index| patients.get(index))
            .map(|patient| patient.id)
            .ok_or_else(|| AppError::NotFound(format!("No patient number {}", position)))
    }

    pub async fn render_snapshot(&self) -> String {
        render_snapshot(&self.wizard.snapshot().await)
    }
}

// ==============================================================================
// RENDERING
// ==============================================================================

fn render_patients(patients: &[Patient]) -> String {
    if patients.is_empty() {
        return "No patients found".to_string();
    }

    patients
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{:>2}. [{}] {}  {}  {}",
                i + 1,
                p.initials(),
                p.name,
                p.mobile_number,
                p.email.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_doctors(doctors: &[Doctor]) -> String {
    if doctors.is_empty() {
        return "No doctors found".to_string();
    }

    doctors
        .iter()
        .map(|d| {
            format!(
                "{}  {}  {}  {}",
                d.name,
                d.expertise,
                d.session_modes_label(),
                d.fee_label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_sessions(sessions: &[ScheduledSession]) -> String {
    if sessions.is_empty() {
        return "No sessions".to_string();
    }

    sessions
        .iter()
        .map(|s| {
            format!(
                "{} {:>8}  {}  {}  {}  {}",
                s.date, s.time, s.patient_name, s.session_type, s.status, s.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_session_json(session: &ScheduledSession) -> Result<String, AppError> {
    serde_json::to_string_pretty(session).map_err(|e| AppError::Internal(e.to_string()))
}

pub fn render_snapshot(snapshot: &WizardSnapshot) -> String {
    let titles: Vec<String> = WizardStep::ALL
        .iter()
        .map(|step| {
            if *step == snapshot.step {
                format!("[{}]", step.title())
            } else {
                step.title().to_string()
            }
        })
        .collect();

    let draft = &snapshot.draft;
    let mut lines = vec![
        titles.join(" > "),
        format!(
            "  Patient: {}",
            draft.patient.as_ref().map(|p| p.name.as_str()).unwrap_or("-")
        ),
        format!(
            "  Date:    {}",
            draft.date.map(|d| d.format("%A, %B %-d, %Y").to_string()).unwrap_or_else(|| "-".to_string())
        ),
        format!("  Time:    {}", draft.time.as_deref().unwrap_or("-")),
        format!(
            "  Type:    {}",
            draft.session_type.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        format!("  Notes:   {}", draft.notes.as_deref().unwrap_or("-")),
    ];

    for error in &snapshot.errors {
        lines.push(format!("  ! {}", error));
    }

    match snapshot.submission {
        SubmissionStatus::Submitting => lines.push("  Submitting...".to_string()),
        SubmissionStatus::Failed => lines.push(format!(
            "  Last submission failed: {}",
            snapshot.last_failure.as_deref().unwrap_or("unknown error")
        )),
        SubmissionStatus::Idle | SubmissionStatus::Succeeded => {}
    }

    if snapshot.in_flight && snapshot.submission != SubmissionStatus::Submitting {
        lines.push("  Waiting for the previous submission to finish".to_string());
    }

    lines.join("\n")
}
