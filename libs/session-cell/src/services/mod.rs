pub mod calendar;
pub mod lifecycle;
pub mod store;
pub mod validation;
pub mod wizard;

pub use calendar::CalendarService;
pub use lifecycle::SessionLifecycleService;
pub use store::{InMemorySessionStore, SessionStore, StatusUpdate};
pub use validation::{validate_draft, ValidatedDraft};
pub use wizard::SessionWizard;
