use thiserror::Error;

/// Application-level error surfaced to the presentation layer.
///
/// Each cell keeps its own error enum and converts into this one at the edge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the message is meant for the end user rather than a contract
    /// violation by the caller.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, AppError::Internal(_))
    }

    /// Logs the error and returns the line to show to the user.
    pub fn report(&self) -> String {
        match self {
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Persistence(msg) => tracing::error!("Persistence error: {}", msg),
            other => tracing::warn!("{}", other),
        }

        if self.is_user_facing() {
            self.to_string()
        } else {
            "Something went wrong, please try again".to_string()
        }
    }
}
