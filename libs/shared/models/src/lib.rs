pub mod directory;
pub mod error;
pub mod session_type;

pub use directory::{filter, Searchable};
pub use error::AppError;
pub use session_type::{SessionType, UnknownSessionType};
