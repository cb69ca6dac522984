pub mod clock;
pub mod test_utils;
pub mod validation;

pub use clock::{Clock, SystemClock};
