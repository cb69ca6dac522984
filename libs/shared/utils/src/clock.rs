use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

use shared_config::AppConfig;

/// Source of "today" for date validation, in the acting user's timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    /// Uses the host's local timezone.
    pub fn local() -> Self {
        Self { offset: None }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset: Some(offset) }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            offset: config.utc_offset(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
            None => Local::now().date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_offset_shifts_calendar_day() {
        let east = SystemClock::with_offset(FixedOffset::east_opt(14 * 3600).unwrap());
        let west = SystemClock::with_offset(FixedOffset::west_opt(12 * 3600).unwrap());

        let diff = east.today() - west.today();
        assert!(diff >= Duration::days(1) && diff <= Duration::days(2));
    }
}
