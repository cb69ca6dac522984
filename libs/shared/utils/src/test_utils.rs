use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use shared_config::AppConfig;

use crate::clock::Clock;

/// Clock pinned to a given day. `advance_days` moves it forward.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self::new(date(year, month, day))
    }

    pub fn advance_days(&self, days: i64) {
        if let Ok(mut today) = self.today.lock() {
            *today += Duration::days(days);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let today = self.today();
        Utc.from_utc_datetime(&today.and_hms_opt(8, 0, 0).expect("08:00 is a valid time"))
    }

    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(today) => *today,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Panics on an invalid date; fixtures only.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| {
        panic!("invalid fixture date {}-{}-{}", year, month, day)
    })
}

pub fn test_config() -> AppConfig {
    AppConfig::for_tests()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::on(2024, 12, 31);
        clock.advance_days(1);
        assert_eq!(clock.today(), date(2025, 1, 1));
        assert_eq!(clock.now().date_naive(), date(2025, 1, 1));
    }
}
