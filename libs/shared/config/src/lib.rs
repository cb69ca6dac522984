use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_SUBMIT_DELAY_MS: u64 = 1500;
const DEFAULT_INTAKE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulated latency of the session store, in milliseconds.
    pub submit_delay_ms: u64,
    /// Simulated latency of patient intake, in milliseconds.
    pub intake_delay_ms: u64,
    /// Offset of the acting user's timezone. `None` means the host's local time.
    pub utc_offset_minutes: Option<i32>,
    /// Number of initial submissions the in-memory store rejects.
    pub fail_first_submissions: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            intake_delay_ms: DEFAULT_INTAKE_DELAY_MS,
            utc_offset_minutes: None,
            fail_first_submissions: 0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            submit_delay_ms: parse_var("SCHEDULER_SUBMIT_DELAY_MS")
                .unwrap_or(defaults.submit_delay_ms),
            intake_delay_ms: parse_var("SCHEDULER_INTAKE_DELAY_MS")
                .unwrap_or(defaults.intake_delay_ms),
            utc_offset_minutes: parse_var("SCHEDULER_UTC_OFFSET_MINUTES"),
            fail_first_submissions: parse_var("SCHEDULER_FAIL_FIRST_SUBMISSIONS")
                .unwrap_or(defaults.fail_first_submissions),
        };

        if config.utc_offset_minutes.is_some() && config.utc_offset().is_none() {
            warn!(
                "SCHEDULER_UTC_OFFSET_MINUTES out of range ({:?}), using local time",
                config.utc_offset_minutes
            );
        }

        config
    }

    /// Zero delays and no injected failures.
    pub fn for_tests() -> Self {
        Self {
            submit_delay_ms: 0,
            intake_delay_ms: 0,
            utc_offset_minutes: None,
            fail_first_submissions: 0,
        }
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn intake_delay(&self) -> Duration {
        Duration::from_millis(self.intake_delay_ms)
    }

    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.checked_mul(60)?))
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} has an invalid value ({:?}), using default", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulated_latencies() {
        let config = AppConfig::default();
        assert_eq!(config.submit_delay(), Duration::from_millis(1500));
        assert_eq!(config.intake_delay(), Duration::from_millis(1000));
        assert!(config.utc_offset().is_none());
    }

    #[test]
    fn test_utc_offset_conversion() {
        let config = AppConfig {
            utc_offset_minutes: Some(330),
            ..AppConfig::for_tests()
        };
        assert_eq!(config.utc_offset(), FixedOffset::east_opt(330 * 60));

        let out_of_range = AppConfig {
            utc_offset_minutes: Some(24 * 60),
            ..AppConfig::for_tests()
        };
        assert!(out_of_range.utc_offset().is_none());
    }
}
