use std::sync::OnceLock;

use regex::Regex;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

/// Exactly `len` ASCII digits, nothing else.
pub fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_phone_number(value: &str) -> bool {
    is_digits(value, 10)
}

pub fn is_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

/// Counts characters, not bytes.
pub fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// `None` for empty or whitespace-only input.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
