//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use uuid::Uuid;

/// Generate a new UUID v4
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Format a timestamp as an absolute date
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// Format a timestamp relative to `now` ("just now", "5 minutes ago", ...)
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);

    if diff < Duration::minutes(1) {
        "just now".to_string()
    } else if diff < Duration::hours(1) {
        plural(diff.num_minutes(), "minute")
    } else if diff < Duration::days(1) {
        plural(diff.num_hours(), "hour")
    } else if diff < Duration::weeks(1) {
        plural(diff.num_days(), "day")
    } else {
        format_date(timestamp)
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("valid phone regex"))
}

fn pincode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4,10}$").expect("valid pincode regex"))
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validate phone number format. Spaces and dashes are ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(&normalize_phone(phone))
}

/// Validate postal code format
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode_regex().is_match(pincode.trim())
}

/// Strip formatting characters from a phone number
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !matches!(c, ' ' | '-' | '(' | ')')).collect()
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trim an optional string and drop it when empty
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Clamp a client supplied page size
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_time() {
        let now = now();
        assert_eq!(format_relative_time(now - Duration::seconds(20), now), "just now");
        assert_eq!(format_relative_time(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_relative_time(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(format_relative_time(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(format_relative_time(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(format_relative_time(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_relative_time(now - Duration::days(10), now), "2024-06-05");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let now = now();
        assert_eq!(format_relative_time(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("donor@example.com"));
        assert!(is_valid_email("first.last+tag@mail.co.in"));
        assert!(!is_valid_email("donor@example"));
        assert!(!is_valid_email("not an email"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 98765-43210"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("98765abcde"));
        assert_eq!(normalize_phone("+91 98765-43210"), "+919876543210");
    }

    #[test]
    fn test_pincode_validation() {
        assert!(is_valid_pincode("560001"));
        assert!(!is_valid_pincode("56A001"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 50, 200), 50);
        assert_eq!(clamp_limit(Some(0), 50, 200), 1);
        assert_eq!(clamp_limit(Some(1000), 50, 200), 200);
    }
}
