//! Data models for Agenda

pub mod appointment;
pub mod company;
pub mod schedule;
pub mod staff;
pub mod user;

use chrono::{NaiveDate, NaiveTime};

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentSnapshot, AppointmentStatus};
pub use company::{Company, Service, SubscriptionStatus};
pub use schedule::{BlockedSlot, DaySchedule, WeeklySchedule, Weekday};
pub use staff::StaffMember;
pub use user::{Actor, Role, UserClaims};

/// Parse a wire date (YYYY-MM-DD)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse a wire time (HH:MM, seconds tolerated)
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Serde adapter rendering `NaiveTime` as "HH:MM"
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time '{}', expected HH:MM", raw)))
    }
}
