//! Staff working-hours template and blocked-slot exceptions

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{hhmm, parse_date, parse_time};
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Weekday codes used as keys of the weekly template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Sun => Weekday::Sun,
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sun => "sun",
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WeeklySchedule
// ---------------------------------------------------------------------------

/// Working window for one weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DaySchedule {
    pub active: bool,
    /// Start of the working window (HH:MM)
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "09:00")]
    pub start: NaiveTime,
    /// End of the working window, exclusive (HH:MM)
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "18:00")]
    pub end: NaiveTime,
}

impl DaySchedule {
    pub fn new(active: bool, start: NaiveTime, end: NaiveTime) -> Self {
        Self { active, start, end }
    }
}

/// Recurring weekly availability of a staff member.
///
/// A missing entry behaves exactly like an inactive one. Unknown keys are
/// rejected so a misspelled weekday cannot wipe the template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct WeeklySchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mon: Option<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tue: Option<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wed: Option<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thu: Option<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fri: Option<DaySchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<DaySchedule>,
}

impl WeeklySchedule {
    /// Template given to every new staff profile: all days present but inactive
    pub fn inactive_template() -> Self {
        let day = DaySchedule::new(
            false,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
        );
        let mut schedule = Self::default();
        for weekday in Weekday::ALL {
            schedule.set(weekday, Some(day));
        }
        schedule
    }

    pub fn get(&self, weekday: Weekday) -> Option<&DaySchedule> {
        match weekday {
            Weekday::Sun => self.sun.as_ref(),
            Weekday::Mon => self.mon.as_ref(),
            Weekday::Tue => self.tue.as_ref(),
            Weekday::Wed => self.wed.as_ref(),
            Weekday::Thu => self.thu.as_ref(),
            Weekday::Fri => self.fri.as_ref(),
            Weekday::Sat => self.sat.as_ref(),
        }
    }

    pub fn set(&mut self, weekday: Weekday, day: Option<DaySchedule>) {
        let slot = match weekday {
            Weekday::Sun => &mut self.sun,
            Weekday::Mon => &mut self.mon,
            Weekday::Tue => &mut self.tue,
            Weekday::Wed => &mut self.wed,
            Weekday::Thu => &mut self.thu,
            Weekday::Fri => &mut self.fri,
            Weekday::Sat => &mut self.sat,
        };
        *slot = day;
    }

    /// Active working window for a date, if the staff member works that day
    pub fn window_for(&self, date: NaiveDate) -> Option<&DaySchedule> {
        self.get(Weekday::of(date)).filter(|day| day.active)
    }

    /// Every active entry must have `start < end`
    pub fn validate(&self) -> AppResult<()> {
        for weekday in Weekday::ALL {
            if let Some(day) = self.get(weekday) {
                if day.active && day.start >= day.end {
                    return Err(AppError::Validation(format!(
                        "Invalid working hours for {}: start {} must be before end {}",
                        weekday,
                        day.start.format("%H:%M"),
                        day.end.format("%H:%M"),
                    )));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BlockedSlot
// ---------------------------------------------------------------------------

/// A one-off date/time removed from a staff member's availability
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub struct BlockedSlot {
    #[schema(value_type = String, example = "2025-03-04")]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[schema(value_type = String, example = "14:30")]
    pub time: NaiveTime,
}

/// Raw blocked-slot entry as submitted by clients
#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockedSlotInput {
    /// Date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Time (HH:MM)
    pub time: Option<String>,
}

/// Full replacement set of blocked slots
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceBlockedSlots {
    pub slots: Vec<BlockedSlotInput>,
}

impl ReplaceBlockedSlots {
    /// Parse every entry; the result is sorted and free of duplicates
    pub fn parse(&self) -> AppResult<Vec<BlockedSlot>> {
        let mut parsed = Vec::with_capacity(self.slots.len());
        for (index, entry) in self.slots.iter().enumerate() {
            let date = entry
                .date
                .as_deref()
                .and_then(parse_date)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "Blocked slot {}: invalid date (use YYYY-MM-DD)",
                        index
                    ))
                })?;
            let time = entry
                .time
                .as_deref()
                .and_then(parse_time)
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "Blocked slot {}: invalid time (use HH:MM)",
                        index
                    ))
                })?;
            parsed.push(BlockedSlot { date, time });
        }
        parsed.sort();
        parsed.dedup();
        Ok(parsed)
    }
}
