//! Bookable start times for a staff member on a date

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::models::WeeklySchedule;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Default step between two bookable start times
pub const DEFAULT_SLOT_MINUTES: u32 = 15;

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn time_of_minute(minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
}

/// Candidate start times inside a working window: every `step` minutes from
/// `start`, keeping only slots that end no later than `end`.
pub fn candidate_times(start: NaiveTime, end: NaiveTime, step_minutes: u32) -> Vec<NaiveTime> {
    if step_minutes == 0 || step_minutes > MINUTES_PER_DAY {
        return Vec::new();
    }
    let (start, end) = (minute_of_day(start), minute_of_day(end));
    (start..end)
        .step_by(step_minutes as usize)
        .take_while(|minute| minute + step_minutes <= end)
        .filter_map(time_of_minute)
        .collect()
}

/// Ordered, deduplicated start times still free on `date`.
///
/// An absent schedule or an inactive/absent weekday entry yields no times.
/// `occupied` and `blocked` are times already taken on that date.
pub fn available_times(
    schedule: Option<&WeeklySchedule>,
    date: NaiveDate,
    occupied: &[NaiveTime],
    blocked: &[NaiveTime],
    step_minutes: u32,
) -> Vec<NaiveTime> {
    let Some(window) = schedule.and_then(|s| s.window_for(date)) else {
        return Vec::new();
    };

    // Stored times may carry seconds; compare at minute precision
    let taken = |time: &NaiveTime| {
        let minute = minute_of_day(*time);
        occupied
            .iter()
            .chain(blocked.iter())
            .any(|t| minute_of_day(*t) == minute)
    };

    candidate_times(window.start, window.end, step_minutes)
        .into_iter()
        .filter(|time| !taken(time))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySchedule, Weekday};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn tuesday_schedule(start: NaiveTime, end: NaiveTime) -> WeeklySchedule {
        let mut schedule = WeeklySchedule::default();
        schedule.set(Weekday::Tue, Some(DaySchedule::new(true, start, end)));
        schedule
    }

    fn fmt(times: &[NaiveTime]) -> Vec<String> {
        times.iter().map(|t| t.format("%H:%M").to_string()).collect()
    }

    #[test]
    fn test_tuesday_morning_every_half_hour() {
        let schedule = tuesday_schedule(t(9, 0), t(11, 0));
        let times = available_times(Some(&schedule), tuesday(), &[], &[], 30);
        assert_eq!(fmt(&times), vec!["09:00", "09:30", "10:00", "10:30"]);
    }

    #[test]
    fn test_occupied_time_is_removed() {
        let schedule = tuesday_schedule(t(9, 0), t(11, 0));
        let times = available_times(Some(&schedule), tuesday(), &[t(9, 30)], &[], 30);
        assert_eq!(fmt(&times), vec!["09:00", "10:00", "10:30"]);
    }

    #[test]
    fn test_blocked_time_is_removed() {
        let schedule = tuesday_schedule(t(9, 0), t(11, 0));
        let times = available_times(Some(&schedule), tuesday(), &[t(9, 0)], &[t(10, 30)], 30);
        assert_eq!(fmt(&times), vec!["09:30", "10:00"]);
    }

    #[test]
    fn test_inactive_or_missing_day_is_empty() {
        let schedule = tuesday_schedule(t(9, 0), t(11, 0));
        let wednesday = tuesday().succ_opt().unwrap();
        assert!(available_times(Some(&schedule), wednesday, &[], &[], 15).is_empty());

        let mut inactive = schedule.clone();
        inactive.set(Weekday::Tue, Some(DaySchedule::new(false, t(9, 0), t(11, 0))));
        assert!(available_times(Some(&inactive), tuesday(), &[], &[], 15).is_empty());

        assert!(available_times(None, tuesday(), &[], &[], 15).is_empty());
    }

    #[test]
    fn test_candidate_count_matches_window() {
        for (start, end, step) in [
            (t(9, 0), t(17, 0), 15),
            (t(8, 30), t(12, 30), 30),
            (t(0, 0), t(23, 45), 15),
            (t(10, 0), t(10, 45), 15),
        ] {
            let expected = (minute_of_day(end) - minute_of_day(start)) / step;
            assert_eq!(candidate_times(start, end, step).len() as u32, expected);
        }
    }

    #[test]
    fn test_uneven_window_truncates() {
        // the 10:30 slot would end at 11:10
        let times = candidate_times(t(9, 0), t(11, 10), 30);
        assert_eq!(fmt(&times), vec!["09:00", "09:30", "10:00", "10:30"]);
        let times = candidate_times(t(9, 0), t(10, 50), 30);
        assert_eq!(fmt(&times), vec!["09:00", "09:30", "10:00"]);
    }

    #[test]
    fn test_last_time_before_end() {
        let times = candidate_times(t(9, 0), t(10, 0), DEFAULT_SLOT_MINUTES);
        assert_eq!(fmt(&times), vec!["09:00", "09:15", "09:30", "09:45"]);
        assert!(times.iter().all(|time| *time < t(10, 0)));
    }

    #[test]
    fn test_window_running_to_midnight_does_not_wrap() {
        let times = candidate_times(t(23, 0), t(23, 59), 15);
        assert_eq!(fmt(&times), vec!["23:00", "23:15", "23:30"]);
    }

    #[test]
    fn test_zero_step_yields_nothing() {
        assert!(candidate_times(t(9, 0), t(10, 0), 0).is_empty());
    }

    #[test]
    fn test_same_inputs_same_output() {
        let schedule = tuesday_schedule(t(9, 0), t(12, 0));
        let occupied = [t(10, 0), t(9, 15)];
        let first = available_times(Some(&schedule), tuesday(), &occupied, &[t(11, 0)], 15);
        let second = available_times(Some(&schedule), tuesday(), &occupied, &[t(11, 0)], 15);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
