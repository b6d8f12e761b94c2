//! Open/closed evaluation of parsed rules at a point in the week.
//!
//! Evaluation is pure: the caller supplies the [`Sample`] explicitly, so the
//! same `(rules, sample)` pair always gives the same answer. Use
//! [`Sample::now`] at the edge of the program to read the system clock.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use serde::Serialize;

use crate::constants::{clock, weekdays};
use crate::error::{ClockError, ScheduleResult};
use crate::schedule::{self, TimeWindowRule};

/// A point in the week: weekday (Sunday = 0) and minute since local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Sample {
    weekday: u8,
    minute_of_day: u16,
}

impl Sample {
    pub fn new(weekday: u8, minute_of_day: u16) -> Result<Self, ClockError> {
        if weekday > weekdays::LAST {
            return Err(ClockError::Weekday(weekday));
        }
        if minute_of_day > clock::LAST_MINUTE_OF_DAY {
            return Err(ClockError::MinuteOfDay(minute_of_day));
        }
        Ok(Self {
            weekday,
            minute_of_day,
        })
    }

    /// Build from a weekday and a wall-clock `hour:minute`.
    pub fn at(weekday: u8, hour: u8, minute: u8) -> Result<Self, ClockError> {
        if hour > clock::LAST_HOUR {
            return Err(ClockError::Hour(hour));
        }
        if minute as u16 > clock::LAST_MINUTE_OF_HOUR {
            return Err(ClockError::MinuteOfDay(
                hour as u16 * clock::MINUTES_PER_HOUR + minute as u16,
            ));
        }
        Self::new(
            weekday,
            hour as u16 * clock::MINUTES_PER_HOUR + minute as u16,
        )
    }

    /// Weekday and minute of `time` in its own timezone.
    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self {
            weekday: time.weekday().num_days_from_sunday() as u8,
            minute_of_day: (time.hour() * 60 + time.minute()) as u16,
        }
    }

    /// Read the system's local clock.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    pub fn minute_of_day(&self) -> u16 {
        self.minute_of_day
    }

    pub fn hour(&self) -> u8 {
        (self.minute_of_day / clock::MINUTES_PER_HOUR) as u8
    }
}

impl TimeWindowRule {
    /// Weekday lies in the rule's day span, wrapping past Saturday if needed.
    pub fn covers_day(&self, weekday: u8) -> bool {
        let (start, end) = (self.start_day(), self.end_day());
        if start <= end {
            (start..=end).contains(&weekday)
        } else {
            // Wraps the week boundary, e.g. Sa-Mo
            weekday >= start || weekday <= end
        }
    }

    /// Minute lies in the rule's time span. Inclusive on both ends; a span
    /// crossing midnight never matches.
    pub fn covers_minute(&self, minute_of_day: u16) -> bool {
        (self.start_minute()..=self.end_minute()).contains(&minute_of_day)
    }

    pub fn contains(&self, sample: Sample) -> bool {
        self.covers_day(sample.weekday) && self.covers_minute(sample.minute_of_day)
    }
}

/// First rule (in input order) that contains the sample.
pub fn first_match(rules: &[TimeWindowRule], sample: Sample) -> Option<&TimeWindowRule> {
    rules.iter().find(|rule| rule.contains(sample))
}

/// Whether any rule contains the sample. An empty rule set is never open.
pub fn is_open_at(rules: &[TimeWindowRule], sample: Sample) -> bool {
    first_match(rules, sample).is_some()
}

/// Parse `raw` (failing on the first malformed block) and evaluate it.
pub fn is_open(raw: &str, sample: Sample) -> ScheduleResult<bool> {
    let rules = schedule::parse(raw)?;
    Ok(is_open_at(&rules, sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::weekdays::*;
    use crate::schedule::parse;
    use chrono::{FixedOffset, NaiveDate};

    fn rule(start_day: u8, end_day: u8, start_minute: u16, end_minute: u16) -> TimeWindowRule {
        TimeWindowRule::new(start_day, end_day, start_minute, end_minute).unwrap()
    }

    fn sample(weekday: u8, minute: u16) -> Sample {
        Sample::new(weekday, minute).unwrap()
    }

    #[test]
    fn test_weekday_range() {
        let r = rule(MONDAY, WEDNESDAY, 600, 1080);
        for day in 0..=6 {
            let expected = (MONDAY..=WEDNESDAY).contains(&day);
            assert_eq!(r.covers_day(day), expected, "day {day}");
        }
    }

    #[test]
    fn test_wraparound_sa_mo() {
        let r = rule(SATURDAY, MONDAY, 0, 1439);
        let open: Vec<u8> = (0..=6).filter(|d| r.covers_day(*d)).collect();
        assert_eq!(open, vec![SUNDAY, MONDAY, SATURDAY]);
    }

    #[test]
    fn test_wraparound_fr_su() {
        let r = rule(FRIDAY, SUNDAY, 1080, 1439);
        assert!(r.contains(sample(FRIDAY, 1200)));
        assert!(r.contains(sample(SATURDAY, 1200)));
        assert!(r.contains(sample(SUNDAY, 1200)));
        assert!(!r.contains(sample(MONDAY, 1200)));
        assert!(!r.contains(sample(THURSDAY, 1200)));
    }

    #[test]
    fn test_time_bounds_inclusive() {
        let r = rule(TUESDAY, TUESDAY, 600, 1080);
        assert!(r.contains(sample(TUESDAY, 600)));
        assert!(r.contains(sample(TUESDAY, 1080)));
        assert!(!r.contains(sample(TUESDAY, 599)));
        assert!(!r.contains(sample(TUESDAY, 1081)));
    }

    #[test]
    fn test_midnight_crossing_never_matches() {
        let r = rule(FRIDAY, FRIDAY, 1320, 120);
        for minute in [0, 60, 120, 1320, 1400, 1439] {
            assert!(!r.contains(sample(FRIDAY, minute)), "minute {minute}");
        }
    }

    #[test]
    fn test_scenario_mo_we_th() {
        let rules = parse("Mo-We 10:00-18:00; Th 10:00-21:00").unwrap();
        assert!(is_open_at(&rules, sample(TUESDAY, 600)));
        assert!(!is_open_at(&rules, sample(TUESDAY, 1081)));
        assert!(is_open_at(&rules, sample(THURSDAY, 1260)));
        assert!(!is_open_at(&rules, sample(FRIDAY, 700)));
    }

    #[test]
    fn test_empty_rules_never_open() {
        for day in 0..=6 {
            assert!(!is_open_at(&[], sample(day, 720)));
        }
    }

    #[test]
    fn test_first_match_in_input_order() {
        let rules = vec![rule(MONDAY, FRIDAY, 600, 1080), rule(MONDAY, MONDAY, 0, 1439)];
        assert_eq!(first_match(&rules, sample(MONDAY, 700)), Some(&rules[0]));
        assert_eq!(first_match(&rules, sample(MONDAY, 100)), Some(&rules[1]));
        assert_eq!(first_match(&rules, sample(SUNDAY, 700)), None);
    }

    #[test]
    fn test_is_open_propagates_parse_error() {
        let s = sample(MONDAY, 700);
        assert!(is_open("Mo 10:00", s).is_err());
        assert_eq!(is_open("Mo 10:00-18:00", s), Ok(true));
        assert_eq!(is_open("", s), Ok(false));
    }

    #[test]
    fn test_sample_validation() {
        assert_eq!(Sample::new(7, 0), Err(ClockError::Weekday(7)));
        assert_eq!(Sample::new(0, 1440), Err(ClockError::MinuteOfDay(1440)));
        assert_eq!(Sample::at(1, 24, 0), Err(ClockError::Hour(24)));
        assert!(Sample::at(1, 10, 60).is_err());
        assert_eq!(Sample::at(2, 18, 1), Ok(sample(2, 1081)));
    }

    #[test]
    fn test_sample_from_datetime() {
        // 2024-03-05 was a Tuesday
        let tz = FixedOffset::east_opt(10 * 3600).unwrap();
        let time = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(18, 1, 30)
            .unwrap()
            .and_local_timezone(tz)
            .unwrap();
        let s = Sample::from_datetime(&time);
        assert_eq!(s.weekday(), TUESDAY);
        assert_eq!(s.minute_of_day(), 1081);
        assert_eq!(s.hour(), 18);
    }

    #[test]
    fn test_sample_now_in_range() {
        let s = Sample::now();
        assert!(s.weekday() <= 6);
        assert!(s.minute_of_day() <= 1439);
    }
}
