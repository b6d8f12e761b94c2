//! Dashboard constants: weekday numbering, density heuristics, feed defaults.
//!
//! Plain numeric constants with no runtime dependency. The library, the
//! headless feed and the tests all read from here.

/// Weekday numbering, Sunday-first (matches `chrono`'s `num_days_from_sunday`).
pub mod weekdays {
    pub const SUNDAY: u8 = 0;
    pub const MONDAY: u8 = 1;
    pub const TUESDAY: u8 = 2;
    pub const WEDNESDAY: u8 = 3;
    pub const THURSDAY: u8 = 4;
    pub const FRIDAY: u8 = 5;
    pub const SATURDAY: u8 = 6;

    /// Highest valid weekday number.
    pub const LAST: u8 = SATURDAY;

    /// Two-letter codes accepted in opening-hours strings.
    pub const CODES: [(&str, u8); 7] = [
        ("Mo", MONDAY),
        ("Tu", TUESDAY),
        ("We", WEDNESDAY),
        ("Th", THURSDAY),
        ("Fr", FRIDAY),
        ("Sa", SATURDAY),
        ("Su", SUNDAY),
    ];

    /// Look up a two-letter day code. Case-sensitive.
    pub fn from_code(code: &str) -> Option<u8> {
        CODES.iter().find(|(c, _)| *c == code).map(|(_, d)| *d)
    }

    /// Two-letter code for a weekday number.
    pub fn code(day: u8) -> Option<&'static str> {
        CODES.iter().find(|(_, d)| *d == day).map(|(c, _)| *c)
    }

    pub fn is_weekend(day: u8) -> bool {
        day == SUNDAY || day == SATURDAY
    }
}

/// Clock domain limits.
pub mod clock {
    pub const MINUTES_PER_HOUR: u16 = 60;
    pub const MINUTES_PER_DAY: u16 = 24 * 60;
    pub const LAST_HOUR: u8 = 23;
    pub const LAST_MINUTE_OF_HOUR: u16 = 59;
    pub const LAST_MINUTE_OF_DAY: u16 = MINUTES_PER_DAY - 1;
}

/// Mall occupancy heuristics.
pub mod density {
    /// Starting occupancy before any adjustment.
    pub const BASE: f64 = 150.0;
    pub const WEEKEND_MULTIPLIER: f64 = 3.0;
    pub const COMMUTE_MULTIPLIER: f64 = 1.5;
    pub const PEAK_MULTIPLIER: f64 = 1.3;
    pub const OFF_PEAK_DIVISOR: f64 = 1.2;

    /// Weekday evening commute, inclusive.
    pub const COMMUTE_HOURS: (u8, u8) = (17, 21);
    pub const LUNCH_HOURS: (u8, u8) = (12, 14);
    pub const DINNER_HOURS: (u8, u8) = (18, 20);
    /// Hours before this are off-peak.
    pub const OFF_PEAK_BEFORE: u8 = 9;
    /// Hours after this are off-peak.
    pub const OFF_PEAK_AFTER: u8 = 21;

    /// Half-width of the uniform noise band.
    pub const NOISE_AMPLITUDE: f64 = 10.0;
}

/// Traffic panel defaults.
pub mod traffic {
    /// Noise half-width added to a station's hourly count.
    pub const NOISE_AMPLITUDE: f64 = 10.0;
    /// Upper bound (exclusive) of the placeholder value when no station is selected.
    pub const UNSELECTED_CEILING: f64 = 100.0;
    pub const HOURS_PER_DAY: u8 = 24;
}

/// Feed loop defaults.
pub mod feed {
    /// Fallback schedule used when a venue record has no opening hours.
    pub const DEFAULT_OPENING_HOURS: &str =
        "Mo-We 10:00-18:00; Th 10:00-21:00; Fr 10:00-23:00; Sa 10:00-18:00; Su 11:00-17:00";
    pub const TICK_INTERVAL_MS: u64 = 5_000;
    pub const HISTORY_LEN: usize = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_codes_cover_every_weekday_once() {
        let mut seen = [false; 7];
        for (_, day) in weekdays::CODES {
            assert!(!seen[day as usize], "duplicate day {day}");
            seen[day as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn code_lookup_round_trips() {
        assert_eq!(weekdays::from_code("Su"), Some(weekdays::SUNDAY));
        assert_eq!(weekdays::from_code("Fr"), Some(weekdays::FRIDAY));
        assert_eq!(weekdays::code(weekdays::MONDAY), Some("Mo"));
        assert_eq!(weekdays::from_code("mo"), None);
        assert_eq!(weekdays::from_code("Xx"), None);
        assert_eq!(weekdays::code(7), None);
    }

    #[test]
    fn weekend_is_saturday_and_sunday() {
        assert!(weekdays::is_weekend(weekdays::SATURDAY));
        assert!(weekdays::is_weekend(weekdays::SUNDAY));
        assert!(!weekdays::is_weekend(weekdays::FRIDAY));
        assert!(!weekdays::is_weekend(weekdays::MONDAY));
    }
}
