//! Opening-hours parsing: raw venue strings into time-window rules.
//!
//! A schedule is a `;`-separated list of blocks, each holding a day range
//! and a time range:
//!
//! ```text
//! Mo-We 10:00-18:00; Th 10:00-21:00; Su 11:00-17:00
//! ```
//!
//! Days use two-letter codes (`Mo`..`Su`, Sunday = 0). A day range whose end
//! precedes its start (`Sa-Mo`) wraps across the week boundary. Times are
//! 24-hour `HH:MM` and both ends are inclusive.
//!
//! ```
//! use citypulse_logic::schedule::parse;
//!
//! let rules = parse("Mo-We 10:00-18:00; Th 10:00-21:00").unwrap();
//! assert_eq!(rules.len(), 2);
//! assert_eq!(rules[0].start_minute(), 600);
//! assert_eq!(rules[1].to_string(), "Th 10:00-21:00");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{clock, weekdays};
use crate::error::{BlockFault, ClockError, ScheduleError, ScheduleResult};

/// One parsed block: an inclusive day span and an inclusive minute span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindowRule {
    start_day: u8,
    end_day: u8,
    start_minute: u16,
    end_minute: u16,
}

impl TimeWindowRule {
    /// Build a rule from already-numeric fields, validating their domains.
    pub fn new(
        start_day: u8,
        end_day: u8,
        start_minute: u16,
        end_minute: u16,
    ) -> Result<Self, ClockError> {
        for day in [start_day, end_day] {
            if day > weekdays::LAST {
                return Err(ClockError::Weekday(day));
            }
        }
        for minute in [start_minute, end_minute] {
            if minute > clock::LAST_MINUTE_OF_DAY {
                return Err(ClockError::MinuteOfDay(minute));
            }
        }
        Ok(Self {
            start_day,
            end_day,
            start_minute,
            end_minute,
        })
    }

    pub fn start_day(&self) -> u8 {
        self.start_day
    }

    pub fn end_day(&self) -> u8 {
        self.end_day
    }

    pub fn start_minute(&self) -> u16 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u16 {
        self.end_minute
    }

    /// Day span runs past Saturday into the next week (`Sa-Mo`).
    pub fn wraps_week(&self) -> bool {
        self.start_day > self.end_day
    }

    /// Time span runs past midnight (`22:00-02:00`). Such rules never match.
    pub fn crosses_midnight(&self) -> bool {
        self.start_minute > self.end_minute
    }
}

impl fmt::Display for TimeWindowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = weekdays::code(self.start_day).unwrap_or("??");
        if self.start_day == self.end_day {
            write!(f, "{start}")?;
        } else {
            let end = weekdays::code(self.end_day).unwrap_or("??");
            write!(f, "{start}-{end}")?;
        }
        write!(
            f,
            " {:02}:{:02}-{:02}:{:02}",
            self.start_minute / clock::MINUTES_PER_HOUR,
            self.start_minute % clock::MINUTES_PER_HOUR,
            self.end_minute / clock::MINUTES_PER_HOUR,
            self.end_minute % clock::MINUTES_PER_HOUR,
        )
    }
}

/// What to do with a block that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Abort on the first malformed block.
    #[default]
    FailFast,
    /// Drop malformed blocks, keep the rest.
    SkipInvalid,
}

/// Result of a policy-driven parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSchedule {
    pub rules: Vec<TimeWindowRule>,
    /// Blocks dropped under [`ParsePolicy::SkipInvalid`].
    pub rejected: Vec<ScheduleError>,
}

impl ParsedSchedule {
    /// No rule survived; the venue is never open.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse a raw schedule, failing on the first malformed block.
///
/// Blank blocks (a trailing `;`, or an empty string) are ignored, so `""`
/// yields no rules.
pub fn parse(raw: &str) -> ScheduleResult<Vec<TimeWindowRule>> {
    parse_blocks(raw).into_iter().collect()
}

/// Parse a raw schedule under the given policy.
pub fn parse_with(raw: &str, policy: ParsePolicy) -> ScheduleResult<ParsedSchedule> {
    let mut parsed = ParsedSchedule::default();
    for result in parse_blocks(raw) {
        match result {
            Ok(rule) => parsed.rules.push(rule),
            Err(e) if policy == ParsePolicy::SkipInvalid => {
                log::warn!("Skipping {}", e);
                parsed.rejected.push(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(parsed)
}

/// Per-block tagged results, in input order. Blank blocks are omitted.
pub fn parse_blocks(raw: &str) -> Vec<ScheduleResult<TimeWindowRule>> {
    raw.split(';')
        .enumerate()
        .map(|(index, block)| (index, block.trim()))
        .filter(|(_, block)| !block.is_empty())
        .map(|(index, block)| {
            parse_block(block).map_err(|fault| ScheduleError::MalformedBlock {
                index,
                block: block.to_string(),
                fault,
            })
        })
        .inspect(|result| {
            if let Ok(rule) = result {
                if rule.crosses_midnight() {
                    log::warn!("Rule `{}` crosses midnight and will never match", rule);
                }
            }
        })
        .collect()
}

/// Parse one trimmed block, e.g. `Mo-We 10:00-18:00`.
pub fn parse_block(block: &str) -> Result<TimeWindowRule, BlockFault> {
    let tokens: Vec<&str> = block.split_whitespace().collect();
    let [days, times] = tokens[..] else {
        return Err(BlockFault::TokenCount(tokens.len()));
    };

    let (start_day, end_day) = parse_day_range(days)?;
    let (start_minute, end_minute) = parse_time_range(times)?;

    Ok(TimeWindowRule {
        start_day,
        end_day,
        start_minute,
        end_minute,
    })
}

fn parse_day_range(token: &str) -> Result<(u8, u8), BlockFault> {
    let parts: Vec<&str> = token.split('-').collect();
    match parts[..] {
        [single] => {
            let day = day_code(single)?;
            Ok((day, day))
        }
        [start, end] if !start.is_empty() && !end.is_empty() => {
            Ok((day_code(start)?, day_code(end)?))
        }
        _ => Err(BlockFault::DayRange(token.to_string())),
    }
}

fn day_code(code: &str) -> Result<u8, BlockFault> {
    weekdays::from_code(code).ok_or_else(|| BlockFault::UnknownDay(code.to_string()))
}

fn parse_time_range(token: &str) -> Result<(u16, u16), BlockFault> {
    let parts: Vec<&str> = token.split('-').collect();
    let [start, end] = parts[..] else {
        return Err(BlockFault::TimeRange(token.to_string()));
    };
    Ok((parse_clock(start)?, parse_clock(end)?))
}

/// `HH:MM` (one or two digits each) to minutes since midnight.
fn parse_clock(text: &str) -> Result<u16, BlockFault> {
    let malformed = || BlockFault::ClockTime(text.to_string());

    let (hour, minute) = text.split_once(':').ok_or_else(malformed)?;
    let hour = clock_field(hour).ok_or_else(malformed)?;
    let minute = clock_field(minute).ok_or_else(malformed)?;

    if hour > clock::LAST_HOUR as u16 || minute > clock::LAST_MINUTE_OF_HOUR {
        return Err(BlockFault::ClockOutOfRange(text.to_string()));
    }
    Ok(hour * clock::MINUTES_PER_HOUR + minute)
}

fn clock_field(field: &str) -> Option<u16> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
