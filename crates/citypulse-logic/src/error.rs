//! Error types shared across the library.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single opening-hours block was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockFault {
    /// Block did not split into exactly a day token and a time token.
    #[error("expected a day range and a time range, found {0} token(s)")]
    TokenCount(usize),
    #[error("unknown day code `{0}`")]
    UnknownDay(String),
    #[error("malformed day range `{0}`")]
    DayRange(String),
    #[error("malformed time range `{0}`")]
    TimeRange(String),
    /// Not of the form `HH:MM`.
    #[error("malformed clock time `{0}`")]
    ClockTime(String),
    /// Parsed, but hour > 23 or minute > 59.
    #[error("clock time `{0}` is out of range")]
    ClockOutOfRange(String),
}

/// A rejected block, with its position in the raw string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("malformed schedule block #{index} `{block}`: {fault}")]
    MalformedBlock {
        index: usize,
        block: String,
        #[source]
        fault: BlockFault,
    },
}

impl ScheduleError {
    pub fn fault(&self) -> &BlockFault {
        match self {
            ScheduleError::MalformedBlock { fault, .. } => fault,
        }
    }
}

/// Clock input outside its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("weekday {0} is out of range (0-6)")]
    Weekday(u8),
    #[error("hour {0} is out of range (0-23)")]
    Hour(u8),
    #[error("minute of day {0} is out of range (0-1439)")]
    MinuteOfDay(u16),
}

/// Failure reading a JSON input (config or traffic dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
