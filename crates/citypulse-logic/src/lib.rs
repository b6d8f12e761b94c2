//! Pure venue and traffic logic for CityPulse.
//!
//! This crate contains the dashboard logic that is independent of any map,
//! chart, or browser. Functions take plain data (a schedule string, a point
//! in the week, a random source) and return results, making them
//! unit-testable and usable from the headless feed or any future front end.
//!
//! # Pipeline
//!
//! ```text
//! raw opening hours ──parse──▶ rules ──is_open_at(sample)──▶ bool ──estimate──▶ density
//! ```
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Feed settings, JSON loading and validation |
//! | [`constants`] | Weekday codes, density heuristics, feed defaults |
//! | [`density`] | Simulated mall occupancy with injectable noise |
//! | [`error`] | Parse, clock and load errors |
//! | [`evaluator`] | Open/closed test with week-wraparound day ranges |
//! | [`feed`] | Periodic dashboard pipeline with rolling chart history |
//! | [`history`] | Bounded ring buffer of readings |
//! | [`schedule`] | Opening-hours string parser |
//! | [`traffic`] | Traffic station dataset and transport density |

pub mod config;
pub mod constants;
pub mod density;
pub mod error;
pub mod evaluator;
pub mod feed;
pub mod history;
pub mod schedule;
pub mod traffic;

pub use error::{BlockFault, ClockError, LoadError, ScheduleError};
pub use evaluator::{is_open_at, Sample};
pub use schedule::{parse, ParsePolicy, TimeWindowRule};
