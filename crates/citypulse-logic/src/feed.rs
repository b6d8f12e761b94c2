//! Dashboard feed: the periodic parse → evaluate → estimate pipeline.
//!
//! A [`DashboardFeed`] holds what the dashboard has selected (a venue's
//! opening hours and optionally a traffic station) and the rolling history
//! behind each chart. Each [`tick`](DashboardFeed::tick) re-parses the
//! schedule from scratch, evaluates it against the tick time, and appends
//! one reading per chart. The caller owns the timer.

use chrono::{DateTime, Local};
use rand::Rng;
use serde::Serialize;

use crate::config::FeedConfig;
use crate::density::{self, UniformNoise};
use crate::error::ScheduleResult;
use crate::evaluator::{self, Sample};
use crate::history::{Reading, RollingHistory};
use crate::schedule;
use crate::traffic::{self, TrafficStation};

/// What the mall chart shows for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MallStatus {
    pub is_open: bool,
    pub density: u32,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub time: DateTime<Local>,
    pub sample: Sample,
    pub mall: MallStatus,
    pub transport: f64,
    /// Blocks dropped while parsing this tick's schedule.
    pub rejected_blocks: usize,
}

#[derive(Debug, Clone)]
pub struct DashboardFeed<R> {
    config: FeedConfig,
    opening_hours: String,
    station: Option<TrafficStation>,
    rng: R,
    mall_history: RollingHistory<Reading>,
    transport_history: RollingHistory<Reading>,
}

impl<R: Rng> DashboardFeed<R> {
    pub fn new(config: FeedConfig, rng: R) -> Self {
        Self {
            opening_hours: config.default_opening_hours.clone(),
            station: None,
            rng,
            mall_history: RollingHistory::new(config.history_len),
            transport_history: RollingHistory::new(config.history_len),
            config,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn opening_hours(&self) -> &str {
        &self.opening_hours
    }

    pub fn station(&self) -> Option<&TrafficStation> {
        self.station.as_ref()
    }

    pub fn mall_history(&self) -> &RollingHistory<Reading> {
        &self.mall_history
    }

    pub fn transport_history(&self) -> &RollingHistory<Reading> {
        &self.transport_history
    }

    /// Select a venue's opening hours. A missing or blank string keeps the
    /// current selection.
    pub fn select_opening_hours(&mut self, raw: Option<&str>) {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(hours) => {
                log::info!("Opening hours selected: {}", hours);
                self.opening_hours = hours.to_string();
            }
            None => log::debug!("No opening hours supplied, keeping `{}`", self.opening_hours),
        }
    }

    pub fn select_station(&mut self, station: Option<TrafficStation>) {
        match &station {
            Some(s) => log::info!("Traffic station selected: {} ({})", s.display_name(), s.station_id),
            None => log::info!("Traffic station cleared"),
        }
        self.station = station;
    }

    /// Evaluate the current selection at `now` without touching the history.
    pub fn mall_status(&mut self, now: &DateTime<Local>) -> ScheduleResult<(MallStatus, usize)> {
        let parsed = schedule::parse_with(&self.opening_hours, self.config.parse_policy)?;
        let sample = Sample::from_datetime(now);
        let is_open = evaluator::is_open_at(&parsed.rules, sample);

        let mut noise = UniformNoise::new(&mut self.rng);
        // Sample fields are always in range
        let density = density::estimate(is_open, sample.hour(), sample.weekday(), &mut noise)
            .unwrap_or_default();

        log::debug!(
            "{} rules, sample {:?}: open={} density={}",
            parsed.rules.len(),
            sample,
            is_open,
            density
        );
        Ok((MallStatus { is_open, density }, parsed.rejected.len()))
    }

    /// Run one tick at `now` and append both readings.
    ///
    /// Under [`ParsePolicy::FailFast`](crate::schedule::ParsePolicy::FailFast)
    /// a malformed schedule is returned as an error and nothing is appended.
    pub fn tick(&mut self, now: DateTime<Local>) -> ScheduleResult<TickReport> {
        let (mall, rejected_blocks) = self.mall_status(&now)?;
        let sample = Sample::from_datetime(&now);
        let transport = traffic::transport_density(self.station.as_ref(), sample.hour(), &mut self.rng)
            .unwrap_or_default();

        self.mall_history.push(Reading {
            time: now,
            value: mall.density as f64,
        });
        self.transport_history.push(Reading {
            time: now,
            value: transport,
        });

        Ok(TickReport {
            time: now,
            sample,
            mall,
            transport,
            rejected_blocks,
        })
    }

    /// Tick at the system's local time.
    pub fn tick_now(&mut self) -> ScheduleResult<TickReport> {
        self.tick(Local::now())
    }
}
