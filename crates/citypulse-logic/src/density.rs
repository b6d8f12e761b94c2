//! Simulated mall occupancy from time-of-day heuristics plus noise.
//!
//! The value is a stand-in for real crowding data, not a measurement. It
//! starts from a fixed base and is adjusted in this order:
//!
//! 1. weekend: ×3
//! 2. weekday evening commute (17–21h): ×1.5
//! 3. lunch (12–14h) ×1.3, else dinner (18–20h) ×1.3, else off-peak (<9h or >21h) ÷1.2
//! 4. add noise from a [`NoiseSource`]
//! 5. floor, clamp at zero
//!
//! ```
//! use citypulse_logic::density::{DensityEstimator, FixedNoise};
//!
//! let mut estimator = DensityEstimator::new(FixedNoise(0.0));
//! assert_eq!(estimator.estimate(true, 13, 1).unwrap(), 195);
//! assert_eq!(estimator.estimate(false, 13, 1).unwrap(), 0);
//! ```

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::constants::{clock, density, weekdays};
use crate::error::ClockError;
use crate::evaluator::Sample;

/// Source of the additive noise term.
pub trait NoiseSource {
    fn next_noise(&mut self) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn next_noise(&mut self) -> f64 {
        (**self).next_noise()
    }
}

/// Uniform noise over `[-amplitude, amplitude)`.
#[derive(Debug, Clone)]
pub struct UniformNoise<R> {
    rng: R,
    amplitude: f64,
}

impl<R: Rng> UniformNoise<R> {
    pub fn new(rng: R) -> Self {
        Self::with_amplitude(rng, density::NOISE_AMPLITUDE)
    }

    pub fn with_amplitude(rng: R, amplitude: f64) -> Self {
        Self {
            rng,
            amplitude: amplitude.abs(),
        }
    }
}

impl UniformNoise<ThreadRng> {
    /// Production default, backed by the thread-local generator.
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> NoiseSource for UniformNoise<R> {
    fn next_noise(&mut self) -> f64 {
        if self.amplitude == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.amplitude..self.amplitude)
    }
}

/// Constant noise, for deterministic tests and sweeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn next_noise(&mut self) -> f64 {
        self.0
    }
}

fn check_clock(hour: u8, weekday: u8) -> Result<(), ClockError> {
    if hour > clock::LAST_HOUR {
        return Err(ClockError::Hour(hour));
    }
    if weekday > weekdays::LAST {
        return Err(ClockError::Weekday(weekday));
    }
    Ok(())
}

fn within(hour: u8, (start, end): (u8, u8)) -> bool {
    (start..=end).contains(&hour)
}

/// Steps 1–3: the deterministic part of the estimate for an open venue.
pub fn base_density(hour: u8, weekday: u8) -> Result<f64, ClockError> {
    check_clock(hour, weekday)?;

    let mut value = density::BASE;
    let weekend = weekdays::is_weekend(weekday);

    if weekend {
        value *= density::WEEKEND_MULTIPLIER;
    }
    if !weekend && within(hour, density::COMMUTE_HOURS) {
        value *= density::COMMUTE_MULTIPLIER;
    }

    if within(hour, density::LUNCH_HOURS) {
        value *= density::PEAK_MULTIPLIER;
    } else if within(hour, density::DINNER_HOURS) {
        value *= density::PEAK_MULTIPLIER;
    } else if hour < density::OFF_PEAK_BEFORE || hour > density::OFF_PEAK_AFTER {
        value /= density::OFF_PEAK_DIVISOR;
    }

    Ok(value)
}

/// Base density plus one noise draw, before flooring. Zero when closed.
pub fn noisy_density(
    is_open: bool,
    hour: u8,
    weekday: u8,
    noise: &mut impl NoiseSource,
) -> Result<f64, ClockError> {
    let base = base_density(hour, weekday)?;
    if !is_open {
        return Ok(0.0);
    }
    Ok(base + noise.next_noise())
}

/// Full estimate: floored and clamped to zero.
pub fn estimate(
    is_open: bool,
    hour: u8,
    weekday: u8,
    noise: &mut impl NoiseSource,
) -> Result<u32, ClockError> {
    let value = noisy_density(is_open, hour, weekday, noise)?;
    Ok(value.floor().max(0.0) as u32)
}

/// Estimator that owns its noise source.
#[derive(Debug, Clone)]
pub struct DensityEstimator<N> {
    noise: N,
}

impl<N: NoiseSource> DensityEstimator<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    pub fn estimate(&mut self, is_open: bool, hour: u8, weekday: u8) -> Result<u32, ClockError> {
        estimate(is_open, hour, weekday, &mut self.noise)
    }

    /// Estimate for the hour and weekday of `sample`.
    pub fn estimate_at(&mut self, is_open: bool, sample: Sample) -> u32 {
        // Sample fields are validated at construction
        self.estimate(is_open, sample.hour(), sample.weekday())
            .unwrap_or_default()
    }
}

impl Default for DensityEstimator<UniformNoise<ThreadRng>> {
    fn default() -> Self {
        Self::new(UniformNoise::thread_local())
    }
}
