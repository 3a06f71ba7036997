//! Random vital-sign generation

use crate::telemetry::TelemetryReading;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Mutex;

/// Value ranges of one reading family
#[derive(Debug, Clone, PartialEq)]
pub struct VitalRanges {
    /// Whole beats per minute
    pub heart_rate: RangeInclusive<u32>,
    pub oxygen_level: RangeInclusive<f64>,
    pub temperature: RangeInclusive<f64>,
}

impl VitalRanges {
    /// Nominal crew vitals
    pub fn healthy() -> Self {
        Self {
            heart_rate: 65..=85,
            oxygen_level: 98.0..=99.9,
            temperature: 36.5..=37.2,
        }
    }

    /// Vitals during an injected fault: tachycardia, hypoxia, fever
    pub fn anomalous() -> Self {
        Self {
            heart_rate: 120..=160,
            oxygen_level: 70.0..=90.0,
            temperature: 38.0..=39.5,
        }
    }

    /// Whether every field of `reading` falls inside these ranges
    pub fn contains(&self, reading: &TelemetryReading) -> bool {
        let heart_rate = reading.heart_rate;
        heart_rate.fract() == 0.0
            && heart_rate >= f64::from(*self.heart_rate.start())
            && heart_rate <= f64::from(*self.heart_rate.end())
            && self.oxygen_level.contains(&reading.oxygen_level)
            && self.temperature.contains(&reading.temperature)
    }
}

/// Thread-safe reading generator
#[derive(Debug)]
pub struct VitalsGenerator {
    rng: Mutex<StdRng>,
    healthy: VitalRanges,
    anomalous: VitalRanges,
}

impl VitalsGenerator {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            healthy: VitalRanges::healthy(),
            anomalous: VitalRanges::anomalous(),
        }
    }

    /// Draw one reading from the healthy or anomalous family
    pub fn next(&self, faulty: bool) -> TelemetryReading {
        let ranges = if faulty { &self.anomalous } else { &self.healthy };
        // A poisoned lock only means another request panicked mid-draw;
        // the RNG state itself is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        let heart_rate = rng.gen_range(ranges.heart_rate.clone());
        let oxygen_level = round2(rng.gen_range(ranges.oxygen_level.clone()));
        let temperature = round2(rng.gen_range(ranges.temperature.clone()));

        TelemetryReading::new(f64::from(heart_rate), oxygen_level, temperature)
            .with_timestamp(chrono::Utc::now().timestamp())
    }
}

impl Default for VitalsGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
