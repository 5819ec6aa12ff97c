//! Type-safe wrappers for physical units
//!
//! Newtypes around the raw numbers coming out of the telemetry feed so that
//! lap durations, distances and speeds cannot be mixed up.
//!
//! Floating point units serialize with 4 decimal places to keep exported
//! chart payloads compact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Round f64 to 4 decimal places for compact JSON serialization
fn round4<S: serde::Serializer>(val: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64((*val * 10000.0).round() / 10000.0)
}

/// Meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meters(#[serde(serialize_with = "round4")] pub f64);

/// Meters per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetersPerSecond(#[serde(serialize_with = "round4")] pub f64);

impl fmt::Display for MetersPerSecond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} m/s", self.0)
    }
}

/// Seconds (elapsed time between samples)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seconds(#[serde(serialize_with = "round4")] pub f64);

/// Whole milliseconds, as reported by the lap timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Milliseconds(pub u64);

impl Milliseconds {
    pub fn as_seconds(&self) -> Seconds {
        Seconds(self.0 as f64 / 1000.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::analytics::format_duration(self.0))
    }
}
