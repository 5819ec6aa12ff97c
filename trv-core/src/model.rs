//! Lap telemetry data model
//!
//! The remote store keeps one time series per sensor attribute. Each sample
//! carries an `attrValue` whose shape depends on the attribute:
//! - `lap`: `[lapNumber, durationMs]`
//! - `luminosity`: a scalar reading
//!
//! Either form may also arrive string-encoded (`"[3, 41234]"`, `"512"`).
//! Decoding is strict: a sample that does not match its attribute's shape is
//! rejected, and the caller rejects the whole series with it.

use crate::error::{AnalyticsError, InputError};
use crate::units::{Meters, Milliseconds};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A telemetry record that can be decoded from one sample of an attribute
pub trait AttributeRecord: Sized {
    /// Attribute name on the remote entity
    const ATTRIBUTE: &'static str;

    /// Decode a sample's `attrValue`, returning a human-readable reason on mismatch
    fn from_sample(attr_value: &Value, received_at: DateTime<Utc>) -> Result<Self, String>;

    /// When the remote store received this sample
    fn received_at(&self) -> DateTime<Utc>;
}

/// One completed lap reported by the track sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapRecord {
    /// Caller-supplied lap identifier, not guaranteed unique or ordered
    pub lap_number: u32,

    /// Lap duration
    pub duration: Milliseconds,

    /// Receipt timestamp from the remote store
    pub received_at: DateTime<Utc>,
}

impl LapRecord {
    pub fn new(lap_number: u32, duration_ms: u64, received_at: DateTime<Utc>) -> Self {
        Self {
            lap_number,
            duration: Milliseconds(duration_ms),
            received_at,
        }
    }
}

impl AttributeRecord for LapRecord {
    const ATTRIBUTE: &'static str = "lap";

    fn from_sample(attr_value: &Value, received_at: DateTime<Utc>) -> Result<Self, String> {
        let value = decode_string_encoded(attr_value)?;
        let pair = value
            .as_array()
            .ok_or_else(|| format!("expected [lapNumber, durationMs], got {}", value))?;
        if pair.len() != 2 {
            return Err(format!(
                "expected 2 elements in lap value, got {}",
                pair.len()
            ));
        }

        let lap_number = whole_number(&pair[0])
            .ok_or_else(|| format!("lap number {} is not a non-negative integer", pair[0]))?;
        let lap_number = u32::try_from(lap_number)
            .map_err(|_| format!("lap number {} is out of range", lap_number))?;
        if lap_number == 0 {
            return Err("lap number must be at least 1".to_string());
        }

        let duration_ms = whole_number(&pair[1])
            .ok_or_else(|| format!("duration {} is not a non-negative integer", pair[1]))?;

        Ok(LapRecord::new(lap_number, duration_ms, received_at))
    }

    fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// A scalar luminosity reading from the same sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuminosityReading {
    pub value: f64,
    pub received_at: DateTime<Utc>,
}

impl AttributeRecord for LuminosityReading {
    const ATTRIBUTE: &'static str = "luminosity";

    fn from_sample(attr_value: &Value, received_at: DateTime<Utc>) -> Result<Self, String> {
        let value = decode_string_encoded(attr_value)?;
        let reading = value
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("expected a numeric reading, got {}", value))?;
        Ok(LuminosityReading {
            value: reading,
            received_at,
        })
    }

    fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

/// Unwrap an `attrValue` that was stored as a JSON string
fn decode_string_encoded(value: &Value) -> Result<Cow<'_, Value>, String> {
    match value {
        Value::String(s) => serde_json::from_str(s.trim())
            .map(Cow::Owned)
            .map_err(|e| format!("could not decode string value {:?}: {}", s, e)),
        other => Ok(Cow::Borrowed(other)),
    }
}

/// Accept integers, and floats with no fractional part (`41234.0`)
fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// Ordered sequence of records, in arrival order from the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series<R>(Vec<R>);

/// Lap records in arrival order. Position in the sequence, not `lap_number`,
/// is the x-axis of the time-of-day chart.
pub type LapSeries = Series<LapRecord>;

pub type LuminositySeries = Series<LuminosityReading>;

impl<R> Series<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self(records)
    }

    pub fn records(&self) -> &[R] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_records(self) -> Vec<R> {
        self.0
    }
}

impl<R: AttributeRecord> Series<R> {
    /// (position, receipt time) pairs, positions starting at 1
    pub fn time_points(&self) -> Vec<TimePoint> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, r)| TimePoint {
                index: (i + 1) as f64,
                timestamp: r.received_at(),
            })
            .collect()
    }
}

impl<R> Default for Series<R> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<R> From<Vec<R>> for Series<R> {
    fn from(records: Vec<R>) -> Self {
        Self(records)
    }
}

impl<R> FromIterator<R> for Series<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, R> IntoIterator for &'a Series<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A point on the time-of-day curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub index: f64,
    pub timestamp: DateTime<Utc>,
}

/// Length of one lap of the track, always positive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackLength(f64);

impl TrackLength {
    pub fn new(meters: f64) -> Result<Self, AnalyticsError> {
        if meters.is_finite() && meters > 0.0 {
            Ok(Self(meters))
        } else {
            Err(AnalyticsError::InvalidTrackLength(meters))
        }
    }

    pub fn meters(&self) -> Meters {
        Meters(self.0)
    }
}

/// Number of most recent samples requested from the remote store.
///
/// Advisory only: the server decides how many it actually returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastN(u32);

impl LastN {
    pub fn new(value: u32, max: u32) -> Result<Self, InputError> {
        if (1..=max).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InputError::LastNOutOfRange { value, max })
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}
