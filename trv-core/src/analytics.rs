//! Lap analytics
//!
//! Extrema, speeds and lookups over a [`LapSeries`]. Every operation accepts
//! an empty series and reports [`AnalyticsError`] instead of panicking.
//!
//! Ties in min/max selection go to the first record in sequence order.

use crate::error::AnalyticsError;
use crate::model::{LapRecord, LapSeries, TrackLength};
use crate::units::{Milliseconds, MetersPerSecond};
use serde::Serialize;
use std::cmp::Ordering;

/// Average speed of one lap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LapSpeed {
    pub lap_number: u32,
    pub duration: Milliseconds,
    pub speed: MetersPerSecond,
}

/// First element that is strictly better than everything before it.
///
/// `better(candidate, best)` must return true only on strict improvement,
/// so equal elements never displace an earlier one.
fn first_extreme<T, I, F>(iter: I, better: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> bool,
{
    iter.into_iter().fold(None, |best, item| match best {
        Some(b) if !better(&item, &b) => Some(b),
        _ => Some(item),
    })
}

/// Lap with the lowest duration
pub fn fastest_lap(series: &LapSeries) -> Result<&LapRecord, AnalyticsError> {
    first_extreme(series.iter(), |a, b| a.duration < b.duration).ok_or(AnalyticsError::EmptySeries)
}

/// Lap with the highest duration
pub fn slowest_lap(series: &LapSeries) -> Result<&LapRecord, AnalyticsError> {
    first_extreme(series.iter(), |a, b| a.duration > b.duration).ok_or(AnalyticsError::EmptySeries)
}

/// `track_length / duration` in meters per second
pub fn average_speed(
    record: &LapRecord,
    track: TrackLength,
) -> Result<MetersPerSecond, AnalyticsError> {
    if record.duration.is_zero() {
        return Err(AnalyticsError::ZeroDuration {
            lap_number: record.lap_number,
        });
    }
    Ok(MetersPerSecond(
        track.meters().0 / record.duration.as_seconds().0,
    ))
}

/// Average speed of every lap whose speed can be computed, in sequence order.
///
/// Zero-duration laps are skipped. Fails if the series is empty or no lap
/// has a computable speed.
pub fn lap_speeds(series: &LapSeries, track: TrackLength) -> Result<Vec<LapSpeed>, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }

    let speeds: Vec<LapSpeed> = series
        .iter()
        .filter_map(|record| {
            average_speed(record, track).ok().map(|speed| LapSpeed {
                lap_number: record.lap_number,
                duration: record.duration,
                speed,
            })
        })
        .collect();

    if speeds.is_empty() {
        Err(AnalyticsError::NoComputableSpeed)
    } else {
        Ok(speeds)
    }
}

/// Lap with the highest average speed
pub fn fastest_average_speed(
    series: &LapSeries,
    track: TrackLength,
) -> Result<LapSpeed, AnalyticsError> {
    let speeds = lap_speeds(series, track)?;
    first_extreme(speeds, |a, b| a.speed.0.total_cmp(&b.speed.0) == Ordering::Greater)
        .ok_or(AnalyticsError::NoComputableSpeed)
}

/// Lap with the lowest average speed
pub fn slowest_average_speed(
    series: &LapSeries,
    track: TrackLength,
) -> Result<LapSpeed, AnalyticsError> {
    let speeds = lap_speeds(series, track)?;
    first_extreme(speeds, |a, b| a.speed.0.total_cmp(&b.speed.0) == Ordering::Less)
        .ok_or(AnalyticsError::NoComputableSpeed)
}

/// First record with the given lap number
pub fn lap_by_number(series: &LapSeries, lap_number: u32) -> Result<&LapRecord, AnalyticsError> {
    series
        .iter()
        .find(|r| r.lap_number == lap_number)
        .ok_or(AnalyticsError::LapNotFound(lap_number))
}

/// Lookup plus average speed for a single lap
pub fn lap_speed(
    series: &LapSeries,
    track: TrackLength,
    lap_number: u32,
) -> Result<LapSpeed, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }
    let record = lap_by_number(series, lap_number)?;
    Ok(LapSpeed {
        lap_number: record.lap_number,
        duration: record.duration,
        speed: average_speed(record, track)?,
    })
}

/// Arithmetic mean of all lap durations, in milliseconds
pub fn mean_duration(series: &LapSeries) -> Result<f64, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }
    let total: f64 = series.iter().map(|r| r.duration.0 as f64).sum();
    Ok(total / series.len() as f64)
}

/// Arithmetic mean of per-lap speeds (not total distance over total time)
pub fn mean_speed(speeds: &[LapSpeed]) -> Result<MetersPerSecond, AnalyticsError> {
    if speeds.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }
    let total: f64 = speeds.iter().map(|s| s.speed.0).sum();
    Ok(MetersPerSecond(total / speeds.len() as f64))
}

/// Human-readable duration.
///
/// - under one second: `"<ms> ms"`
/// - under one minute: `"<s>s <ms>ms"`
/// - otherwise: `"<m>m <s>s <ms>ms"`
pub fn format_duration(duration_ms: u64) -> String {
    if duration_ms < 1000 {
        return format!("{} ms", duration_ms);
    }

    let minutes = duration_ms / 60_000;
    let remainder = duration_ms % 60_000;
    let seconds = remainder / 1000;
    let millis = remainder % 1000;

    if minutes > 0 {
        format!("{}m {}s {}ms", minutes, seconds, millis)
    } else {
        format!("{}s {}ms", seconds, millis)
    }
}
