//! Chart series handed to renderers
//!
//! Builders validate their input so a sink only ever receives non-empty,
//! fully computed data with display labels attached.

use crate::analytics::{self, format_duration, LapSpeed};
use crate::error::AnalyticsError;
use crate::model::{LapSeries, TimePoint, TrackLength};
use crate::smoothing::{self, Curve};
use crate::units::{Meters, MetersPerSecond, Milliseconds};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

/// Lap duration per lap, with the mean as reference line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapTimeChart {
    pub points: Vec<LapTimePoint>,
    pub mean_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapTimePoint {
    pub lap_number: u32,
    pub duration: Milliseconds,
    pub label: String,
}

/// Average speed per lap for a given track length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedChart {
    pub track_length: Meters,
    pub points: Vec<SpeedPoint>,
    pub mean: MetersPerSecond,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedPoint {
    pub lap_number: u32,
    pub speed: MetersPerSecond,
    pub label: String,
}

/// Time of day each lap was received, plus the smoothed curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleChart {
    pub points: Vec<SchedulePoint>,
    pub curve: Curve,
    /// Offset used for the labels
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePoint {
    pub index: f64,
    pub timestamp: DateTime<Utc>,
    pub label: String,
}

impl LapTimeChart {
    pub fn build(series: &LapSeries) -> Result<Self, AnalyticsError> {
        let mean_ms = analytics::mean_duration(series)?;
        let points = series
            .iter()
            .map(|r| LapTimePoint {
                lap_number: r.lap_number,
                duration: r.duration,
                label: format_duration(r.duration.0),
            })
            .collect();
        Ok(Self { points, mean_ms })
    }
}

impl SpeedChart {
    pub fn build(series: &LapSeries, track: TrackLength) -> Result<Self, AnalyticsError> {
        let speeds = analytics::lap_speeds(series, track)?;
        let mean = analytics::mean_speed(&speeds)?;
        let points = speeds
            .iter()
            .map(|LapSpeed { lap_number, speed, .. }| SpeedPoint {
                lap_number: *lap_number,
                speed: *speed,
                label: speed.to_string(),
            })
            .collect();
        Ok(Self {
            track_length: track.meters(),
            points,
            mean,
        })
    }
}

impl ScheduleChart {
    /// Positions start at 1 in arrival order; labels are `HH:MM:SS.mmm`
    /// at `utc_offset_hours`.
    pub fn build(series: &LapSeries, utc_offset_hours: i32) -> Result<Self, AnalyticsError> {
        if series.is_empty() {
            return Err(AnalyticsError::EmptySeries);
        }
        let time_points: Vec<TimePoint> = series.time_points();
        let points = time_points
            .iter()
            .map(|p| SchedulePoint {
                index: p.index,
                timestamp: p.timestamp,
                label: time_of_day_label(p.timestamp, utc_offset_hours),
            })
            .collect();
        Ok(Self {
            points,
            curve: smoothing::smooth(&time_points),
            utc_offset_hours,
        })
    }
}

/// `HH:MM:SS.mmm` at a fixed UTC offset; out-of-range offsets fall back to UTC
pub fn time_of_day_label(timestamp: DateTime<Utc>, utc_offset_hours: i32) -> String {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    timestamp
        .with_timezone(&offset)
        .format("%H:%M:%S%.3f")
        .to_string()
}
