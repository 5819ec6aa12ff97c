//! TrackVision Core Library
//!
//! Lap record model, lap analytics, series smoothing and the source trait
//! shared by the telemetry adapters and the command-line front end.

pub mod analytics;
pub mod chart;
pub mod error;
pub mod model;
pub mod smoothing;
pub mod source;
pub mod units;

pub use error::{AnalyticsError, CacheError, CacheMiss, InputError, RemoteError};
pub use model::{
    AttributeRecord, LapRecord, LapSeries, LastN, LuminosityReading, LuminositySeries, Series,
    TimePoint, TrackLength,
};
pub use source::{Acquisition, Origin, TelemetrySource};
