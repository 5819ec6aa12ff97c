//! Telemetry source adapters for TrackVision

pub mod cache;
pub mod config;
pub mod envelope;
pub mod sth;

pub use cache::{CacheSnapshot, CacheStore};
pub use config::SourceConfig;
pub use sth::{AdapterError, LapSource, LuminositySource, SthSource};
