//! Error taxonomy
//!
//! Nothing in here is fatal. Remote failures collapse into a fallback to the
//! local cache, cache misses become an explicit "no data" outcome and
//! analytics failures are reported per operation.

use thiserror::Error;

/// Why the remote time-series store could not be used.
///
/// Network failures (timeout, connection) and protocol failures (status,
/// body, envelope, sample shape) are all recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("timed out waiting for the remote telemetry store")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("remote returned HTTP status {0}")]
    Status(u16),
    #[error("response body is not valid JSON: {0}")]
    Malformed(String),
    #[error("response does not match the expected envelope: {0}")]
    UnexpectedEnvelope(String),
    #[error("sample {index} is invalid: {reason}")]
    InvalidSample { index: usize, reason: String },
}

impl RemoteError {
    /// Network level failure, as opposed to the remote answering badly
    pub fn is_network(&self) -> bool {
        matches!(self, RemoteError::Timeout | RemoteError::Network(_))
    }
}

/// Why the local snapshot could not provide data. Expected on first run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheMiss {
    #[error("no cached snapshot")]
    Absent,
    #[error("cached snapshot could not be read: {0}")]
    Unreadable(String),
    #[error("cached snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// Failure to persist a snapshot
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A lap analytics operation could not produce a result
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("no lap data available")]
    EmptySeries,
    #[error("invalid track length {0}, must be a positive number of meters")]
    InvalidTrackLength(f64),
    #[error("unable to compute speed for lap {lap_number}: duration is zero")]
    ZeroDuration { lap_number: u32 },
    #[error("unable to compute speed: every lap has a zero duration")]
    NoComputableSpeed,
    #[error("lap {0} not found")]
    LapNotFound(u32),
}

/// Caller-supplied input rejected before any work is done
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("lastN must be between 1 and {max}, got {value}")]
    LastNOutOfRange { value: u32, max: u32 },
}
