//! Telemetry source trait and acquisition outcome

use crate::error::{CacheMiss, RemoteError};
use crate::model::{AttributeRecord, LastN, Series};
use serde::Serialize;

/// Where the data in an [`Acquisition`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Remote,
    Cache,
}

/// Outcome of a single fetch.
///
/// A fetch never fails outright: the worst case is [`Acquisition::NoData`],
/// which carries why neither the remote store nor the cache could answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition<T> {
    /// Fresh data from the remote store
    Remote(T),
    /// The remote store was unavailable; data comes from the last snapshot
    Cached { data: T, cause: RemoteError },
    /// Neither source had usable data
    NoData { cause: RemoteError, cache: CacheMiss },
}

impl<T> Acquisition<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Acquisition::Remote(data) | Acquisition::Cached { data, .. } => Some(data),
            Acquisition::NoData { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Acquisition::Remote(data) | Acquisition::Cached { data, .. } => Some(data),
            Acquisition::NoData { .. } => None,
        }
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            Acquisition::Remote(_) => Some(Origin::Remote),
            Acquisition::Cached { .. } => Some(Origin::Cache),
            Acquisition::NoData { .. } => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Acquisition<U> {
        match self {
            Acquisition::Remote(data) => Acquisition::Remote(f(data)),
            Acquisition::Cached { data, cause } => Acquisition::Cached {
                data: f(data),
                cause,
            },
            Acquisition::NoData { cause, cache } => Acquisition::NoData { cause, cache },
        }
    }
}

/// A source of one attribute's time series
///
/// Implementations are responsible for:
/// - Requesting the most recent `limit` samples (advisory; the remote decides)
/// - Falling back to their own local snapshot when the remote is unavailable
/// - Returning either a fully decoded series or no data, never a partial one
pub trait TelemetrySource {
    type Record: AttributeRecord;

    /// Human-readable name of this source (e.g., the remote host)
    fn name(&self) -> &str;

    /// Single-shot, blocking fetch. Never retries.
    fn fetch(&self, limit: LastN) -> Acquisition<Series<Self::Record>>;
}
