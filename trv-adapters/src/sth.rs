//! STH (short-term history) telemetry source
//!
//! Issues a single blocking GET for the last N samples of one attribute. On
//! success the raw envelope replaces the local snapshot; on any failure the
//! snapshot is decoded instead. Nothing is retried within a fetch.

use crate::cache::{CacheSnapshot, CacheStore};
use crate::config::SourceConfig;
use crate::envelope;
use reqwest::blocking::Client;
use serde_json::Value;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::{debug, info, warn};
use trv_core::{
    Acquisition, AttributeRecord, CacheMiss, LapRecord, LastN, LuminosityReading, RemoteError,
    Series, TelemetrySource,
};

const SERVICE_HEADER: &str = "fiware-service";
const SERVICE_PATH_HEADER: &str = "fiware-servicepath";

/// Failure to construct a source
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Remote source for one attribute, with its own cache file
pub struct SthSource<R> {
    config: SourceConfig,
    client: Client,
    cache: CacheStore,
    _record: PhantomData<fn() -> R>,
}

/// Lap timing source
pub type LapSource = SthSource<LapRecord>;

/// Luminosity source
pub type LuminositySource = SthSource<LuminosityReading>;

impl<R: AttributeRecord> SthSource<R> {
    pub fn new(config: SourceConfig) -> Result<Self, AdapterError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let cache = CacheStore::new(config.cache_path(R::ATTRIBUTE));
        Ok(Self {
            config,
            client,
            cache,
            _record: PhantomData,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Remote request only, no fallback. Returns the raw body alongside the
    /// decoded series so the caller can snapshot it.
    pub fn fetch_remote(&self, limit: LastN) -> Result<(Value, Series<R>), RemoteError> {
        let url = self.config.endpoint(R::ATTRIBUTE, limit);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .header(SERVICE_HEADER, &self.config.service)
            .header(SERVICE_PATH_HEADER, &self.config.service_path)
            .send()
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response.text().map_err(classify)?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        let series = envelope::decode::<R>(&value)?;

        Ok((value, series))
    }

    fn fallback(&self, cause: RemoteError) -> Acquisition<Series<R>> {
        let cached = self.cache.load().and_then(|snapshot| {
            envelope::decode::<R>(snapshot.as_value())
                .map_err(|e| CacheMiss::Corrupt(e.to_string()))
        });

        match cached {
            Ok(series) => {
                info!(
                    "Using {} cached {} samples from {}",
                    series.len(),
                    R::ATTRIBUTE,
                    self.cache.path().display()
                );
                Acquisition::Cached {
                    data: series,
                    cause,
                }
            }
            Err(miss) => {
                warn!("No local {} data available: {}", R::ATTRIBUTE, miss);
                Acquisition::NoData { cause, cache: miss }
            }
        }
    }
}

impl<R: AttributeRecord> TelemetrySource for SthSource<R> {
    type Record = R;

    fn name(&self) -> &str {
        &self.config.base_url
    }

    fn fetch(&self, limit: LastN) -> Acquisition<Series<R>> {
        match self.fetch_remote(limit) {
            Ok((body, series)) => {
                info!(
                    "Fetched {} {} samples from {}",
                    series.len(),
                    R::ATTRIBUTE,
                    self.name()
                );
                // best effort: a failed write does not fail the fetch
                if let Err(e) = self.cache.save(&CacheSnapshot::new(body)) {
                    warn!(
                        "Failed to update local cache {}: {}",
                        self.cache.path().display(),
                        e
                    );
                }
                Acquisition::Remote(series)
            }
            Err(cause) => {
                warn!("Remote telemetry unavailable ({}), using local cache", cause);
                self.fallback(cause)
            }
        }
    }
}

fn classify(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Network(e.to_string())
    }
}
