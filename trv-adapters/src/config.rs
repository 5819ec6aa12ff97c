//! Source configuration
//!
//! One immutable value passed into a source at construction. Nothing here is
//! read from process-wide state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use trv_core::LastN;

/// Connection and cache settings for the STH telemetry source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Scheme, host and port of the short-term-history service
    pub base_url: String,

    /// Entity type of the track sensor
    pub entity_type: String,

    /// Entity id of the track sensor
    pub entity_id: String,

    /// Sent as the `fiware-service` header
    pub service: String,

    /// Sent as the `fiware-servicepath` header
    pub service_path: String,

    /// Upper bound on a single request, connect through body
    pub timeout_secs: u64,

    /// Directory holding one `<attribute>.json` snapshot per source
    pub cache_dir: PathBuf,

    /// Largest accepted lastN
    pub max_last_n: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://74.249.83.253:8666".to_string(),
            entity_type: "TrackVision".to_string(),
            entity_id: "urn:ngsi-ld:TRV:027".to_string(),
            service: "smart".to_string(),
            service_path: "/".to_string(),
            timeout_secs: 5,
            cache_dir: Self::default_cache_dir(),
            max_last_n: 10,
        }
    }
}

impl SourceConfig {
    /// `<data_dir>/trackvision`, or the working directory if there is no data dir
    pub fn default_cache_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("trackvision"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Last-N query URL for one attribute of the configured entity
    pub fn endpoint(&self, attribute: &str, limit: LastN) -> String {
        format!(
            "{}/STH/v1/contextEntities/type/{}/id/{}/attributes/{}?lastN={}",
            self.base_url.trim_end_matches('/'),
            self.entity_type,
            self.entity_id,
            attribute,
            limit.get()
        )
    }

    pub fn cache_path(&self, attribute: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", attribute))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate a caller-supplied lastN against this deployment's bound
    pub fn last_n(&self, value: u32) -> Result<LastN, trv_core::InputError> {
        LastN::new(value, self.max_last_n)
    }
}
