//! Typed views over the NIWA payloads.
//!
//! Upstream responses are cached as opaque `serde_json::Value`s; these
//! structs are decoded from the cached value at format time, so a 2xx body
//! with missing fields surfaces as `Error::MalformedPayload` rather than a
//! failed fetch.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ── Tide payload ──────────────────────────────────────────────────────

/// Response body of `GET /tides/data`.
#[derive(Debug, Clone, Deserialize)]
pub struct TidePayload {
    pub metadata: TideMetadata,
    #[serde(default)]
    pub values: Vec<TideValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TideMetadata {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single high/low tide prediction.
#[derive(Debug, Clone, Deserialize)]
pub struct TideValue {
    pub time: DateTime<Utc>,
    /// Height in metres relative to the requested datum.
    pub value: f64,
}

// ── UV payload ────────────────────────────────────────────────────────

/// Response body of `GET /uv/data`.
///
/// `products[0]` carries the cloudy-sky series (and the time axis);
/// `products[1]` carries the clear-sky series.
#[derive(Debug, Clone, Deserialize)]
pub struct UvPayload {
    pub coord: String,
    #[serde(default)]
    pub products: Vec<UvProduct>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UvProduct {
    #[serde(default)]
    pub values: Vec<UvValue>,
}

/// A per-timestamp UV index reading.
///
/// `value` stays an untyped JSON value: the upstream feed emits numbers,
/// nulls, and occasionally strings, and the formatter maps each shape to a
/// risk label instead of rejecting the whole payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UvValue {
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub value: serde_json::Value,
}
