//! NIWA API client.
//!
//! Issues parameterized GETs against the tide and UV endpoints of
//! `api.niwa.co.nz` and returns the JSON bodies untouched. Any transport
//! error, non-2xx status, or invalid-JSON body maps to `Error::Fetch`; no
//! retries are attempted here — callers re-invoke (and hit the response
//! cache first) if they want another go.

use chrono::{NaiveDate, Utc};
use common::config::BotConfig;
use common::Error;
use tracing::debug;

const API_KEY_HEADER: &str = "x-apikey";

/// NIWA API client with connection pooling and a fixed User-Agent.
#[derive(Debug, Clone)]
pub struct NiwaClient {
    client: reqwest::Client,
    api_key: String,
    tide_url: String,
    uv_url: String,
}

/// Truncate a coordinate toward zero.
///
/// The NIWA API requires integer degrees while mesh devices report floats.
/// Truncation (not rounding) is the upstream-mandated, intentionally lossy
/// conversion: -36.7 becomes -36.
pub fn truncate_coord(v: f64) -> i64 {
    v.trunc() as i64
}

/// Query parameters for the tide endpoint.
///
/// Omitting `interval` yields just the high and low tides.
fn tide_params(lat: f64, long: f64, start_date: NaiveDate) -> Vec<(&'static str, String)> {
    vec![
        ("lat", truncate_coord(lat).to_string()),
        ("long", truncate_coord(long).to_string()),
        ("numberOfDays", "2".into()),
        ("startDate", start_date.format("%Y-%m-%d").to_string()),
        ("datum", "LAT".into()),
    ]
}

/// Query parameters for the UV endpoint.
fn uv_params(lat: f64, long: f64) -> Vec<(&'static str, String)> {
    vec![
        ("lat", truncate_coord(lat).to_string()),
        ("long", truncate_coord(long).to_string()),
    ]
}

impl NiwaClient {
    pub fn new(cfg: &BotConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .pool_max_idle_per_host(4)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("failed to build NIWA HTTP client");

        Self {
            client,
            api_key: cfg.niwa_api_key.clone(),
            tide_url: cfg.endpoints.tide_url.clone(),
            uv_url: cfg.endpoints.uv_url.clone(),
        }
    }

    /// Fetch two days of high/low tide predictions starting today.
    pub async fn fetch_tide(&self, lat: f64, long: f64) -> Result<serde_json::Value, Error> {
        let params = tide_params(lat, long, Utc::now().date_naive());
        self.get_json(&self.tide_url, &params, "tide").await
    }

    /// Fetch the UV index forecast for a location.
    pub async fn fetch_uv(&self, lat: f64, long: f64) -> Result<serde_json::Value, Error> {
        let params = uv_params(lat, long);
        self.get_json(&self.uv_url, &params, "UV").await
    }

    async fn get_json(
        &self,
        url: &str,
        params: &[(&'static str, String)],
        kind: &str,
    ) -> Result<serde_json::Value, Error> {
        debug!("NIWA {} request: {} params={:?}", kind, url, params);

        let resp = self
            .client
            .get(url)
            .query(params)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("HTTP error for {} data: {}", kind, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Fetch(format!(
                "NIWA returned {} for {} data: {}",
                status.as_u16(),
                kind,
                &body[..body.len().min(500)]
            )));
        }

        debug!("NIWA {} response: {}", kind, status.as_u16());

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| Error::Fetch(format!("JSON parse error for {} data: {}", kind, e)))
    }
}
