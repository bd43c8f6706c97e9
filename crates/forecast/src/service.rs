//! The forecast facade.
//!
//! `ForecastService` composes the upstream client, the per-kind response
//! caches, and the UV session tracker into the two operations the bot
//! exposes: `get_tide_data` and `get_uv_data`. All mutable state is owned
//! by the service instance and serialized behind mutexes; nothing is
//! global.

use crate::cache::ResponseCache;
use crate::format;
use crate::session::SessionTracker;
use chrono_tz::Tz;
use common::{BotConfig, Error};
use niwa_client::NiwaClient;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

/// Seam over the upstream API so the facade can be driven by a test double.
#[allow(async_fn_in_trait)]
pub trait Upstream {
    async fn fetch_tide(&self, lat: f64, long: f64) -> Result<Value, Error>;
    async fn fetch_uv(&self, lat: f64, long: f64) -> Result<Value, Error>;
}

impl Upstream for NiwaClient {
    async fn fetch_tide(&self, lat: f64, long: f64) -> Result<Value, Error> {
        NiwaClient::fetch_tide(self, lat, long).await
    }

    async fn fetch_uv(&self, lat: f64, long: f64) -> Result<Value, Error> {
        NiwaClient::fetch_uv(self, lat, long).await
    }
}

/// Facade over cache, sessions, formatter, and the upstream client.
#[derive(Debug)]
pub struct ForecastService<U = NiwaClient> {
    upstream: U,
    tide_cache: Mutex<ResponseCache>,
    uv_cache: Mutex<ResponseCache>,
    sessions: Mutex<SessionTracker>,
    page_size: usize,
    tz: Tz,
}

impl ForecastService<NiwaClient> {
    /// Build the service with a real NIWA client.
    pub fn from_config(cfg: &BotConfig) -> Result<Self, Error> {
        Self::new(NiwaClient::new(cfg), cfg)
    }
}

impl<U: Upstream> ForecastService<U> {
    pub fn new(upstream: U, cfg: &BotConfig) -> Result<Self, Error> {
        let tz: Tz = cfg
            .timezone
            .parse()
            .map_err(|_| Error::Config(format!("invalid timezone: {}", cfg.timezone)))?;

        Ok(Self {
            upstream,
            tide_cache: Mutex::new(ResponseCache::new(cfg.cache.ttl_hours, cfg.cache.max_records)),
            uv_cache: Mutex::new(ResponseCache::new(cfg.cache.ttl_hours, cfg.cache.max_records)),
            sessions: Mutex::new(SessionTracker::new(cfg.cache.ttl_hours)),
            page_size: cfg.paging.page_size,
            tz,
        })
    }

    /// Tide predictions for a location, cached per device.
    pub async fn get_tide_data(&self, lat: f64, long: f64, owner: &str) -> Result<String, Error> {
        let payload = {
            let cache = self.tide_cache.lock().await;
            cache.lookup(owner).cloned()
        };

        let payload = match payload {
            Some(p) => {
                debug!("Using cached NIWA tide data for {}", owner);
                p
            }
            // The lock is not held across the fetch: a concurrent miss for
            // the same device may fetch too. Duplicate work, not an error.
            None => {
                let fresh = self.upstream.fetch_tide(lat, long).await?;
                self.tide_cache.lock().await.store(fresh.clone(), owner);
                fresh
            }
        };

        format::format_tide(&payload, self.tz)
    }

    /// One page of the UV forecast for a location, advancing the device's
    /// pagination cursor as a side effect.
    pub async fn get_uv_data(&self, lat: f64, long: f64, owner: &str) -> Result<String, Error> {
        let cursor = self.sessions.lock().await.get_or_create(owner).cursor;

        let payload = {
            let cache = self.uv_cache.lock().await;
            cache.lookup(owner).cloned()
        };

        let payload = match payload {
            Some(p) => {
                debug!("Using cached NIWA UV data for {}", owner);
                p
            }
            None => {
                let fresh = self.upstream.fetch_uv(lat, long).await?;
                self.uv_cache.lock().await.store(fresh.clone(), owner);
                fresh
            }
        };

        let page = format::format_uv(&payload, cursor, self.page_size, self.tz)?;
        self.sessions.lock().await.advance(owner, page.next_cursor);

        Ok(page.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counting test double; optionally fails every fetch.
    #[derive(Debug)]
    struct MockUpstream {
        tide_calls: AtomicUsize,
        uv_calls: AtomicUsize,
        fail: bool,
        uv_records: usize,
    }

    impl MockUpstream {
        fn ok(uv_records: usize) -> Self {
            Self {
                tide_calls: AtomicUsize::new(0),
                uv_calls: AtomicUsize::new(0),
                fail: false,
                uv_records,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok(0)
            }
        }
    }

    fn tide_payload() -> Value {
        json!({
            "metadata": {"latitude": -36.0, "longitude": 174.0},
            "values": [
                {"time": "2026-08-28T03:10:00Z", "value": 2.81},
                {"time": "2026-08-28T09:25:00Z", "value": 0.42}
            ]
        })
    }

    fn uv_payload(n: usize) -> Value {
        let series = |offset: f64| -> Vec<Value> {
            (0..n)
                .map(|i| {
                    json!({
                        "time": format!("2026-08-28T{:02}:00:00Z", i),
                        "value": i as f64 + offset
                    })
                })
                .collect()
        };
        json!({
            "coord": "EPSG:4326,-36.0,174.0",
            "products": [
                {"values": series(0.0)},
                {"values": series(0.5)}
            ]
        })
    }

    impl Upstream for MockUpstream {
        async fn fetch_tide(&self, _lat: f64, _long: f64) -> Result<Value, Error> {
            self.tide_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Fetch("mock upstream down".into()));
            }
            Ok(tide_payload())
        }

        async fn fetch_uv(&self, _lat: f64, _long: f64) -> Result<Value, Error> {
            self.uv_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Fetch("mock upstream down".into()));
            }
            Ok(uv_payload(self.uv_records))
        }
    }

    fn service(mock: MockUpstream) -> ForecastService<MockUpstream> {
        ForecastService::new(mock, &BotConfig::default()).expect("service builds")
    }

    #[tokio::test]
    async fn test_second_tide_request_is_a_cache_hit() {
        let svc = service(MockUpstream::ok(0));

        let first = svc.get_tide_data(-36.7, 174.5, "device-a").await.unwrap();
        let second = svc.get_tide_data(-36.7, 174.5, "device-a").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            svc.upstream.tide_calls.load(Ordering::SeqCst),
            1,
            "second request within TTL must not hit upstream"
        );
    }

    #[tokio::test]
    async fn test_distinct_devices_fetch_independently() {
        let svc = service(MockUpstream::ok(0));

        svc.get_tide_data(-36.7, 174.5, "device-a").await.unwrap();
        svc.get_tide_data(-36.7, 174.5, "device-b").await.unwrap();

        assert_eq!(svc.upstream.tide_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate_and_are_not_cached() {
        let svc = service(MockUpstream::failing());

        let err = svc.get_tide_data(-36.7, 174.5, "device-a").await.unwrap_err();
        assert!(err.is_fetch());

        // A retry goes upstream again; failures never populate the cache.
        let _ = svc.get_tide_data(-36.7, 174.5, "device-a").await;
        assert_eq!(svc.upstream.tide_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_uv_requests_page_through_the_forecast() {
        let svc = service(MockUpstream::ok(10));

        let page1 = svc.get_uv_data(-36.7, 174.5, "device-a").await.unwrap();
        assert!(page1.contains("0.5 (Low)"));
        assert!(page1.contains("repeat the request"));

        let page2 = svc.get_uv_data(-36.7, 174.5, "device-a").await.unwrap();
        assert!(page2.contains("4.5 (Medium)"));
        assert!(!page2.contains("0.5 (Low)"));

        let page3 = svc.get_uv_data(-36.7, 174.5, "device-a").await.unwrap();
        assert!(page3.contains("9.5 (Very High)"));
        assert!(page3.contains("End of UV forecast."));

        // Cursor wrapped to 0: the walk starts over.
        let page4 = svc.get_uv_data(-36.7, 174.5, "device-a").await.unwrap();
        assert!(page4.contains("0.5 (Low)"));

        // All four pages came from one upstream fetch.
        assert_eq!(svc.upstream.uv_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uv_sessions_are_per_device() {
        let svc = service(MockUpstream::ok(10));

        svc.get_uv_data(-36.7, 174.5, "device-a").await.unwrap();
        let b_first = svc.get_uv_data(-36.7, 174.5, "device-b").await.unwrap();

        // Device B starts at the top regardless of A's progress.
        assert!(b_first.contains("0.5 (Low)"));
    }

    #[test]
    fn test_invalid_timezone_is_a_config_error() {
        let cfg = BotConfig {
            timezone: "Pacific/Nowhere".into(),
            ..BotConfig::default()
        };
        let err = ForecastService::new(MockUpstream::ok(0), &cfg).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
