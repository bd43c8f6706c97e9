//! Caching, pagination, and formatting for NIWA marine forecasts.
//!
//! The stateful core of the bot: per-device response caches with TTL
//! expiry and bounded size, per-device UV pagination sessions, pure
//! payload-to-text formatting, and the `ForecastService` facade that
//! composes them over an upstream client.

pub mod cache;
pub mod format;
pub mod service;
pub mod session;

pub use cache::{CacheEntry, ResponseCache};
pub use format::{format_tide, format_uv, uv_risk, UvPage};
pub use service::{ForecastService, Upstream};
pub use session::{SessionTracker, UvSession};
