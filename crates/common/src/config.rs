//! Bot configuration types.

use serde::{Deserialize, Serialize};

/// Top-level bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// NIWA API key (`x-apikey` header).
    #[serde(default)]
    pub niwa_api_key: String,

    /// Master switch — when false the bot refuses to start.
    #[serde(default = "default_true")]
    pub niwa_enabled: bool,

    /// User-Agent sent with every upstream request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// IANA timezone name for rendering forecast times.
    /// NIWA data is New Zealand specific, so Auckland by default.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Response cache parameters.
    #[serde(default)]
    pub cache: CacheConfig,

    /// UV pagination parameters.
    #[serde(default)]
    pub paging: PagingConfig,

    /// Upstream endpoint URLs.
    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Response cache and session-tracker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Hours before a cached response (or idle UV session) expires.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,

    /// Max cached responses per kind; oldest are trimmed beyond this.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

/// UV forecast pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// UV records revealed per reply.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Upstream endpoint URLs (overridable for testing against a stub server).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_tide_url")]
    pub tide_url: String,

    #[serde(default = "default_uv_url")]
    pub uv_url: String,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "niwa-bot/0.1 (+https://meshing-around.com)".into()
}

fn default_timezone() -> String {
    "Pacific/Auckland".into()
}

fn default_ttl_hours() -> i64 {
    8
}

fn default_max_records() -> usize {
    150
}

fn default_page_size() -> usize {
    4
}

fn default_tide_url() -> String {
    "https://api.niwa.co.nz/tides/data".into()
}

fn default_uv_url() -> String {
    "https://api.niwa.co.nz/uv/data".into()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            max_records: default_max_records(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            tide_url: default_tide_url(),
            uv_url: default_uv_url(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            niwa_api_key: String::new(),
            niwa_enabled: true,
            user_agent: default_user_agent(),
            timezone: default_timezone(),
            cache: CacheConfig::default(),
            paging: PagingConfig::default(),
            endpoints: EndpointConfig::default(),
        }
    }
}
