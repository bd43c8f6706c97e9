//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{BotConfig, Error};
use std::path::Path;

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

fn parse_positive_i64(raw: &str, env_name: &str) -> Result<i64, Error> {
    let parsed = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed <= 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_positive_usize(raw: &str, env_name: &str) -> Result<usize, Error> {
    let parsed = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &BotConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.niwa_api_key.trim().is_empty() {
        issues.push("NIWA_API_KEY is required (set in .env or environment)".into());
    }
    if config.cache.ttl_hours <= 0 {
        issues.push("cache.ttl_hours must be > 0".into());
    }
    if config.cache.max_records == 0 {
        issues.push("cache.max_records must be > 0".into());
    }
    if config.paging.page_size == 0 {
        issues.push("paging.page_size must be > 0".into());
    }
    if config.timezone.parse::<chrono_tz::Tz>().is_err() {
        issues.push(format!("timezone '{}' is not a known IANA zone", config.timezone));
    }
    if config.endpoints.tide_url.trim().is_empty() {
        issues.push("endpoints.tide_url must not be empty".into());
    }
    if config.endpoints.uv_url.trim().is_empty() {
        issues.push("endpoints.uv_url must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load bot configuration from environment and optional config file.
pub fn load_config() -> Result<BotConfig, Error> {
    // 1. Load .env file if present.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = BotConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(key) = std::env::var("NIWA_API_KEY") {
        config.niwa_api_key = key;
    }
    if let Ok(enabled) = std::env::var("NIWA_ENABLED") {
        config.niwa_enabled = parse_bool(&enabled);
    }
    if let Ok(tz) = std::env::var("NIWA_TIMEZONE") {
        config.timezone = tz.trim().to_string();
    }
    if let Ok(raw) = std::env::var("NIWA_CACHE_TTL_HOURS") {
        config.cache.ttl_hours = parse_positive_i64(&raw, "NIWA_CACHE_TTL_HOURS")?;
    }
    if let Ok(raw) = std::env::var("NIWA_CACHE_MAX_RECORDS") {
        config.cache.max_records = parse_positive_usize(&raw, "NIWA_CACHE_MAX_RECORDS")?;
    }
    if let Ok(raw) = std::env::var("NIWA_PAGE_SIZE") {
        config.paging.page_size = parse_positive_usize(&raw, "NIWA_PAGE_SIZE")?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
