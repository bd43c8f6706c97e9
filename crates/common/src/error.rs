//! Unified error type for the NIWA marine bot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Upstream fetch failed: transport error, non-2xx status, or a body
    /// that was not valid JSON. Never retried automatically, never cached.
    #[error("NIWA fetch failed: {0}")]
    Fetch(String),

    /// Upstream returned 2xx but the payload lacks expected fields.
    #[error("Malformed NIWA payload: {0}")]
    MalformedPayload(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for any upstream fetch failure (the caller-facing sentinel).
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}
