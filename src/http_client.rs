use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. Upstream calls must never hang a comparison,
/// so the timeout is mandatory; `FOOTBALL_HTTP_TIMEOUT_SECS` can tighten
/// or widen it within sane bounds.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let raw = std::env::var("FOOTBALL_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok());
        Client::builder()
            .timeout(Duration::from_secs(effective_timeout_secs(raw)))
            .build()
            .context("failed to build http client")
    })
}

fn effective_timeout_secs(raw: Option<u64>) -> u64 {
    raw.unwrap_or(REQUEST_TIMEOUT_SECS).clamp(1, 60)
}
