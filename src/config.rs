//! Credentials and environment wiring for the hosted stats API.

pub const DEFAULT_API_HOST: &str = "v3.football.api-sports.io";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub api_key: String,
    pub api_host: String,
}

impl FeedConfig {
    /// Reads `FOOTBALL_API_KEY` and `FOOTBALL_API_HOST`. The key is
    /// required; the host falls back to the api-sports default.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("FOOTBALL_API_KEY")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())?;
        let api_host = std::env::var("FOOTBALL_API_HOST")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        Some(Self { api_key, api_host })
    }
}

/// Loads `.env.local` then `.env`; missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}
