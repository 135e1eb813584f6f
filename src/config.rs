use anyhow::{Context, Result};
use url::Url;

/// Runtime configuration, env-var driven. Every knob has a default so the
/// binary runs with no environment at all.
#[derive(Clone)]
pub struct Config {
    /// CSV behind the stacked decomposition view
    pub gap_url: String,
    /// CSV behind the noise-sweep view
    pub noise_url: String,
    pub http_timeout_secs: u64,
    /// Directory figure JSON is written into
    pub out_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            gap_url: std::env::var("GAP_DATA_URL").unwrap_or_else(|_| {
                "https://raw.githubusercontent.com/yaminibansal/tmp/main/cf10_repo.csv".to_string()
            }),
            noise_url: std::env::var("NOISE_DATA_URL").unwrap_or_else(|_| {
                "https://raw.githubusercontent.com/yaminibansal/streamlit-apps/main/gen_gap.csv"
                    .to_string()
            }),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            out_dir: std::env::var("OUT_DIR").unwrap_or_else(|_| "out".to_string()),
        }
    }

    /// Reject unusable dataset URLs before any fetch is attempted.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.gap_url).with_context(|| format!("bad GAP_DATA_URL: {}", self.gap_url))?;
        Url::parse(&self.noise_url)
            .with_context(|| format!("bad NOISE_DATA_URL: {}", self.noise_url))?;
        Ok(())
    }
}
