//! Configuration management
//!
//! Settings live in a `settings.json` next to the data file:
//! ```json
//! {
//!   "smsApiToken": "...",
//!   "smsSender": "Bancore",
//!   "rateUrl": null,
//!   "challengeTtlSecs": 300
//! }
//! ```
//! A missing file yields the defaults; the SMS token can also come from the
//! `BANCORE_SMS_TOKEN` environment variable (for CI/testing).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adapters::bccr::DEFAULT_RATE_URL;
use crate::domain::result::Result;

const SETTINGS_FILE: &str = "settings.json";

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// GatewayAPI token; operations needing SMS fail without one
    #[serde(default)]
    pub sms_api_token: Option<String>,
    #[serde(default = "default_sms_sender")]
    pub sms_sender: String,
    /// Override for the exchange-rate page URL
    #[serde(default)]
    pub rate_url: Option<String>,
    #[serde(default = "default_challenge_ttl_secs")]
    pub challenge_ttl_secs: u64,
}

fn default_sms_sender() -> String {
    "Bancore".to_string()
}

fn default_challenge_ttl_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sms_api_token: None,
            sms_sender: default_sms_sender(),
            rate_url: None,
            challenge_ttl_secs: default_challenge_ttl_secs(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut config: Config = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            Config::default()
        };

        if let Ok(token) = std::env::var("BANCORE_SMS_TOKEN") {
            if !token.trim().is_empty() {
                config.sms_api_token = Some(token);
            }
        }
        Ok(config)
    }

    /// Save config to the data directory
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Exchange-rate page URL, falling back to the published default
    pub fn rate_url(&self) -> &str {
        self.rate_url.as_deref().unwrap_or(DEFAULT_RATE_URL)
    }

    /// Challenge lifetime as a chrono duration
    pub fn challenge_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.challenge_ttl_secs as i64)
    }
}
