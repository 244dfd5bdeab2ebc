//! GatewayAPI SMS client
//!
//! Sends one-time verification codes through the GatewayAPI REST endpoint
//! using token authentication.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::domain::result::{Error, Result};
use crate::ports::SmsGateway;

const DEFAULT_ENDPOINT: &str = "https://gatewayapi.com/rest/mtsms";

/// SMS gateway backed by the GatewayAPI REST service
pub struct GatewayApiSms {
    client: Client,
    token: String,
    sender: String,
    endpoint: String,
}

impl GatewayApiSms {
    pub fn new(token: impl Into<String>, sender: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(token, sender, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(
        token: impl Into<String>,
        sender: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Config("SMS API token is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::SmsDelivery(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token,
            sender: sender.into(),
            endpoint: endpoint.into(),
        })
    }
}

impl SmsGateway for GatewayApiSms {
    fn send(&self, phone: &str, message: &str) -> Result<()> {
        let payload = serde_json::json!({
            "sender": self.sender,
            "message": message,
            "recipients": [{ "msisdn": phone }],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.token, None::<&str>)
            .json(&payload)
            .send()
            .map_err(|e| Error::SmsDelivery(format!("SMS request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::SmsDelivery(format!(
                "SMS provider answered HTTP {status}: {body}"
            )));
        }
        info!(phone = %phone, "SMS dispatched");
        Ok(())
    }
}
