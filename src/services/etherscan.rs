use crate::error::{GasWatchError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Thin client for the Etherscan `module/action` API.
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    // An error payload carries a plain string here instead of an object
    #[serde(default)]
    result: serde_json::Value,
}

impl EtherscanClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Calls `module`/`action` and decodes `result` when the payload status is "1".
    pub async fn call<T: DeserializeOwned>(
        &self,
        source: &str,
        module: &str,
        action: &str,
        timeout: Duration,
    ) -> Result<T> {
        let mut query = vec![("module", module), ("action", action)];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("apikey", key));
        }

        let envelope: Envelope = self
            .client
            .get(&self.base_url)
            .query(&query)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if envelope.status != "1" {
            let detail = match &envelope.result {
                serde_json::Value::String(s) if !s.is_empty() => s.clone(),
                _ => String::new(),
            };
            let message = envelope.message.unwrap_or_else(|| "unknown error".to_string());
            return Err(GasWatchError::upstream(
                source,
                if detail.is_empty() {
                    message
                } else {
                    format!("{} ({})", message, detail)
                },
            ));
        }

        serde_json::from_value(envelope.result)
            .map_err(|e| GasWatchError::malformed(source, e.to_string()))
    }
}
