use crate::error::{GasWatchError, Result};
use crate::models::{Level, NotifyOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BARK_TIMEOUT: Duration = Duration::from_secs(10);

/// Push delivery channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// `true` only when delivery was confirmed. Errors are logged, never returned.
    async fn send(&self, title: &str, body: &str, options: &NotifyOptions) -> bool;
}

/// Bark (https://github.com/Finb/Bark) push client.
pub struct BarkNotifier {
    client: reqwest::Client,
    server_url: String,
    device_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct BarkPush<'a> {
    device_key: &'a str,
    title: &'a str,
    body: &'a str,
    sound: &'a str,
    icon: &'a str,
    group: &'a str,
    level: Level,
    badge: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BarkReply {
    code: i64,
    #[serde(default)]
    message: String,
}

impl BarkNotifier {
    pub fn new(client: reqwest::Client, server_url: &str, device_key: Option<String>) -> Self {
        Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            device_key,
        }
    }

    async fn push(
        &self,
        device_key: &str,
        title: &str,
        body: &str,
        options: &NotifyOptions,
    ) -> Result<()> {
        let payload = BarkPush {
            device_key,
            title,
            body,
            sound: &options.sound,
            icon: &options.icon,
            group: &options.group,
            level: options.level,
            badge: options.badge,
            url: options.url.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/push", self.server_url))
            .json(&payload)
            .timeout(BARK_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        let reply: BarkReply = response
            .json()
            .await
            .map_err(|e| {
                GasWatchError::Notification(format!("unreadable reply ({}): {}", status, e))
            })?;

        if !status.is_success() || reply.code != 200 {
            return Err(GasWatchError::Notification(format!(
                "Bark rejected push: code {} {}",
                reply.code, reply.message
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    async fn send(&self, title: &str, body: &str, options: &NotifyOptions) -> bool {
        let Some(device_key) = self.device_key.as_deref() else {
            tracing::info!("Bark is not configured, skipping notification");
            return false;
        };

        match self.push(device_key, title, body, options).await {
            Ok(()) => {
                tracing::info!("Notification sent: {}", title);
                true
            }
            Err(e) => {
                tracing::error!("Failed to send notification: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_unconfigured_is_noop() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/push").expect(0).create_async().await;

        let notifier = BarkNotifier::new(reqwest::Client::new(), &server.url(), None);
        assert!(!notifier.send("title", "body", &NotifyOptions::default()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_low_gas_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/push")
            .match_body(Matcher::Json(json!({
                "device_key": "device123",
                "title": "Gas price is low!",
                "body": "cheap",
                "sound": "bell",
                "icon": "🚀",
                "group": "gas-tracker",
                "level": "critical",
                "badge": 1
            })))
            .with_status(200)
            .with_body(r#"{"code":200,"message":"success","timestamp":1700000000}"#)
            .create_async()
            .await;

        let notifier = BarkNotifier::new(
            reqwest::Client::new(),
            &format!("{}/", server.url()),
            Some("device123".to_string()),
        );
        assert!(notifier.send("Gas price is low!", "cheap", &NotifyOptions::low_gas()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_default_options_and_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/push")
            .match_body(Matcher::PartialJson(json!({
                "icon": "⛽",
                "level": "active",
                "url": "https://etherscan.io/gastracker"
            })))
            .with_status(200)
            .with_body(r#"{"code":200,"message":"success"}"#)
            .create_async()
            .await;

        let notifier = BarkNotifier::new(reqwest::Client::new(), &server.url(), Some("k".into()));
        let options = NotifyOptions {
            url: Some("https://etherscan.io/gastracker".to_string()),
            ..Default::default()
        };
        assert!(notifier.send("t", "b", &options).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delivery_errors_report_false() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/push")
            .with_status(400)
            .with_body(r#"{"code":400,"message":"failed to get device token"}"#)
            .create_async()
            .await;

        let notifier = BarkNotifier::new(reqwest::Client::new(), &server.url(), Some("bad".into()));
        assert!(!notifier.send("t", "b", &NotifyOptions::default()).await);
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_false() {
        let notifier = BarkNotifier::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            Some("k".into()),
        );
        assert!(!notifier.send("t", "b", &NotifyOptions::default()).await);
    }
}
