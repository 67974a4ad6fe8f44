//! WeChat Work group-robot webhook

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::notify::{Notifier, NotifyError, NotifyResult};

/// Whole-request timeout for one delivery
const WEBHOOK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    msgtype: &'static str,
    text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    content: &'a str,
}

/// `{"errcode":0,"errmsg":"ok"}`
#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Posts text messages to a WeChat Work robot webhook URL.
pub struct WechatNotifier {
    webhook_url: String,
    http: reqwest::Client,
}

impl WechatNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            webhook_url: webhook_url.into(),
            http,
        }
    }

    /// Send one connectivity check message to the webhook.
    pub async fn send_check_message(&self) -> NotifyResult<()> {
        self.deliver(&check_message(Utc::now())).await
    }
}

/// Body of the connectivity check message.
pub fn check_message(sent_at: DateTime<Utc>) -> String {
    format!(
        "Funding monitor webhook check\n\n\
         If this message arrived, the robot webhook is configured correctly.\n\n\
         Time: {} UTC",
        sent_at.format("%Y-%m-%d %H:%M:%S")
    )
}

#[async_trait]
impl Notifier for WechatNotifier {
    fn name(&self) -> &'static str {
        "wechat"
    }

    async fn deliver(&self, text: &str) -> NotifyResult<()> {
        let body = TextMessage {
            msgtype: "text",
            text: TextContent { content: text },
        };

        let response = self.http.post(&self.webhook_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        // Unparseable replies are accepted, the HTTP status already said OK
        let raw = response.text().await.unwrap_or_default();
        if let Ok(reply) = serde_json::from_str::<WebhookReply>(&raw) {
            if reply.errcode != 0 {
                return Err(NotifyError::Api {
                    code: reply.errcode,
                    message: reply.errmsg,
                });
            }
        }

        debug!(notifier = "wechat", bytes = text.len(), "Message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const HOOK_PATH: &str = "/cgi-bin/webhook/send?key=test-key";

    fn notifier_for(server: &mockito::Server) -> WechatNotifier {
        WechatNotifier::new(format!("{}{}", server.url(), HOOK_PATH))
    }

    #[tokio::test]
    async fn test_deliver_posts_text_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", HOOK_PATH)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "msgtype": "text",
                "text": {"content": "hello"}
            })))
            .with_status(200)
            .with_body(r#"{"errcode":0,"errmsg":"ok"}"#)
            .create_async()
            .await;

        notifier_for(&server).deliver("hello").await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_check_message_text() {
        let sent_at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let text = check_message(sent_at);
        assert!(text.starts_with("Funding monitor webhook check"));
        assert!(text.ends_with("Time: 2023-11-14 22:13:20 UTC"));
    }

    #[tokio::test]
    async fn test_send_check_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", HOOK_PATH)
            .match_body(Matcher::Regex("webhook check".to_string()))
            .with_status(200)
            .with_body(r#"{"errcode":0,"errmsg":"ok"}"#)
            .expect(1)
            .create_async()
            .await;

        notifier_for(&server).send_check_message().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_deliver_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", HOOK_PATH)
            .with_status(500)
            .create_async()
            .await;

        match notifier_for(&server).deliver("hello").await {
            Err(NotifyError::Rejected(status)) => assert_eq!(status, 500),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deliver_errcode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", HOOK_PATH)
            .with_status(200)
            .with_body(r#"{"errcode":93000,"errmsg":"invalid webhook url"}"#)
            .create_async()
            .await;

        assert!(matches!(
            notifier_for(&server).deliver("hello").await,
            Err(NotifyError::Api { code: 93000, .. })
        ));
    }

    #[tokio::test]
    async fn test_deliver_unreachable() {
        let notifier = WechatNotifier::new("http://127.0.0.1:1/cgi-bin/webhook/send");
        assert!(matches!(
            notifier.deliver("hello").await,
            Err(NotifyError::RequestFailed(_))
        ));
    }
}
