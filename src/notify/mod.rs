//! Outbound notification transports
//!
//! The monitor hands each cycle's digest to a `Notifier`. Delivery failures
//! are reported to the caller and never retried.

pub mod wechat;

use async_trait::async_trait;
use thiserror::Error;

pub use wechat::WechatNotifier;

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Request could not be sent or timed out
    #[error("Webhook request failed: {0}")]
    RequestFailed(String),

    /// Webhook answered with a non-success HTTP status
    #[error("Webhook rejected message with HTTP {0}")]
    Rejected(u16),

    /// Webhook accepted the request but reported an application error
    #[error("Webhook error {code}: {message}")]
    Api { code: i64, message: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::RequestFailed(err.to_string())
    }
}

/// Result type alias for notification delivery
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// A transport for digest messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Transport identifier used in logs
    fn name(&self) -> &'static str;

    /// Deliver one plain-text message
    async fn deliver(&self, text: &str) -> NotifyResult<()>;
}
