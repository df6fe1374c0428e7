//! Push notifications

use crate::config::schema::PushConfig;
use crate::error::SwcacheResult;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

/// Metadata attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch when the push arrived
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A notification built from a push message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

impl Notification {
    /// Build a notification for a push payload. A missing payload gives an
    /// empty body; invalid UTF-8 is replaced lossily.
    pub fn from_push(config: &PushConfig, payload: Option<&[u8]>) -> Self {
        let body = payload
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();

        Self {
            title: config.title.clone(),
            body,
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: Utc::now().timestamp_millis(),
                primary_key: 1,
            },
        }
    }
}

/// Displays notifications on behalf of the worker
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> SwcacheResult<()>;
}

/// Notifier that writes notifications to the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn show(&self, notification: &Notification) -> SwcacheResult<()> {
        info!(
            title = %notification.title,
            icon = %notification.icon,
            "Notification: {}",
            notification.body
        );
        Ok(())
    }
}
