//! Notification transport port.
//!
//! Delivery is fire-and-forget from the raid engine's point of view: the
//! notification worker logs transport errors and moves on.

use async_trait::async_trait;
use raid_core::{CharacterId, RaidId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RaidIncoming,
    RaidCancelled,
    RaidResult,
    RaidDefended,
}

/// Message addressed to one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: CharacterId,
    pub kind: NotificationKind,
    pub message: String,
    /// Client deep link to the raid.
    pub link: String,
}

impl Notification {
    pub fn new(
        recipient: CharacterId,
        kind: NotificationKind,
        message: impl Into<String>,
        raid: RaidId,
    ) -> Self {
        Self {
            recipient,
            kind,
            message: message.into(),
            link: format!("/raids/{}", raid.0),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("recipient {0} is unreachable")]
    Unreachable(CharacterId),

    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Delivers notifications to players.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Transport that only writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn notify(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            recipient = %notification.recipient,
            kind = ?notification.kind,
            link = %notification.link,
            "{}",
            notification.message
        );
        Ok(())
    }
}
