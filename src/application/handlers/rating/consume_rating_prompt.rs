//! ConsumeRatingPromptHandler - marks a displayed prompt read, exactly once.

use std::sync::Arc;
use tracing::info;

use crate::application::handlers::support::publish_event;
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{NotificationId, Timestamp, UserId};
use crate::domain::notification::{types, Notification, NotificationEvent};
use crate::ports::{EventPublisher, NotificationRepository};

#[derive(Debug, Clone)]
pub struct ConsumeRatingPromptCommand {
    pub actor_id: UserId,
    pub notification_id: NotificationId,
}

#[derive(Debug, Clone)]
pub struct ConsumeRatingPromptResult {
    pub notification: Notification,
}

pub struct ConsumeRatingPromptHandler {
    notifications: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ConsumeRatingPromptHandler {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            notifications,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConsumeRatingPromptCommand,
    ) -> Result<ConsumeRatingPromptResult, EngagementError> {
        // 1. Load and check ownership
        let notification = self
            .notifications
            .find_by_id(&cmd.notification_id)
            .await?
            .ok_or_else(|| {
                EngagementError::not_found(
                    "Notification",
                    format!("Notification {}", cmd.notification_id),
                )
            })?;
        if notification.user_id != cmd.actor_id {
            return Err(EngagementError::authorization(
                "Only the recipient may consume this prompt",
            ));
        }
        if !notification.is_type(types::PAYMENT_CONFIRMED_RATING) {
            return Err(EngagementError::validation(
                "notification_id",
                format!("Notification {} is not a rating prompt", notification.id),
            ));
        }

        // 2. Mark read; a second consume is AlreadyProcessed
        let notification = self.notifications.mark_read(&notification.id).await?;
        info!(notification_id = %notification.id, user_id = %notification.user_id, "rating prompt consumed");

        publish_event(
            self.event_publisher.as_ref(),
            &NotificationEvent::Read {
                notification_id: notification.id.clone(),
                user_id: notification.user_id.clone(),
                occurred_at: Timestamp::now(),
            },
        )
        .await;

        Ok(ConsumeRatingPromptResult { notification })
    }
}
