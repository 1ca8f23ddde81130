//! Notification events, consumed by live prompt views.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, NotificationId, Timestamp, UserId};

use super::Notification;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NotificationEvent {
    Created {
        notification: Notification,
        occurred_at: Timestamp,
    },
    Read {
        notification_id: NotificationId,
        user_id: UserId,
        occurred_at: Timestamp,
    },
}

impl NotificationEvent {
    pub fn user_id(&self) -> &UserId {
        match self {
            NotificationEvent::Created { notification, .. } => &notification.user_id,
            NotificationEvent::Read { user_id, .. } => user_id,
        }
    }
}

impl DomainEvent for NotificationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NotificationEvent::Created { .. } => "notification.created",
            NotificationEvent::Read { .. } => "notification.read",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            NotificationEvent::Created { notification, .. } => notification.id.to_string(),
            NotificationEvent::Read {
                notification_id, ..
            } => notification_id.to_string(),
        }
    }

    fn aggregate_type(&self) -> &'static str {
        "Notification"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            NotificationEvent::Created { occurred_at, .. }
            | NotificationEvent::Read { occurred_at, .. } => *occurred_at,
        }
    }
}
