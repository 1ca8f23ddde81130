//! Rating prompt view: the one prompt a client should currently see.

use std::sync::Arc;

use crate::domain::foundation::{EventEnvelope, NotificationId, UserId};
use crate::domain::notification::rating_trigger::most_relevant;
use crate::domain::notification::{types, Notification, NotificationEvent, RatingPrompt};

use super::Projection;

#[derive(Debug, Clone, PartialEq)]
pub struct RatingPromptSnapshot {
    pub user_id: UserId,
    unread: Arc<Vec<Notification>>,
    /// Most recently created unread prompt.
    pub current: Option<Notification>,
}

impl RatingPromptSnapshot {
    pub fn prompt(&self) -> Option<RatingPrompt> {
        self.current.as_ref().and_then(RatingPrompt::from_notification)
    }

    pub fn unread_count(&self) -> usize {
        self.unread.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatingPromptChange {
    Created(Notification),
    Read(NotificationId),
}

impl RatingPromptChange {
    pub fn from_event(event: &EventEnvelope) -> Option<Self> {
        match event.payload_as::<NotificationEvent>().ok()? {
            NotificationEvent::Created { notification, .. } => {
                Some(RatingPromptChange::Created(notification))
            }
            NotificationEvent::Read {
                notification_id, ..
            } => Some(RatingPromptChange::Read(notification_id)),
        }
    }
}

pub struct RatingPromptView;

impl RatingPromptView {
    pub fn initial(user_id: UserId, unread: Vec<Notification>) -> RatingPromptSnapshot {
        let unread: Vec<Notification> = unread
            .into_iter()
            .filter(|n| is_live_prompt(n, &user_id))
            .collect();
        build(user_id, unread)
    }

    pub fn apply(snapshot: &RatingPromptSnapshot, change: RatingPromptChange) -> RatingPromptSnapshot {
        let mut unread = snapshot.unread.as_ref().clone();
        match change {
            RatingPromptChange::Created(notification) => {
                if !is_live_prompt(&notification, &snapshot.user_id)
                    || unread.iter().any(|n| n.id == notification.id)
                {
                    return snapshot.clone();
                }
                unread.push(notification);
            }
            RatingPromptChange::Read(id) => {
                let before = unread.len();
                unread.retain(|n| n.id != id);
                if unread.len() == before {
                    return snapshot.clone();
                }
            }
        }
        build(snapshot.user_id.clone(), unread)
    }
}

fn is_live_prompt(notification: &Notification, user_id: &UserId) -> bool {
    &notification.user_id == user_id
        && !notification.read
        && notification.is_type(types::PAYMENT_CONFIRMED_RATING)
}

fn build(user_id: UserId, unread: Vec<Notification>) -> RatingPromptSnapshot {
    let current = most_relevant(&unread).cloned();
    RatingPromptSnapshot {
        user_id,
        unread: Arc::new(unread),
        current,
    }
}

/// Keeps a [`RatingPromptSnapshot`] current from notification events.
pub struct RatingPromptProjection;

impl Projection for RatingPromptProjection {
    type Snapshot = RatingPromptSnapshot;

    const EVENT_TYPES: &'static [&'static str] = &["notification.created", "notification.read"];

    fn reduce(
        &self,
        snapshot: &RatingPromptSnapshot,
        event: &EventEnvelope,
    ) -> Option<RatingPromptSnapshot> {
        let change = RatingPromptChange::from_event(event)?;
        let next = RatingPromptView::apply(snapshot, change);
        (next != *snapshot).then_some(next)
    }
}
