//! Notification repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, NotificationId, UserId};
use crate::domain::notification::Notification;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError>;

    /// Unread notifications of one type for a user, newest first, at most
    /// `limit`.
    async fn unread_of_type(
        &self,
        user_id: &UserId,
        notification_type: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, DomainError>;

    /// Marks a notification read.
    ///
    /// # Errors
    ///
    /// - `NotificationNotFound` if it does not exist
    /// - `AlreadyProcessed` if it was already read
    async fn mark_read(&self, id: &NotificationId) -> Result<Notification, DomainError>;

    /// Every notification addressed to the user.
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, DomainError>;
}
