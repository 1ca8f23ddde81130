use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId, UserId};
use crate::domain::notification::Notification;
use crate::ports::NotificationRepository;

use super::InMemoryDocumentStore;

#[async_trait]
impl NotificationRepository for InMemoryDocumentStore {
    async fn create(&self, notification: &Notification) -> Result<(), DomainError> {
        self.check_available()?;
        self.data
            .write()
            .await
            .notifications
            .push(notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.notifications.iter().find(|n| &n.id == id).cloned())
    }

    async fn unread_of_type(
        &self,
        user_id: &UserId,
        notification_type: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        let mut unread: Vec<Notification> = data
            .notifications
            .iter()
            .filter(|n| &n.user_id == user_id && !n.read && n.is_type(notification_type))
            .cloned()
            .collect();
        unread.sort_by(|a, b| b.created_instant().cmp(&a.created_instant()));
        unread.truncate(limit);
        Ok(unread)
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<Notification, DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let notification = data
            .notifications
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::NotificationNotFound,
                    format!("Notification not found: {}", id),
                )
            })?;
        if notification.read {
            return Err(DomainError::new(
                ErrorCode::AlreadyProcessed,
                format!("Notification {} was already read", id),
            )
            .with_detail("notification_id", id.to_string()));
        }
        notification.read = true;
        Ok(notification.clone())
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .notifications
            .iter()
            .filter(|n| &n.user_id == user_id)
            .cloned()
            .collect())
    }
}
