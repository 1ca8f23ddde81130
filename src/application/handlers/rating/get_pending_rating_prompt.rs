//! GetPendingRatingPromptHandler - Query handler for the prompt to show.

use std::sync::Arc;

use crate::domain::engagement::EngagementError;
use crate::domain::foundation::UserId;
use crate::domain::notification::rating_trigger::most_relevant;
use crate::domain::notification::{types, Notification, RatingPrompt};
use crate::ports::NotificationRepository;

#[derive(Debug, Clone)]
pub struct GetPendingRatingPromptQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct GetPendingRatingPromptResult {
    /// The most recently created unread prompt.
    pub notification: Option<Notification>,
    pub prompt: Option<RatingPrompt>,
}

pub struct GetPendingRatingPromptHandler {
    notifications: Arc<dyn NotificationRepository>,
}

impl GetPendingRatingPromptHandler {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    pub async fn handle(
        &self,
        query: GetPendingRatingPromptQuery,
    ) -> Result<GetPendingRatingPromptResult, EngagementError> {
        let unread = self
            .notifications
            .unread_of_type(&query.user_id, types::PAYMENT_CONFIRMED_RATING, 1)
            .await?;
        let notification = most_relevant(&unread).cloned();
        let prompt = notification.as_ref().and_then(RatingPrompt::from_notification);
        Ok(GetPendingRatingPromptResult { notification, prompt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};

    fn query(id: &str) -> GetPendingRatingPromptQuery {
        GetPendingRatingPromptQuery { user_id: user(id) }
    }

    #[tokio::test]
    async fn nothing_pending_before_confirmation() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        fx.submitted("alice", "L1").await;

        let result = fx.pending_prompt_handler().handle(query("alice")).await.unwrap();

        assert!(result.notification.is_none());
        assert!(result.prompt.is_none());
    }

    #[tokio::test]
    async fn client_sees_prompt_for_confirmed_payment() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;

        let result = fx.pending_prompt_handler().handle(query("alice")).await.unwrap();

        let prompt = result.prompt.unwrap();
        assert_eq!(Some(prompt.transaction_id), engagement.transaction_id);
        assert_eq!(prompt.provider_id, user("bob"));
        assert!(fx.pending_prompt_handler().handle(query("bob")).await.unwrap().prompt.is_none());
    }

    #[tokio::test]
    async fn newest_prompt_wins_when_several_are_unread() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        fx.listing("L2", "bob", "Wiring", 400).await;
        fx.confirmed("alice", "L1").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = fx.confirmed("alice", "L2").await;

        let result = fx.pending_prompt_handler().handle(query("alice")).await.unwrap();

        assert_eq!(Some(result.prompt.unwrap().transaction_id), second.transaction_id);
        assert_eq!(fx.unread_prompts("alice").await.len(), 2);
    }
}
