//! SelectServiceHandler - Command handler for a client picking a listing.

use std::sync::Arc;
use tracing::info;

use crate::application::handlers::support::{notify, post_system_message, publish_event};
use crate::domain::conversation::Message;
use crate::domain::engagement::{Engagement, EngagementError, EngagementEvent};
use crate::domain::foundation::{ListingId, Timestamp, UserId};
use crate::domain::notification::{payload, types, Notification};
use crate::ports::{
    ConversationRepository, EngagementRepository, EventPublisher, ListingRepository,
    NotificationRepository,
};

/// Command to select a listing.
#[derive(Debug, Clone)]
pub struct SelectServiceCommand {
    /// The selecting client.
    pub actor_id: UserId,
    pub listing_id: ListingId,
}

/// Result of a successful selection.
#[derive(Debug, Clone)]
pub struct SelectServiceResult {
    pub engagement: Engagement,
    /// The system message posted to the provider, if it could be stored.
    pub message: Option<Message>,
    pub notification: Option<Notification>,
}

/// Handler for service selection.
pub struct SelectServiceHandler {
    listings: Arc<dyn ListingRepository>,
    engagements: Arc<dyn EngagementRepository>,
    conversations: Arc<dyn ConversationRepository>,
    notifications: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    currency_symbol: String,
}

impl SelectServiceHandler {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        engagements: Arc<dyn EngagementRepository>,
        conversations: Arc<dyn ConversationRepository>,
        notifications: Arc<dyn NotificationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            listings,
            engagements,
            conversations,
            notifications,
            event_publisher,
            currency_symbol: "₱".to_string(),
        }
    }

    /// Symbol used when quoting the price in the system message.
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub async fn handle(
        &self,
        cmd: SelectServiceCommand,
    ) -> Result<SelectServiceResult, EngagementError> {
        // 1. Load the listing
        let listing = self
            .listings
            .find_by_id(&cmd.listing_id)
            .await?
            .ok_or_else(|| {
                EngagementError::not_found("Listing", format!("Listing {}", cmd.listing_id))
            })?;

        // 2. Ownership and availability checks happen before any write
        let engagement = Engagement::select(&listing, cmd.actor_id.clone())?;

        // 3. Persist; an open engagement for the same pair is AlreadyProcessed
        self.engagements.insert(&engagement).await?;

        info!(
            engagement_id = %engagement.id,
            listing_id = %listing.id,
            client_id = %engagement.client_id,
            "service selected"
        );

        // 4. Tell the provider
        let text = format!(
            "Client selected {} ({}{})",
            listing.title, self.currency_symbol, listing.price
        );
        let message = post_system_message(
            self.conversations.as_ref(),
            self.event_publisher.as_ref(),
            Message::system(
                engagement.thread_id.clone(),
                engagement.client_id.clone(),
                engagement.provider_id.clone(),
                text.clone(),
                Some(listing.id.clone()),
            ),
            Some(listing.title.clone()),
        )
        .await;

        let notification = notify(
            self.notifications.as_ref(),
            self.event_publisher.as_ref(),
            Notification::new(
                engagement.provider_id.clone(),
                types::SERVICE_SELECTED,
                "New service request",
                text,
                payload([
                    ("serviceId", Some(listing.id.to_string())),
                    ("clientId", Some(engagement.client_id.to_string())),
                    ("engagementId", Some(engagement.id.to_string())),
                ]),
            ),
        )
        .await;

        publish_event(
            self.event_publisher.as_ref(),
            &EngagementEvent::Selected {
                engagement_id: engagement.id.clone(),
                listing_id: listing.id.clone(),
                client_id: engagement.client_id.clone(),
                provider_id: engagement.provider_id.clone(),
                occurred_at: Timestamp::now(),
            },
        )
        .await;

        Ok(SelectServiceResult {
            engagement,
            message,
            notification,
        })
    }
}
