//! RespondToSelectionHandler - Command handler for the provider's accept or
//! decline.
//!
//! Accept commits `Selected -> Accepted` first, then runs the listing
//! compare-and-set, then commits `Accepted -> Reserved`. Once `Accepted` is
//! stored a decline can no longer win, so a reserved listing always belongs
//! to an engagement that is (or will be) `Reserved`. If the reservation
//! fails the engagement is returned to `Selected`; an engagement found
//! already `Accepted` is a previous accept that stopped early and is
//! resumed. Every engagement write is a compare-and-set on status and
//! revision, so of two racing responses exactly one succeeds.

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::handlers::support::{notify, post_system_message, publish_event};
use crate::domain::conversation::Message;
use crate::domain::engagement::{Engagement, EngagementError, EngagementEvent, EngagementStatus};
use crate::domain::foundation::{EngagementId, Timestamp, UserId};
use crate::domain::listing::ServiceListing;
use crate::domain::notification::{payload, types, Notification};
use crate::ports::{
    ConversationRepository, EngagementRepository, EventPublisher, ListingRepository,
    NotificationRepository,
};

pub const ACCEPTED_TEXT: &str = "Request accepted. Please proceed to payment.";
pub const DECLINED_TEXT: &str = "Request declined by the provider.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDecision {
    Accept,
    Decline,
}

/// Command to accept or decline a selection.
#[derive(Debug, Clone)]
pub struct RespondToSelectionCommand {
    /// The responding provider.
    pub actor_id: UserId,
    pub engagement_id: EngagementId,
    pub decision: SelectionDecision,
}

#[derive(Debug, Clone)]
pub struct RespondToSelectionResult {
    pub engagement: Engagement,
    /// The listing after reservation; `None` on decline.
    pub listing: Option<ServiceListing>,
    pub message: Option<Message>,
    pub notification: Option<Notification>,
}

pub struct RespondToSelectionHandler {
    listings: Arc<dyn ListingRepository>,
    engagements: Arc<dyn EngagementRepository>,
    conversations: Arc<dyn ConversationRepository>,
    notifications: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RespondToSelectionHandler {
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
        }
    }

    pub async fn handle(
        &self,
        cmd: RespondToSelectionCommand,
    ) -> Result<RespondToSelectionResult, EngagementError> {
        // 1. Load and authorize
        let stored = self
            .engagements
            .find_by_id(&cmd.engagement_id)
            .await?
            .ok_or_else(|| {
                EngagementError::not_found("Engagement", format!("Engagement {}", cmd.engagement_id))
            })?;
        stored.check_provider(&cmd.actor_id)?;

        let (engagement, listing, text, notification_type, event) = match cmd.decision {
            SelectionDecision::Accept => {
                // 2a. Commit Accepted before touching the listing
                let accepted = if stored.status == EngagementStatus::Accepted {
                    stored.clone()
                } else {
                    let mut accepted = stored.clone();
                    accepted.accept()?;
                    self.engagements.update(&accepted, &stored).await?;
                    accepted
                };

                // 3a. Reservation CAS, then Accepted -> Reserved
                let listing = match self
                    .listings
                    .try_reserve(&accepted.listing_id, &accepted.client_id)
                    .await
                {
                    Ok(listing) => listing,
                    Err(e) => {
                        self.roll_back_accept(&accepted).await;
                        return Err(e.into());
                    }
                };
                let mut engagement = accepted.clone();
                engagement.mark_reserved()?;
                self.engagements.update(&engagement, &accepted).await?;

                info!(
                    engagement_id = %engagement.id,
                    listing_id = %engagement.listing_id,
                    client_id = %engagement.client_id,
                    "selection accepted, listing reserved"
                );
                let event = EngagementEvent::Accepted {
                    engagement_id: engagement.id.clone(),
                    listing_id: engagement.listing_id.clone(),
                    client_id: engagement.client_id.clone(),
                    occurred_at: Timestamp::now(),
                };
                (engagement, Some(listing), ACCEPTED_TEXT, types::SELECTION_ACCEPTED, event)
            }
            SelectionDecision::Decline => {
                // 2b. Selected -> Declined, no reservation
                let mut engagement = stored.clone();
                engagement.decline()?;
                self.engagements.update(&engagement, &stored).await?;

                info!(
                    engagement_id = %engagement.id,
                    listing_id = %engagement.listing_id,
                    "selection declined"
                );
                let event = EngagementEvent::Declined {
                    engagement_id: engagement.id.clone(),
                    listing_id: engagement.listing_id.clone(),
                    client_id: engagement.client_id.clone(),
                    occurred_at: Timestamp::now(),
                };
                (engagement, None, DECLINED_TEXT, types::SELECTION_DECLINED, event)
            }
        };

        // 4. Tell the client
        let message = post_system_message(
            self.conversations.as_ref(),
            self.event_publisher.as_ref(),
            Message::system(
                engagement.thread_id.clone(),
                engagement.provider_id.clone(),
                engagement.client_id.clone(),
                text,
                Some(engagement.listing_id.clone()),
            ),
            listing.as_ref().map(|l| l.title.clone()),
        )
        .await;

        let title = match cmd.decision {
            SelectionDecision::Accept => "Request accepted",
            SelectionDecision::Decline => "Request declined",
        };
        let notification = notify(
            self.notifications.as_ref(),
            self.event_publisher.as_ref(),
            Notification::new(
                engagement.client_id.clone(),
                notification_type,
                title,
                text,
                payload([
                    ("serviceId", Some(engagement.listing_id.to_string())),
                    ("providerId", Some(engagement.provider_id.to_string())),
                    ("engagementId", Some(engagement.id.to_string())),
                ]),
            ),
        )
        .await;

        publish_event(self.event_publisher.as_ref(), &event).await;

        Ok(RespondToSelectionResult {
            engagement,
            listing,
            message,
            notification,
        })
    }

    /// Returns an accepted engagement to `Selected` after a failed
    /// reservation. A lost compare-and-set means another response moved it.
    async fn roll_back_accept(&self, accepted: &Engagement) {
        let mut selected = accepted.clone();
        if selected.revert_accept().is_err() {
            return;
        }
        if let Err(e) = self.engagements.update(&selected, accepted).await {
            warn!(
                engagement_id = %accepted.id,
                error = %e,
                "could not return engagement to selected after a failed reservation"
            );
        }
    }
}
