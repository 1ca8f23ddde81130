//! ResolveListingHandler - the provider's post-payment choice for a listing.
//!
//! The engagement records the choice before the listing is released or
//! retired. If the listing step fails, repeating the same command finishes
//! it; any other repeat is `AlreadyProcessed`.

use std::sync::Arc;
use tracing::info;

use crate::application::handlers::support::publish_event;
use crate::domain::engagement::{Engagement, EngagementError, EngagementEvent, EngagementStatus};
use crate::domain::foundation::{EngagementId, Timestamp, UserId};
use crate::domain::listing::ServiceListing;
use crate::ports::{EngagementRepository, EventPublisher, ListingRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingResolution {
    /// Clear the reservation, keep the listing active.
    MakeAvailable,
    /// Retire the listing. Creating its successor is up to the caller.
    Replace,
}

#[derive(Debug, Clone)]
pub struct ResolveListingCommand {
    pub actor_id: UserId,
    pub engagement_id: EngagementId,
    pub resolution: ListingResolution,
}

#[derive(Debug, Clone)]
pub struct ResolveListingResult {
    pub engagement: Engagement,
    pub listing: ServiceListing,
}

pub struct ResolveListingHandler {
    listings: Arc<dyn ListingRepository>,
    engagements: Arc<dyn EngagementRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ResolveListingHandler {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        engagements: Arc<dyn EngagementRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            listings,
            engagements,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ResolveListingCommand,
    ) -> Result<ResolveListingResult, EngagementError> {
        // 1. Load and authorize
        let stored = self
            .engagements
            .find_by_id(&cmd.engagement_id)
            .await?
            .ok_or_else(|| {
                EngagementError::not_found("Engagement", format!("Engagement {}", cmd.engagement_id))
            })?;
        stored.check_provider(&cmd.actor_id)?;

        // 2. A recorded choice whose listing step never ran is finished first
        let recorded = match stored.status {
            EngagementStatus::MadeAvailable => Some(ListingResolution::MakeAvailable),
            EngagementStatus::Replaced => Some(ListingResolution::Replace),
            _ => None,
        };
        if let Some(recorded) = recorded {
            if self.listing_step_pending(&stored, recorded).await? {
                let listing = self.apply(&stored, recorded).await?;
                if recorded == cmd.resolution {
                    return Ok(ResolveListingResult {
                        engagement: stored,
                        listing,
                    });
                }
            }
            return Err(EngagementError::AlreadyProcessed(format!(
                "Engagement {} is already {}",
                stored.id, stored.status
            )));
        }

        // 3. Transition; only legal from PaymentConfirmed or RatingRequested
        let mut engagement = stored.clone();
        match cmd.resolution {
            ListingResolution::MakeAvailable => engagement.make_available()?,
            ListingResolution::Replace => engagement.replace()?,
        }
        self.engagements.update(&engagement, &stored).await?;

        // 4. Apply to the listing
        let listing = self.apply(&engagement, cmd.resolution).await?;

        Ok(ResolveListingResult { engagement, listing })
    }

    async fn apply(
        &self,
        engagement: &Engagement,
        resolution: ListingResolution,
    ) -> Result<ServiceListing, EngagementError> {
        let (listing, event) = match resolution {
            ListingResolution::MakeAvailable => {
                let listing = self.listings.release(&engagement.listing_id).await?;
                let event = EngagementEvent::ListingReleased {
                    engagement_id: engagement.id.clone(),
                    listing_id: listing.id.clone(),
                    occurred_at: Timestamp::now(),
                };
                (listing, event)
            }
            ListingResolution::Replace => {
                let listing = self.listings.retire(&engagement.listing_id).await?;
                let event = EngagementEvent::ListingReplaced {
                    engagement_id: engagement.id.clone(),
                    listing_id: listing.id.clone(),
                    occurred_at: Timestamp::now(),
                };
                (listing, event)
            }
        };

        info!(
            engagement_id = %engagement.id,
            listing_id = %listing.id,
            status = %engagement.status,
            "listing resolved"
        );

        publish_event(self.event_publisher.as_ref(), &event).await;
        Ok(listing)
    }

    /// True if the listing still shows the state from before `resolution`.
    /// A released listing the same client has since reserved again through
    /// a new engagement does not count.
    async fn listing_step_pending(
        &self,
        engagement: &Engagement,
        resolution: ListingResolution,
    ) -> Result<bool, EngagementError> {
        let Some(listing) = self.listings.find_by_id(&engagement.listing_id).await? else {
            return Ok(false);
        };
        Ok(match resolution {
            ListingResolution::MakeAvailable => {
                listing.reserved_by.as_ref() == Some(&engagement.client_id)
                    && self
                        .engagements
                        .find_open(&engagement.client_id, &engagement.listing_id)
                        .await?
                        .is_none()
            }
            ListingResolution::Replace => listing.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};

    fn resolve(actor: &str, engagement: &Engagement, resolution: ListingResolution) -> ResolveListingCommand {
        ResolveListingCommand {
            actor_id: user(actor),
            engagement_id: engagement.id.clone(),
            resolution,
        }
    }

    #[tokio::test]
    async fn make_available_clears_reservation_and_keeps_listing_active() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;

        let result = fx
            .resolve_handler()
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap();

        assert_eq!(result.engagement.status, EngagementStatus::MadeAvailable);
        assert!(!result.listing.is_reserved);
        assert_eq!(result.listing.reserved_by, None);
        assert!(result.listing.active);
        assert!(fx.bus.has_event("engagement.listing_released"));
    }

    #[tokio::test]
    async fn replace_retires_listing() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;

        let result = fx
            .resolve_handler()
            .handle(resolve("bob", &engagement, ListingResolution::Replace))
            .await
            .unwrap();

        assert_eq!(result.engagement.status, EngagementStatus::Replaced);
        assert!(!result.listing.active);
        assert!(fx.bus.has_event("engagement.listing_replaced"));
    }

    #[tokio::test]
    async fn resolving_before_payment_is_invalid_state() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.reserved("alice", "L1").await;

        let err = fx
            .resolve_handler()
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::InvalidState(_)));
        assert!(fx.stored_listing("L1").await.is_reserved);
    }

    #[tokio::test]
    async fn second_resolution_is_already_processed() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;
        let handler = fx.resolve_handler();
        handler
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap();

        let err = handler
            .handle(resolve("bob", &engagement, ListingResolution::Replace))
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::AlreadyProcessed(_)));
        assert!(fx.stored_listing("L1").await.active);
    }

    #[tokio::test]
    async fn client_cannot_resolve() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;

        let err = fx
            .resolve_handler()
            .handle(resolve("alice", &engagement, ListingResolution::Replace))
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::Authorization(_)));
    }

    #[tokio::test]
    async fn failed_release_is_finished_by_a_retry() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;
        let handler = fx.resolve_handler();
        fx.listings.fail_resolve(true);

        let err = handler
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::StoreUnavailable(_)));
        assert_eq!(
            fx.stored_engagement(&engagement.id).await.status,
            EngagementStatus::MadeAvailable
        );
        assert!(fx.stored_listing("L1").await.is_reserved);

        fx.listings.fail_resolve(false);
        let result = handler
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap();
        assert_eq!(result.engagement.status, EngagementStatus::MadeAvailable);
        assert!(!result.listing.is_reserved);
        assert!(fx.bus.has_event("engagement.listing_released"));

        let err = handler
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::AlreadyProcessed(_)));
    }

    #[tokio::test]
    async fn failed_retire_is_finished_by_a_retry() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;
        let handler = fx.resolve_handler();
        fx.listings.fail_resolve(true);

        handler
            .handle(resolve("bob", &engagement, ListingResolution::Replace))
            .await
            .unwrap_err();
        assert!(fx.stored_listing("L1").await.active);

        fx.listings.fail_resolve(false);
        let err = handler
            .handle(resolve("bob", &engagement, ListingResolution::MakeAvailable))
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::AlreadyProcessed(_)));
        let listing = fx.stored_listing("L1").await;
        assert!(!listing.active);

        let err = handler
            .handle(resolve("bob", &engagement, ListingResolution::Replace))
            .await
            .unwrap_err();
        assert!(matches!(err, EngagementError::AlreadyProcessed(_)));
    }
}
