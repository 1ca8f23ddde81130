//! Shared wiring for handler tests: the in-memory store and bus plus doubles
//! for the collaborators tests need to fail or slow down on demand.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::adapters::{InMemoryDocumentStore, InMemoryEventBus};
use crate::application::handlers::engagement::{
    RespondToSelectionCommand, RespondToSelectionHandler, ResolveListingHandler,
    SelectServiceCommand, SelectServiceHandler, SelectionDecision,
};
use crate::application::handlers::payment::{
    ConfirmPaymentCommand, ConfirmPaymentHandler, SubmitPaymentProofCommand,
    SubmitPaymentProofHandler, SubmitPaymentProofResult,
};
use crate::application::handlers::rating::{
    ConsumeRatingPromptHandler, GetPendingRatingPromptHandler, SubmitReviewHandler,
};
use crate::application::handlers::revenue::GetRevenueReportHandler;
use crate::domain::conversation::Message;
use crate::domain::engagement::Engagement;
use crate::domain::foundation::{
    DomainError, EngagementId, ErrorCode, ListingId, MessageId, Money, NotificationId, ThreadId,
    UserId,
};
use crate::domain::listing::ServiceListing;
use crate::domain::notification::Notification;
use crate::domain::payment::{ProofUpload, ProviderStats};
use crate::ports::{
    ArtifactUploader, ConversationRepository, EngagementRepository, ListingRepository,
    NotificationRepository, PaymentLedger, UploadedArtifact,
};

pub(crate) fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub(crate) fn listing_id(id: &str) -> ListingId {
    ListingId::new(id).unwrap()
}

/// A small valid PNG proof.
pub(crate) fn proof() -> ProofUpload {
    ProofUpload::new("receipt.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a])
}

/// Records uploads and hands out distinct URLs.
pub(crate) struct RecordingUploader {
    uploads: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingUploader {
    fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail_uploads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub(crate) fn folders(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(folder, _)| folder.clone())
            .collect()
    }
}

#[async_trait]
impl ArtifactUploader for RecordingUploader {
    async fn upload(
        &self,
        file: &ProofUpload,
        folder: &str,
    ) -> Result<UploadedArtifact, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::UploadFailed, "Simulated upload failure"));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((folder.to_string(), file.file_name.clone()));
        Ok(UploadedArtifact {
            url: format!("https://cdn.example/{}/{}-{}", folder, uploads.len(), file.file_name),
        })
    }
}

/// Notification store whose creates can be switched to fail.
pub(crate) struct FlakyNotifications {
    inner: InMemoryDocumentStore,
    fail_creates: AtomicBool,
}

impl FlakyNotifications {
    pub(crate) fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationRepository for FlakyNotifications {
    async fn create(&self, notification: &Notification) -> Result<(), DomainError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(DomainError::store_unavailable("Simulated notification failure"));
        }
        self.inner.create(notification).await
    }

    async fn find_by_id(&self, id: &NotificationId) -> Result<Option<Notification>, DomainError> {
        NotificationRepository::find_by_id(&self.inner, id).await
    }

    async fn unread_of_type(
        &self,
        user_id: &UserId,
        notification_type: &str,
        limit: usize,
    ) -> Result<Vec<Notification>, DomainError> {
        self.inner.unread_of_type(user_id, notification_type, limit).await
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<Notification, DomainError> {
        self.inner.mark_read(id).await
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, DomainError> {
        self.inner.for_user(user_id).await
    }
}

/// Listing store whose writes can be switched to fail and whose
/// reservations can be held back.
pub(crate) struct FlakyListings {
    inner: InMemoryDocumentStore,
    fail_reserve: AtomicBool,
    fail_resolve: AtomicBool,
    reserve_delay_ms: AtomicU64,
}

impl FlakyListings {
    pub(crate) fn fail_reserve(&self, fail: bool) {
        self.fail_reserve.store(fail, Ordering::SeqCst);
    }

    /// Fails `release` and `retire`.
    pub(crate) fn fail_resolve(&self, fail: bool) {
        self.fail_resolve.store(fail, Ordering::SeqCst);
    }

    /// Sleeps before each reservation compare-and-set.
    pub(crate) fn delay_reserve(&self, delay: Duration) {
        self.reserve_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), DomainError> {
        if flag.load(Ordering::SeqCst) {
            return Err(DomainError::store_unavailable("Simulated listing failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListingRepository for FlakyListings {
    async fn save(&self, listing: &ServiceListing) -> Result<(), DomainError> {
        ListingRepository::save(&self.inner, listing).await
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<ServiceListing>, DomainError> {
        ListingRepository::find_by_id(&self.inner, id).await
    }

    async fn try_reserve(
        &self,
        id: &ListingId,
        client_id: &UserId,
    ) -> Result<ServiceListing, DomainError> {
        let delay = self.reserve_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Self::check(&self.fail_reserve)?;
        self.inner.try_reserve(id, client_id).await
    }

    async fn release(&self, id: &ListingId) -> Result<ServiceListing, DomainError> {
        Self::check(&self.fail_resolve)?;
        self.inner.release(id).await
    }

    async fn retire(&self, id: &ListingId) -> Result<ServiceListing, DomainError> {
        Self::check(&self.fail_resolve)?;
        self.inner.retire(id).await
    }

    async fn find_by_provider(
        &self,
        provider_id: &UserId,
    ) -> Result<Vec<ServiceListing>, DomainError> {
        self.inner.find_by_provider(provider_id).await
    }
}

/// Engagement store whose updates can be switched to fail.
pub(crate) struct FlakyEngagements {
    inner: InMemoryDocumentStore,
    fail_updates: AtomicBool,
}

impl FlakyEngagements {
    pub(crate) fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngagementRepository for FlakyEngagements {
    async fn insert(&self, engagement: &Engagement) -> Result<(), DomainError> {
        EngagementRepository::insert(&self.inner, engagement).await
    }

    async fn update(&self, engagement: &Engagement, expected: &Engagement) -> Result<(), DomainError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::store_unavailable("Simulated engagement failure"));
        }
        self.inner.update(engagement, expected).await
    }

    async fn find_by_id(&self, id: &EngagementId) -> Result<Option<Engagement>, DomainError> {
        EngagementRepository::find_by_id(&self.inner, id).await
    }

    async fn find_open(
        &self,
        client_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<Option<Engagement>, DomainError> {
        self.inner.find_open(client_id, listing_id).await
    }

    async fn open_between(
        &self,
        client_id: &UserId,
        provider_id: &UserId,
    ) -> Result<Vec<Engagement>, DomainError> {
        self.inner.open_between(client_id, provider_id).await
    }

    async fn find_by_payment_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Engagement>, DomainError> {
        self.inner.find_by_payment_message(message_id).await
    }
}

pub(crate) struct Fixture {
    pub store: Arc<InMemoryDocumentStore>,
    pub listings: Arc<FlakyListings>,
    pub engagements: Arc<FlakyEngagements>,
    pub notifications: Arc<FlakyNotifications>,
    pub bus: Arc<InMemoryEventBus>,
    pub uploader: Arc<RecordingUploader>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let store = InMemoryDocumentStore::new();
        Self {
            listings: Arc::new(FlakyListings {
                inner: store.clone(),
                fail_reserve: AtomicBool::new(false),
                fail_resolve: AtomicBool::new(false),
                reserve_delay_ms: AtomicU64::new(0),
            }),
            engagements: Arc::new(FlakyEngagements {
                inner: store.clone(),
                fail_updates: AtomicBool::new(false),
            }),
            notifications: Arc::new(FlakyNotifications {
                inner: store.clone(),
                fail_creates: AtomicBool::new(false),
            }),
            store: Arc::new(store),
            bus: Arc::new(InMemoryEventBus::new()),
            uploader: Arc::new(RecordingUploader::new()),
        }
    }

    // Handlers

    pub(crate) fn select_handler(&self) -> SelectServiceHandler {
        SelectServiceHandler::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.notifications.clone(),
            self.bus.clone(),
        )
    }

    pub(crate) fn respond_handler(&self) -> RespondToSelectionHandler {
        RespondToSelectionHandler::new(
            self.listings.clone(),
            self.engagements.clone(),
            self.store.clone(),
            self.notifications.clone(),
            self.bus.clone(),
        )
    }

    pub(crate) fn resolve_handler(&self) -> ResolveListingHandler {
        ResolveListingHandler::new(
            self.listings.clone(),
            self.engagements.clone(),
            self.bus.clone(),
        )
    }

    pub(crate) fn submit_proof_handler(&self) -> SubmitPaymentProofHandler {
        SubmitPaymentProofHandler::new(
            self.engagements.clone(),
            self.listings.clone(),
            self.store.clone(),
            self.store.clone(),
            self.notifications.clone(),
            self.uploader.clone(),
            self.bus.clone(),
        )
    }

    pub(crate) fn confirm_handler(&self) -> ConfirmPaymentHandler {
        ConfirmPaymentHandler::new(
            self.store.clone(),
            self.engagements.clone(),
            self.store.clone(),
            self.notifications.clone(),
            self.bus.clone(),
        )
    }

    pub(crate) fn pending_prompt_handler(&self) -> GetPendingRatingPromptHandler {
        GetPendingRatingPromptHandler::new(self.notifications.clone())
    }

    pub(crate) fn consume_prompt_handler(&self) -> ConsumeRatingPromptHandler {
        ConsumeRatingPromptHandler::new(self.notifications.clone(), self.bus.clone())
    }

    pub(crate) fn review_handler(&self) -> SubmitReviewHandler {
        SubmitReviewHandler::new(
            self.store.clone(),
            self.store.clone(),
            self.notifications.clone(),
            self.bus.clone(),
        )
    }

    pub(crate) fn report_handler(&self) -> GetRevenueReportHandler {
        GetRevenueReportHandler::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }

    // Seeding

    pub(crate) async fn listing(
        &self,
        id: &str,
        provider: &str,
        title: &str,
        price: u64,
    ) -> ServiceListing {
        let listing = ServiceListing::new(listing_id(id), user(provider), title, Money::from_major(price));
        ListingRepository::save(self.store.as_ref(), &listing).await.unwrap();
        listing
    }

    pub(crate) async fn reserve(&self, listing: &str, client: &str) -> ServiceListing {
        self.store
            .try_reserve(&listing_id(listing), &user(client))
            .await
            .unwrap()
    }

    /// Runs the workflow up to `Selected`.
    pub(crate) async fn selected(&self, client: &str, listing: &str) -> Engagement {
        self.select_handler()
            .handle(SelectServiceCommand {
                actor_id: user(client),
                listing_id: listing_id(listing),
            })
            .await
            .unwrap()
            .engagement
    }

    /// Runs the workflow up to `Reserved`.
    pub(crate) async fn reserved(&self, client: &str, listing: &str) -> Engagement {
        let engagement = self.selected(client, listing).await;
        self.respond_handler()
            .handle(RespondToSelectionCommand {
                actor_id: engagement.provider_id.clone(),
                engagement_id: engagement.id.clone(),
                decision: SelectionDecision::Accept,
            })
            .await
            .unwrap()
            .engagement
    }

    /// Runs the workflow up to `PaymentSubmitted`, paying the listing price.
    pub(crate) async fn submitted(&self, client: &str, listing: &str) -> SubmitPaymentProofResult {
        let engagement = self.reserved(client, listing).await;
        self.resubmit(&engagement).await
    }

    /// Submits another proof for an engagement awaiting payment.
    pub(crate) async fn resubmit(&self, engagement: &Engagement) -> SubmitPaymentProofResult {
        self.submit_proof_handler()
            .handle(SubmitPaymentProofCommand {
                actor_id: engagement.client_id.clone(),
                provider_id: engagement.provider_id.clone(),
                service_id: Some(engagement.listing_id.clone()),
                proof: proof(),
                claimed_amount: None,
            })
            .await
            .unwrap()
    }

    /// Runs the workflow through confirmation.
    pub(crate) async fn confirmed(&self, client: &str, listing: &str) -> Engagement {
        let submitted = self.submitted(client, listing).await;
        self.confirm_handler()
            .handle(ConfirmPaymentCommand {
                actor_id: submitted.engagement.provider_id.clone(),
                message_id: submitted.message.id.clone(),
            })
            .await
            .unwrap()
            .engagement
            .unwrap()
    }

    // Reads

    pub(crate) async fn stored_listing(&self, id: &str) -> ServiceListing {
        ListingRepository::find_by_id(self.store.as_ref(), &listing_id(id))
            .await
            .unwrap()
            .unwrap()
    }

    pub(crate) async fn stored_engagement(&self, id: &EngagementId) -> Engagement {
        EngagementRepository::find_by_id(self.store.as_ref(), id)
            .await
            .unwrap()
            .unwrap()
    }

    pub(crate) async fn provider_stats(&self, provider: &str) -> ProviderStats {
        self.store.provider_stats(&user(provider)).await.unwrap()
    }

    pub(crate) async fn messages_in(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.store.messages_in_thread(thread_id).await.unwrap()
    }

    pub(crate) async fn unread_prompts(&self, client: &str) -> Vec<Notification> {
        self.store
            .unread_of_type(
                &user(client),
                crate::domain::notification::types::PAYMENT_CONFIRMED_RATING,
                10,
            )
            .await
            .unwrap()
    }
}
