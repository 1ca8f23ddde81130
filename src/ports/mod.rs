//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Document Store Ports
//!
//! - `ListingRepository` - Listings and the reservation compare-and-set
//! - `ConversationRepository` - Messages and per-service thread summaries
//! - `EngagementRepository` - Engagement records
//! - `PaymentLedger` - Transactions, provider counters, atomic confirmation
//! - `NotificationRepository` - Per-user notifications
//! - `ReviewRepository` - Post-payment reviews
//!
//! ## External Services
//!
//! - `ArtifactUploader` - Durable storage for payment proof files
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events

mod artifact_uploader;
mod conversation_repository;
mod engagement_repository;
mod event_publisher;
mod event_subscriber;
mod listing_repository;
mod notification_repository;
mod payment_ledger;
mod review_repository;

pub use artifact_uploader::{ArtifactUploader, UploadedArtifact};
pub use conversation_repository::{AppendedMessage, ConversationRepository};
pub use engagement_repository::EngagementRepository;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber, SubscriptionId};
pub use listing_repository::ListingRepository;
pub use notification_repository::NotificationRepository;
pub use payment_ledger::{ConfirmPayment, PaymentConfirmation, PaymentLedger};
pub use review_repository::ReviewRepository;
