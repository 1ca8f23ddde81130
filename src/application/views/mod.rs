//! Live views - snapshots kept current by domain events.
//!
//! A view is a pure reducer over immutable snapshots. [`LiveSubscription`]
//! wires a reducer to an [`EventSubscriber`](crate::ports::EventSubscriber)
//! and publishes every new snapshot on a `tokio::sync::watch` channel.

mod inbox;
mod live;
mod rating_prompt;

pub use inbox::{InboxChange, InboxProjection, InboxSnapshot, InboxView};
pub use live::LiveSubscription;
pub use rating_prompt::{
    RatingPromptChange, RatingPromptProjection, RatingPromptSnapshot, RatingPromptView,
};

use crate::domain::foundation::EventEnvelope;

/// Live inbox for one user.
pub type InboxSubscription = LiveSubscription<InboxProjection>;

/// Live rating prompt for one client.
pub type RatingPromptSubscription = LiveSubscription<RatingPromptProjection>;

/// Folds events of [`Projection::EVENT_TYPES`] into snapshots.
pub trait Projection: Send + Sync + 'static {
    type Snapshot: Clone + PartialEq + Send + Sync + 'static;

    /// Event types the projection listens to.
    const EVENT_TYPES: &'static [&'static str];

    /// Returns the next snapshot, or `None` when the event changes nothing.
    fn reduce(&self, snapshot: &Self::Snapshot, event: &EventEnvelope) -> Option<Self::Snapshot>;
}
