//! Notification module - per-user notifications and the rating trigger.

mod events;
mod record;
pub mod rating_trigger;

pub use events::NotificationEvent;
pub use record::{payload, types, Notification};
pub use rating_trigger::RatingPrompt;
