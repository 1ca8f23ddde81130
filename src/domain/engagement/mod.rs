//! Engagement module - the selection-to-resolution state machine.
//!
//! ```text
//! Browsing → Selected → Accepted → Reserved → PaymentSubmitted → PaymentConfirmed
//!                 ↘ Declined                      ↺                   ↓
//!                                                          RatingRequested
//!                                                          ↓            ↓
//!                                                  MadeAvailable     Replaced
//! ```

mod aggregate;
mod errors;
mod events;
mod status;

pub use aggregate::Engagement;
pub use errors::EngagementError;
pub use events::EngagementEvent;
pub use status::EngagementStatus;
