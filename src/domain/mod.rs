//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, dates)
//! - `conversation` - Messages, per-service threads and inbox grouping
//! - `listing` - Provider listings and their reservation flag
//! - `engagement` - Selection-to-resolution state machine
//! - `payment` - Proof checks, transactions, revenue counters
//! - `notification` - Per-user notifications and the rating trigger
//! - `review` - Post-payment star ratings
//! - `revenue` - Cross-source revenue reconciliation

pub mod conversation;
pub mod engagement;
pub mod foundation;
pub mod listing;
pub mod notification;
pub mod payment;
pub mod review;
pub mod revenue;
