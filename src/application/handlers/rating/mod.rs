//! Rating handlers.
//!
//! ## Commands
//! - Consuming a displayed rating prompt
//! - Submitting a review for a confirmed payment
//!
//! ## Queries
//! - The rating prompt to show a client

mod consume_rating_prompt;
mod get_pending_rating_prompt;
mod submit_review;

pub use consume_rating_prompt::{
    ConsumeRatingPromptCommand, ConsumeRatingPromptHandler, ConsumeRatingPromptResult,
};
pub use get_pending_rating_prompt::{
    GetPendingRatingPromptHandler, GetPendingRatingPromptQuery, GetPendingRatingPromptResult,
};
pub use submit_review::{SubmitReviewCommand, SubmitReviewHandler, SubmitReviewResult};
