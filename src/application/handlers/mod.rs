//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations. Each
//! handler takes its collaborators as `Arc<dyn Port>` and returns
//! `EngagementError`.

pub mod engagement;
pub mod payment;
pub mod rating;
pub mod revenue;

mod support;

#[cfg(test)]
pub(crate) mod test_support;

pub use engagement::{
    ListingResolution, ResolveListingCommand, ResolveListingHandler, ResolveListingResult,
    RespondToSelectionCommand, RespondToSelectionHandler, RespondToSelectionResult,
    SelectServiceCommand, SelectServiceHandler, SelectServiceResult, SelectionDecision,
};
pub use payment::{
    ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult,
    SubmitPaymentProofCommand, SubmitPaymentProofHandler, SubmitPaymentProofResult,
};
pub use rating::{
    ConsumeRatingPromptCommand, ConsumeRatingPromptHandler, ConsumeRatingPromptResult,
    GetPendingRatingPromptHandler, GetPendingRatingPromptQuery, GetPendingRatingPromptResult,
    SubmitReviewCommand, SubmitReviewHandler, SubmitReviewResult,
};
pub use revenue::{GetRevenueReportHandler, GetRevenueReportQuery, GetRevenueReportResult};
