//! Application layer - Commands, Queries, Handlers and live views.
//!
//! Handlers orchestrate domain operations across ports. Views fold domain
//! events into snapshots that stay current while subscribed.

pub mod handlers;
pub mod views;

pub use handlers::{
    // Engagement
    ListingResolution, ResolveListingCommand, ResolveListingHandler, ResolveListingResult,
    RespondToSelectionCommand, RespondToSelectionHandler, RespondToSelectionResult,
    SelectServiceCommand, SelectServiceHandler, SelectServiceResult, SelectionDecision,
    // Payment
    ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult,
    SubmitPaymentProofCommand, SubmitPaymentProofHandler, SubmitPaymentProofResult,
    // Rating
    ConsumeRatingPromptCommand, ConsumeRatingPromptHandler, ConsumeRatingPromptResult,
    GetPendingRatingPromptHandler, GetPendingRatingPromptQuery, GetPendingRatingPromptResult,
    SubmitReviewCommand, SubmitReviewHandler, SubmitReviewResult,
    // Revenue
    GetRevenueReportHandler, GetRevenueReportQuery, GetRevenueReportResult,
};
pub use views::{InboxSubscription, LiveSubscription, Projection, RatingPromptSubscription};
