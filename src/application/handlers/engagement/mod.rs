//! Engagement handlers.
//!
//! ## Commands
//! - Selecting a listing (client)
//! - Accepting or declining a selection (provider)
//! - Releasing or retiring a listing after payment (provider)

mod resolve_listing;
mod respond_to_selection;
mod select_service;

pub use resolve_listing::{
    ListingResolution, ResolveListingCommand, ResolveListingHandler, ResolveListingResult,
};
pub use respond_to_selection::{
    RespondToSelectionCommand, RespondToSelectionHandler, RespondToSelectionResult,
    SelectionDecision, ACCEPTED_TEXT, DECLINED_TEXT,
};
pub use select_service::{SelectServiceCommand, SelectServiceHandler, SelectServiceResult};
