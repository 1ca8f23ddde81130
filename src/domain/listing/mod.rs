//! Listing module - a provider's advertised service and its reservation flag.

mod aggregate;

pub use aggregate::ServiceListing;
