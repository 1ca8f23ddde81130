//! Revenue handlers.
//!
//! ## Queries
//! - Reconciled revenue report and calendar heatmap for one user

mod get_revenue_report;

pub use get_revenue_report::{
    GetRevenueReportHandler, GetRevenueReportQuery, GetRevenueReportResult,
};
