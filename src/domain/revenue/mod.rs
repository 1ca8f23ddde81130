//! Revenue module - reconciliation of transactions, payment notifications and
//! payment-proof messages into one deduplicated per-user ledger.
//!
//! ```text
//! sources ─▶ Candidate (per source) ─▶ role filter ─▶ dedup by id ─▶ Ledger
//!                                                                   ├─▶ RevenueReport
//!                                                                   └─▶ heatmap
//! ```

mod candidate;
mod heatmap;
mod ledger;
mod report;

pub use candidate::{Candidate, CandidateKind, Party};
pub use heatmap::{heatmap, HeatmapDay};
pub use ledger::{Ledger, LedgerEntry, RevenueSources};
pub use report::{
    change_pct, reconcile, DateWindow, ReconciliationPolicy, RevenueReport, RevenueWindows,
    ServiceDirectory, ServiceRevenue, UNKNOWN_SERVICE,
};
