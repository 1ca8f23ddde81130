//! Payment module - proofs, transactions, revenue counters and amount parsing.

mod amount;
mod proof;
mod stats;
mod transaction;

pub use amount::{extract_amount, parse_claimed_amount, MAX_CLAIMED_AMOUNT};
pub use proof::{ProofPolicy, ProofUpload, DEFAULT_MAX_PROOF_BYTES, DEFAULT_PROOF_MIME_TYPES};
pub use stats::ProviderStats;
pub use transaction::{Transaction, TransactionStatus};
