//! Payment handlers.
//!
//! ## Commands
//! - Submitting a proof of payment (client)
//! - Confirming a payment (provider)

mod confirm_payment;
mod submit_payment_proof;

pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use submit_payment_proof::{
    SubmitPaymentProofCommand, SubmitPaymentProofHandler, SubmitPaymentProofResult,
    DEFAULT_PROOF_FOLDER,
};
