//! Handler-level error taxonomy for engagement operations.
//!
//! | Error | Meaning |
//! |-------|---------|
//! | Validation | bad input; nothing was written |
//! | Authorization | actor is not the party allowed to act |
//! | NotFound | listing, thread, message, engagement or notification missing |
//! | AlreadyProcessed | the transition already happened |
//! | ListingUnavailable | another client holds the reservation |
//! | InvalidState | transition not allowed from the current state |
//! | StoreUnavailable | store failure; no partial revenue writes |
//! | UploadFailed | artifact upload failed; nothing was written |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngagementError {
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("{resource} not found: {message}")]
    NotFound {
        resource: &'static str,
        message: String,
    },

    #[error("Already processed: {0}")]
    AlreadyProcessed(String),

    #[error("Listing unavailable: {0}")]
    ListingUnavailable(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngagementError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngagementError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        EngagementError::Authorization(message.into())
    }

    pub fn not_found(resource: &'static str, message: impl Into<String>) -> Self {
        EngagementError::NotFound {
            resource,
            message: message.into(),
        }
    }

    /// Returns the port-level code this error corresponds to.
    pub fn code(&self) -> ErrorCode {
        match self {
            EngagementError::Validation { .. } => ErrorCode::ValidationFailed,
            EngagementError::Authorization(_) => ErrorCode::Forbidden,
            EngagementError::NotFound { resource, .. } => match *resource {
                "Listing" => ErrorCode::ListingNotFound,
                "Thread" => ErrorCode::ThreadNotFound,
                "Message" => ErrorCode::MessageNotFound,
                "Transaction" => ErrorCode::TransactionNotFound,
                "Notification" => ErrorCode::NotificationNotFound,
                _ => ErrorCode::EngagementNotFound,
            },
            EngagementError::AlreadyProcessed(_) => ErrorCode::AlreadyProcessed,
            EngagementError::ListingUnavailable(_) => ErrorCode::ListingUnavailable,
            EngagementError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            EngagementError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
            EngagementError::UploadFailed(_) => ErrorCode::UploadFailed,
            EngagementError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// True when resubmitting the same command may succeed. Nothing in this
    /// crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngagementError::StoreUnavailable(_) | EngagementError::UploadFailed(_)
        )
    }
}

impl From<DomainError> for EngagementError {
    fn from(err: DomainError) -> Self {
        let message = err.message.clone();
        match err.code {
            ErrorCode::ValidationFailed => EngagementError::Validation {
                field: err.detail("field").unwrap_or("input").to_string(),
                message,
            },
            ErrorCode::Forbidden => EngagementError::Authorization(message),
            ErrorCode::ListingNotFound => EngagementError::not_found("Listing", message),
            ErrorCode::ThreadNotFound => EngagementError::not_found("Thread", message),
            ErrorCode::MessageNotFound => EngagementError::not_found("Message", message),
            ErrorCode::EngagementNotFound => EngagementError::not_found("Engagement", message),
            ErrorCode::TransactionNotFound => EngagementError::not_found("Transaction", message),
            ErrorCode::NotificationNotFound => {
                EngagementError::not_found("Notification", message)
            }
            ErrorCode::AlreadyProcessed => EngagementError::AlreadyProcessed(message),
            ErrorCode::ListingUnavailable => EngagementError::ListingUnavailable(message),
            ErrorCode::InvalidStateTransition => EngagementError::InvalidState(message),
            ErrorCode::StoreUnavailable => EngagementError::StoreUnavailable(message),
            ErrorCode::UploadFailed => EngagementError::UploadFailed(message),
            ErrorCode::InternalError => EngagementError::Internal(message),
        }
    }
}

impl From<ValidationError> for EngagementError {
    fn from(err: ValidationError) -> Self {
        EngagementError::validation(err.field().to_string(), err.to_string())
    }
}
