//! Review record. One per (transaction, rater).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ListingId, Rating, ReviewId, Timestamp, TransactionId, UserId, ValidationError,
};

pub const MAX_COMMENT_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub rater_id: UserId,
    /// The reviewed provider.
    pub target_id: UserId,
    pub service_id: ListingId,
    pub rating: Rating,
    pub transaction_id: TransactionId,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

impl Review {
    pub fn new(
        rater_id: UserId,
        target_id: UserId,
        service_id: ListingId,
        transaction_id: TransactionId,
        rating: Rating,
        comment: Option<String>,
    ) -> Result<Self, ValidationError> {
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(text) = &comment {
            let len = text.chars().count();
            if len > MAX_COMMENT_LENGTH {
                return Err(ValidationError::out_of_range(
                    "comment",
                    0,
                    MAX_COMMENT_LENGTH as i64,
                    len as i64,
                ));
            }
        }
        Ok(Self {
            id: ReviewId::generate(),
            rater_id,
            target_id,
            service_id,
            rating,
            transaction_id,
            comment,
            created_at: Timestamp::now(),
        })
    }
}
