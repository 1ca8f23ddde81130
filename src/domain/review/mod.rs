//! Review module - post-payment star ratings.

mod record;

pub use record::{Review, MAX_COMMENT_LENGTH};
