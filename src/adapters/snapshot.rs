//! JSON snapshot of the document store.
//!
//! One document holding every collection the revenue report reads:
//!
//! ```json
//! { "transactions": [], "notifications": [], "messages": [], "threads": [], "listings": [] }
//! ```
//!
//! Missing collections default to empty. Date fields accept every shape
//! [`RawDate`](crate::domain::foundation::RawDate) understands.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::conversation::{Message, Thread};
use crate::domain::listing::ServiceListing;
use crate::domain::notification::Notification;
use crate::domain::payment::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub notifications: Vec<Notification>,
    pub messages: Vec<Message>,
    pub threads: Vec<Thread>,
    pub listings: Vec<ServiceListing>,
}

impl Snapshot {
    /// Total number of records across all collections.
    pub fn record_count(&self) -> usize {
        self.transactions.len()
            + self.notifications.len()
            + self.messages.len()
            + self.threads.len()
            + self.listings.len()
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Usage: {0}")]
    Usage(String),

    #[error("Failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Report failed: {0}")]
    Report(#[from] crate::domain::engagement::EngagementError),

    #[error("Failed to render report: {0}")]
    Render(#[source] serde_json::Error),
}

/// Reads and parses a snapshot file.
pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, SnapshotError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&text).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
