//! Artifact uploader port.
//!
//! Stores a file with the external upload service and returns its durable
//! URL. Validation happens before this port is called.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payment::ProofUpload;

/// A stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    pub url: String,
}

#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    /// Uploads `file` into `folder`.
    ///
    /// # Errors
    ///
    /// - `UploadFailed` on transport or service failure
    async fn upload(&self, file: &ProofUpload, folder: &str)
        -> Result<UploadedArtifact, DomainError>;
}
