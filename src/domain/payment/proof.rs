//! Payment proof artifact checks.
//!
//! Only the artifact's shape is checked here. Storage belongs to the upload
//! collaborator and the claimed amount is judged by the provider.

use crate::domain::foundation::ValidationError;

/// Default upper bound on proof size: 5 MB.
pub const DEFAULT_MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

/// Image types accepted as payment proof by default.
pub const DEFAULT_PROOF_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// A file the client wants to attach as proof of payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ProofUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Size and type limits for proof uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofPolicy {
    pub max_bytes: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for ProofPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_PROOF_BYTES,
            allowed_mime_types: DEFAULT_PROOF_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ProofPolicy {
    /// Rejects empty, oversized or non-image uploads.
    pub fn validate(&self, upload: &ProofUpload) -> Result<(), ValidationError> {
        if upload.bytes.is_empty() {
            return Err(ValidationError::empty_field("payment_proof"));
        }
        if upload.size() > self.max_bytes {
            return Err(ValidationError::out_of_range(
                "payment_proof",
                1,
                self.max_bytes as i64,
                upload.size() as i64,
            ));
        }
        let mime = upload.mime_type.trim().to_ascii_lowercase();
        if !self.allowed_mime_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&mime)) {
            return Err(ValidationError::invalid_format(
                "payment_proof",
                format!("unsupported file type '{}'", upload.mime_type),
            ));
        }
        Ok(())
    }
}
