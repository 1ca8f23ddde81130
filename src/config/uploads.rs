//! Payment proof upload configuration

use std::time::Duration;

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::upload::HttpUploaderConfig;
use crate::domain::payment::{ProofPolicy, DEFAULT_MAX_PROOF_BYTES, DEFAULT_PROOF_MIME_TYPES};

const MAX_PROOF_BYTES_CEILING: usize = 50 * 1024 * 1024;

/// Upload target and proof acceptance rules
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Media service endpoint. Uploads are disabled when absent.
    pub endpoint: Option<String>,

    /// Destination folder for proofs
    #[serde(default = "default_folder")]
    pub folder: String,

    /// Unsigned upload preset, if the media service uses one
    pub upload_preset: Option<String>,

    /// Bearer token for the media service
    pub api_key: Option<Secret<String>>,

    #[serde(default = "default_max_proof_bytes")]
    pub max_proof_bytes: usize,

    #[serde(default = "default_mime_types")]
    pub allowed_mime_types: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UploadsConfig {
    /// Proof checks applied before any upload.
    pub fn proof_policy(&self) -> ProofPolicy {
        ProofPolicy {
            max_bytes: self.max_proof_bytes,
            allowed_mime_types: self.allowed_mime_types.clone(),
        }
    }

    /// HTTP uploader settings, when an endpoint is configured.
    pub fn uploader_config(&self) -> Option<HttpUploaderConfig> {
        let endpoint = self.endpoint.as_ref()?;
        let mut config = HttpUploaderConfig::new(endpoint.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(preset) = &self.upload_preset {
            config = config.with_upload_preset(preset.clone());
        }
        if let Some(api_key) = &self.api_key {
            config = config.with_api_key(api_key.clone());
        }
        Some(config)
    }

    /// Validate upload configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(ValidationError::InvalidUploadEndpoint);
            }
        }
        if self.folder.trim().is_empty() {
            return Err(ValidationError::MissingRequired("UPLOADS__FOLDER"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_proof_bytes == 0 || self.max_proof_bytes > MAX_PROOF_BYTES_CEILING {
            return Err(ValidationError::InvalidProofSize);
        }
        if self.allowed_mime_types.is_empty() {
            return Err(ValidationError::NoProofMimeTypes);
        }
        if let Some(bad) = self
            .allowed_mime_types
            .iter()
            .find(|mime| !mime.starts_with("image/"))
        {
            return Err(ValidationError::NonImageMimeType(bad.clone()));
        }
        Ok(())
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            folder: default_folder(),
            upload_preset: None,
            api_key: None,
            max_proof_bytes: default_max_proof_bytes(),
            allowed_mime_types: default_mime_types(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_folder() -> String {
    "payment_proofs".to_string()
}

fn default_max_proof_bytes() -> usize {
    DEFAULT_MAX_PROOF_BYTES
}

fn default_mime_types() -> Vec<String> {
    DEFAULT_PROOF_MIME_TYPES.iter().map(|s| s.to_string()).collect()
}

fn default_timeout_secs() -> u64 {
    30
}
