//! HTTP artifact uploader.
//!
//! Posts the file as multipart form data (`file`, `folder`, optional
//! `upload_preset`) and reads the durable URL from the `secure_url` field of
//! the JSON response.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpUploaderConfig::new("https://media.example/v1/upload")
//!     .with_upload_preset("proofs")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let uploader = HttpArtifactUploader::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::payment::ProofUpload;
use crate::ports::{ArtifactUploader, UploadedArtifact};

/// Failures talking to the upload service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Upload timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload service rejected the file ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Upload service unavailable ({status})")]
    Unavailable { status: u16 },

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),
}

impl From<UploadError> for DomainError {
    fn from(err: UploadError) -> Self {
        DomainError::new(ErrorCode::UploadFailed, err.to_string())
    }
}

/// Configuration for [`HttpArtifactUploader`].
#[derive(Debug, Clone)]
pub struct HttpUploaderConfig {
    pub endpoint: String,
    pub upload_preset: Option<String>,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpUploaderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            upload_preset: None,
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_upload_preset(mut self, preset: impl Into<String>) -> Self {
        self.upload_preset = Some(preset.into());
        self
    }

    /// Sent as a bearer token.
    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Uploads payment proofs to an HTTP media service.
pub struct HttpArtifactUploader {
    config: HttpUploaderConfig,
    client: Client,
}

impl HttpArtifactUploader {
    /// # Errors
    ///
    /// Returns `UploadError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: HttpUploaderConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UploadError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn form(&self, file: &ProofUpload, folder: &str) -> Result<Form, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| UploadError::InvalidRequest(format!("Bad MIME type: {}", e)))?;
        let mut form = Form::new().part("file", part).text("folder", folder.to_string());
        if let Some(preset) = &self.config.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }
        Ok(form)
    }

    async fn send(&self, file: &ProofUpload, folder: &str) -> Result<UploadedArtifact, UploadError> {
        let mut request = self
            .client
            .post(&self.config.endpoint)
            .multipart(self.form(file, folder)?);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                UploadError::Timeout {
                    timeout_secs: self.config.timeout.as_secs(),
                }
            } else if e.is_connect() {
                UploadError::Network(format!("Connection failed: {}", e))
            } else {
                UploadError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        interpret_response(status, &body)
    }
}

fn interpret_response(status: StatusCode, body: &str) -> Result<UploadedArtifact, UploadError> {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(UploadError::Unavailable {
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        return Err(UploadError::Rejected {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let parsed: UploadResponse = serde_json::from_str(body)
        .map_err(|e| UploadError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
    match parsed.secure_url {
        Some(url) if !url.trim().is_empty() => Ok(UploadedArtifact { url }),
        _ => Err(UploadError::InvalidResponse(
            "Response has no secure_url".to_string(),
        )),
    }
}

#[async_trait]
impl ArtifactUploader for HttpArtifactUploader {
    async fn upload(
        &self,
        file: &ProofUpload,
        folder: &str,
    ) -> Result<UploadedArtifact, DomainError> {
        tracing::debug!(
            file_name = %file.file_name,
            bytes = file.size(),
            folder,
            "uploading artifact"
        );
        self.send(file, folder).await.map_err(|e| {
            tracing::warn!(error = %e, "artifact upload failed");
            DomainError::from(e)
        })
    }
}
