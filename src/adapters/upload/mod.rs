//! Artifact upload adapters.
//!
//! - `HttpArtifactUploader` - Multipart upload to an external media service

mod http;

pub use http::{HttpArtifactUploader, HttpUploaderConfig, UploadError};
