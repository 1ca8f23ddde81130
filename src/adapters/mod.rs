//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - In-process event bus
//! - `memory` - In-memory document store implementing every store port
//! - `upload` - HTTP artifact uploader
//! - `snapshot` - JSON snapshot of the document store

pub mod events;
pub mod memory;
pub mod snapshot;
pub mod upload;

pub use events::InMemoryEventBus;
pub use memory::InMemoryDocumentStore;
pub use snapshot::{load_snapshot, Snapshot, SnapshotError};
pub use upload::{HttpArtifactUploader, HttpUploaderConfig, UploadError};
