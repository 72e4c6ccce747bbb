//! Persistence for the medication list.

/// Key-value blob stores.
pub mod blob;
mod record;
pub mod store;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use record::{from_json, to_json};
pub use store::{LookupError, MedicationStore, StoreError};
