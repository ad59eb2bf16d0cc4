mod blob_ref;
mod error;
mod media;
mod traits;

pub mod filesystem;

pub use blob_ref::BlobRef;
pub use error::StorageError;
pub use media::AudioFormat;
pub use traits::{BlobStore, BoxReader, StoredBlob};
