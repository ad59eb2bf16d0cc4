use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::blob_ref::BlobRef;
use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Result of a successful store: the durable reference and byte count.
#[derive(Clone, Debug)]
pub struct StoredBlob {
    pub blob_ref: BlobRef,
    pub size: u64,
}

/// Durable storage for uploaded audio payloads.
///
/// Implementations must validate the declared content type before any
/// bytes are written, and must never leave a partially written blob
/// visible under a returned reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a fresh unique reference.
    async fn store_bytes(
        &self,
        data: &[u8],
        declared_content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        let reader: BoxReader = Box::new(Cursor::new(data.to_vec()));
        self.store(reader, declared_content_type).await
    }

    /// Stream a payload into storage and return its reference.
    async fn store(
        &self,
        reader: BoxReader,
        declared_content_type: &str,
    ) -> Result<StoredBlob, StorageError>;

    /// Retrieve a blob as a streaming async reader.
    async fn resolve(&self, blob_ref: &BlobRef) -> Result<BoxReader, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, blob_ref: &BlobRef) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not
    /// exist. Used as the compensating action when a catalog write
    /// fails after the blob was committed.
    async fn delete(&self, blob_ref: &BlobRef) -> Result<bool, StorageError>;

    /// Get the size of a blob in bytes.
    async fn size(&self, blob_ref: &BlobRef) -> Result<u64, StorageError>;
}
