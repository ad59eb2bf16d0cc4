use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use super::blob_ref::BlobRef;
use super::error::StorageError;
use super::media::AudioFormat;
use super::traits::{BlobStore, BoxReader, StoredBlob};

/// Filesystem-backed blob store.
///
/// Each upload lands in a flat directory under a unique name. Writes go
/// through `{root}/.tmp` and are renamed into place, so a blob is either
/// fully present under its reference or absent.
pub struct FilesystemBlobStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store, creating the storage root if
    /// absent. Safe to call repeatedly.
    pub async fn new(root: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self { root, max_size })
    }

    fn blob_path(&self, blob_ref: &BlobRef) -> PathBuf {
        self.root.join(blob_ref.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn store(
        &self,
        mut reader: BoxReader,
        declared_content_type: &str,
    ) -> Result<StoredBlob, StorageError> {
        // Type policy is checked before any byte touches disk.
        let format = AudioFormat::from_mime(declared_content_type).ok_or_else(|| {
            StorageError::UnsupportedMediaType(declared_content_type.to_string())
        })?;

        let temp_path = self.temp_path();
        let mut temp_file = fs::File::create(&temp_path).await?;
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::PayloadTooLarge {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            if let Err(e) = temp_file.write_all(&buf[..n]).await {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
        }

        temp_file.flush().await?;
        temp_file.sync_all().await?;
        drop(temp_file);

        let blob_ref = BlobRef::generate(format);
        let blob_path = self.blob_path(&blob_ref);

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredBlob {
            blob_ref,
            size: total_bytes,
        })
    }

    async fn resolve(&self, blob_ref: &BlobRef) -> Result<BoxReader, StorageError> {
        let blob_path = self.blob_path(blob_ref);
        match fs::File::open(&blob_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(blob_ref.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, blob_ref: &BlobRef) -> Result<bool, StorageError> {
        Ok(fs::try_exists(&self.blob_path(blob_ref)).await?)
    }

    async fn delete(&self, blob_ref: &BlobRef) -> Result<bool, StorageError> {
        match fs::remove_file(&self.blob_path(blob_ref)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, blob_ref: &BlobRef) -> Result<u64, StorageError> {
        match fs::metadata(&self.blob_path(blob_ref)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(blob_ref.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
