use std::fmt;

use uuid::Uuid;

use super::error::StorageError;
use super::media::AudioFormat;

/// A validated, storage-relative blob name.
///
/// Generated names combine a millisecond clock component with a random
/// component (UUIDv7) plus an extension matching the audio type, so
/// concurrent uploads never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobRef(String);

impl BlobRef {
    /// Generate a fresh unique reference for the given format.
    pub fn generate(format: AudioFormat) -> Self {
        Self(format!("{}.{}", Uuid::now_v7(), format.extension()))
    }

    /// Parse an externally supplied reference (e.g. from a URL path).
    ///
    /// Rejects anything that could escape the storage root.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty() {
            return Err(StorageError::InvalidRef("empty".into()));
        }
        if s.contains('/') || s.contains('\\') || s.contains("..") {
            return Err(StorageError::InvalidRef(format!(
                "path separators not allowed: {s}"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
            return Err(StorageError::InvalidRef(format!("invalid characters: {s}")));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
