use std::fmt;

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested blob was not found.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The blob reference is not a name this store could have issued.
    InvalidRef(String),
    /// The declared content type is not in the audio allow-list.
    UnsupportedMediaType(String),
    /// The payload exceeds the configured size limit.
    PayloadTooLarge { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(blob_ref) => write!(f, "blob not found: {blob_ref}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::InvalidRef(msg) => write!(f, "invalid blob reference: {msg}"),
            Self::UnsupportedMediaType(mime) => {
                write!(f, "unsupported audio content type: {mime}")
            }
            Self::PayloadTooLarge { actual, limit } => {
                write!(f, "payload exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
