use thiserror::Error;

/// Failures reported by table operations.
///
/// Every variant carries an owned, human-readable message so callers can
/// surface diagnostics without a second lookup; matching on the variant is
/// enough to dispatch on the failure kind.
#[derive(Error, Debug)]
pub enum DiskMapError {
    /// A caller-supplied argument is unusable: the key is too long or
    /// contains a NUL byte, the data length does not match the table schema,
    /// the open options disagree with the file, or an ordinal is out of
    /// range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A mutation was requested on a read-only handle.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Extending or mapping the file failed, or memory for the in-memory
    /// copy could not be allocated.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// An indexed lookup hit an ordinal whose record was deleted.
    #[error("ordinal {0} is vacant")]
    Vacant(u64),

    /// The requested transition is not available for this handle, e.g.
    /// loading a writable or already-resident table into memory, or using a
    /// poisoned handle.
    #[error("impossible operation: {0}")]
    ImpossibleOperation(String),

    /// The file is not a diskmap table, its header is inconsistent, or a
    /// probe reached a state the invariants rule out.
    #[error("table corrupted: {0}")]
    Corruption(String),

    /// An underlying open, read, truncate, or rename failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A diskmap Result returning [`DiskMapError`].
pub type Result<T> = std::result::Result<T, DiskMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_message() {
        let err = DiskMapError::InvalidArgument("key too long".to_string());
        assert_eq!(err.to_string(), "invalid argument: key too long");

        let err = DiskMapError::Vacant(7);
        assert_eq!(err.to_string(), "ordinal 7 is vacant");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DiskMapError::from(io);
        assert!(matches!(err, DiskMapError::Io(_)));
    }
}
