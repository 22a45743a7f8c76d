//! Memory-model failures.
//!
//! Messages are the exact strings scripts observe when the failure is thrown into them.

/// Largest buffer, in bytes, that can be allocated.
pub const MAX_BUFFER_SIZE: i64 = 0x7fff_ffff;

/// Largest element count accepted for lengths and offsets.
pub const MAX_ARRAY_LENGTH: i64 = 0x3fff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Requested size exceeds what a buffer may hold.
    #[error("{0}")]
    ResourceLimit(&'static str),

    /// Offset or length reaches past the end of the backing buffer.
    #[error("{0}")]
    OutOfBounds(&'static str),

    /// Argument has the wrong sign, alignment or shape.
    #[error("{0}")]
    InvalidArgument(&'static str),
}

impl MemoryError {
    pub const BUFFER_TOO_LARGE: MemoryError =
        MemoryError::ResourceLimit("ArrayBuffer exceeds maximum size (2G)");
    pub const NEGATIVE_LENGTH: MemoryError =
        MemoryError::InvalidArgument("Array length must not be negative.");
    pub const LENGTH_TOO_LARGE: MemoryError =
        MemoryError::ResourceLimit("Array length exceeds maximum length.");

    pub fn message(&self) -> &'static str {
        match self {
            MemoryError::ResourceLimit(m)
            | MemoryError::OutOfBounds(m)
            | MemoryError::InvalidArgument(m) => m,
        }
    }
}
