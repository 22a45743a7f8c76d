//! View layout validation.

use crate::element::ElementKind;
use crate::error::{MAX_ARRAY_LENGTH, MAX_BUFFER_SIZE, MemoryError};

/// A typed window onto a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewLayout {
    pub kind: ElementKind,
    pub byte_offset: usize,
    pub length: usize,
}

/// Checks a script-supplied count (already truncated to `i32`) for use as a length or offset.
pub fn array_length(raw: i32) -> Result<usize, MemoryError> {
    if raw < 0 {
        return Err(MemoryError::NEGATIVE_LENGTH);
    }
    if raw as i64 > MAX_ARRAY_LENGTH {
        return Err(MemoryError::LENGTH_TOO_LARGE);
    }
    Ok(raw as usize)
}

/// Negative indices count from the end; both ends clamp to `[0, len]` and `end >= begin`.
pub fn normalize_range(len: usize, begin: i32, end: Option<i32>) -> (usize, usize) {
    let len = len as i64;
    let clamp = |i: i32| {
        let i = i as i64;
        let i = if i < 0 { i + len } else { i };
        i.clamp(0, len)
    };
    let begin = clamp(begin);
    let end = end.map_or(len, clamp).max(begin);
    (begin as usize, end as usize)
}

impl ViewLayout {
    /// Layout for a view that owns a fresh buffer of `length` elements.
    pub fn fresh(kind: ElementKind, length: usize) -> Result<Self, MemoryError> {
        let layout = ViewLayout {
            kind,
            byte_offset: 0,
            length,
        };
        if layout.byte_length() as u64 > MAX_BUFFER_SIZE as u64 {
            return Err(MemoryError::BUFFER_TOO_LARGE);
        }
        Ok(layout)
    }

    /// Validates `(byteOffset, length)` against a buffer of `buffer_len` bytes.
    ///
    /// A missing offset means 0; a missing length takes every remaining byte, which must then
    /// divide evenly into elements.
    pub fn over_buffer(
        kind: ElementKind,
        buffer_len: usize,
        byte_offset: Option<i32>,
        length: Option<i32>,
    ) -> Result<Self, MemoryError> {
        let size = kind.size();
        let byte_offset = match byte_offset {
            None => 0,
            Some(raw) => {
                let offset = array_length(raw)?;
                if offset > buffer_len {
                    return Err(MemoryError::OutOfBounds("byteOffset out of bounds"));
                }
                if offset % size != 0 {
                    return Err(MemoryError::InvalidArgument(
                        "byteOffset must be multiple of element size",
                    ));
                }
                offset
            }
        };
        let length = match length {
            None => {
                let remaining = buffer_len - byte_offset;
                if remaining % size != 0 {
                    return Err(MemoryError::InvalidArgument(
                        "buffer size must be multiple of element size",
                    ));
                }
                remaining / size
            }
            Some(raw) => {
                let length = array_length(raw)?;
                if byte_offset + length * size > buffer_len {
                    return Err(MemoryError::OutOfBounds("length out of bounds"));
                }
                length
            }
        };
        Ok(ViewLayout {
            kind,
            byte_offset,
            length,
        })
    }

    #[inline]
    pub fn byte_length(&self) -> usize {
        self.length * self.kind.size()
    }

    /// Byte position of element `index` within the buffer.
    #[inline]
    pub fn byte_index(&self, index: usize) -> usize {
        self.byte_offset + index * self.kind.size()
    }

    /// Window over elements `[begin, end)` of this one, sharing the buffer.
    pub fn subarray(&self, begin: i32, end: Option<i32>) -> ViewLayout {
        let (begin, end) = normalize_range(self.length, begin, end);
        ViewLayout {
            kind: self.kind,
            byte_offset: self.byte_index(begin),
            length: end - begin,
        }
    }

    pub fn get(&self, bytes: &[u8], index: usize) -> Option<f64> {
        if index >= self.length {
            return None;
        }
        Some(self.kind.load(bytes, self.byte_index(index)))
    }

    /// Stores `value`; writes past the end are dropped.
    pub fn set(&self, bytes: &mut [u8], index: usize, value: f64) -> bool {
        if index >= self.length {
            return false;
        }
        self.kind.store(bytes, self.byte_index(index), value);
        true
    }
}
