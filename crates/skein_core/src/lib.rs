//! Core memory model for the skein shell.
//!
//! This crate contains the buffer and typed-view machinery that is independent of the script
//! engine:
//! - `Buffer` - RAII handle to a zero-filled external byte region in a per-instance arena
//! - `ElementKind` - the nine typed-view element kinds and their numeric coercions
//! - `ViewLayout` - validated `(kind, byteOffset, length)` window onto a buffer
//! - `copy` - element copies between views, including the overlap-safe mixed-width case

pub mod arena;
pub mod copy;
pub mod element;
pub mod error;
pub mod layout;

pub use arena::{Buffer, BufferArena, BufferId, SharedArena, external_memory};
pub use element::{ElementKind, to_int32, to_uint32};
pub use error::{MAX_ARRAY_LENGTH, MAX_BUFFER_SIZE, MemoryError};
pub use layout::{ViewLayout, array_length, normalize_range};
