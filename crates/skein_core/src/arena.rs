//! Buffer storage.
//!
//! Each engine instance owns one `BufferArena`. A `Buffer` is the RAII handle a script-visible
//! buffer object carries; dropping it is the buffer's one and only finalization: the arena slot
//! is freed and its bytes are retired from the process-wide external-memory counter. A buffer
//! dropped while the arena is borrowed queues its slot, and the next borrow frees it.

use std::cell::{BorrowMutError, Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::debug;

use crate::error::{MAX_BUFFER_SIZE, MemoryError};
use crate::layout::normalize_range;

static EXTERNAL_MEMORY: AtomicI64 = AtomicI64::new(0);

/// Bytes currently held by live buffers across every instance in the process.
pub fn external_memory() -> i64 {
    EXTERNAL_MEMORY.load(Ordering::Relaxed)
}

/// Handle to a slot in a `BufferArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Default)]
pub struct BufferArena {
    slots: Vec<Option<Box<[u8]>>>,
    free_list: Vec<u32>,
    live_bytes: usize,
}

impl BufferArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedArena {
        SharedArena::default()
    }

    fn insert(&mut self, data: Box<[u8]>) -> BufferId {
        self.live_bytes += data.len();
        if let Some(id) = self.free_list.pop() {
            self.slots[id as usize] = Some(data);
            BufferId(id)
        } else {
            let id = self.slots.len() as u32;
            self.slots.push(Some(data));
            BufferId(id)
        }
    }

    fn remove(&mut self, id: BufferId) -> Option<Box<[u8]>> {
        let data = self.slots.get_mut(id.0 as usize)?.take()?;
        self.live_bytes -= data.len();
        self.free_list.push(id.0);
        EXTERNAL_MEMORY.fetch_sub(data.len() as i64, Ordering::Relaxed);
        debug!(slot = id.0, len = data.len(), "buffer released");
        Some(data)
    }

    /// Bytes of a live buffer; empty for a released slot.
    pub fn bytes(&self, id: BufferId) -> &[u8] {
        match self.slots.get(id.0 as usize) {
            Some(Some(data)) => &data[..],
            _ => &[],
        }
    }

    pub fn bytes_mut(&mut self, id: BufferId) -> &mut [u8] {
        match self.slots.get_mut(id.0 as usize) {
            Some(Some(data)) => &mut data[..],
            _ => &mut [],
        }
    }

    /// Borrows two distinct buffers at once, the first shared and the second exclusive.
    pub fn pair_mut(&mut self, src: BufferId, dst: BufferId) -> (&[u8], &mut [u8]) {
        let (s, d) = (src.0 as usize, dst.0 as usize);
        if s == d || s >= self.slots.len() || d >= self.slots.len() {
            return (&[], &mut []);
        }
        let (src_slot, dst_slot) = if s < d {
            let (lo, hi) = self.slots.split_at_mut(d);
            (&lo[s], &mut hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(s);
            (&hi[0], &mut lo[d])
        };
        match (src_slot, dst_slot) {
            (Some(a), Some(b)) => (&a[..], &mut b[..]),
            _ => (&[], &mut []),
        }
    }

    pub fn live_buffers(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    /// Drops trailing free slots and spare capacity.
    pub fn shrink(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        let len = self.slots.len() as u32;
        self.free_list.retain(|&i| i < len);
        self.slots.shrink_to_fit();
        self.free_list.shrink_to_fit();
    }
}

#[derive(Default)]
struct ArenaCell {
    arena: RefCell<BufferArena>,
    /// Slots whose buffer was dropped while the arena was borrowed.
    pending: RefCell<Vec<BufferId>>,
}

impl Drop for ArenaCell {
    fn drop(&mut self) {
        let arena = self.arena.get_mut();
        for id in self.pending.get_mut().drain(..) {
            arena.remove(id);
        }
    }
}

/// The arena handle every buffer of one instance holds.
#[derive(Clone, Default)]
pub struct SharedArena(Rc<ArenaCell>);

impl SharedArena {
    /// Shared access, after freeing any queued slots the arena can take right now.
    pub fn borrow(&self) -> Ref<'_, BufferArena> {
        if let Ok(arena) = self.0.arena.try_borrow_mut() {
            self.drain(arena);
        }
        self.0.arena.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, BufferArena> {
        self.drain(self.0.arena.borrow_mut())
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, BufferArena>, BorrowMutError> {
        self.0.arena.try_borrow_mut().map(|arena| self.drain(arena))
    }

    /// Slots waiting for the arena to become free.
    pub fn pending_frees(&self) -> usize {
        self.0.pending.borrow().len()
    }

    fn drain<'a>(&self, mut arena: RefMut<'a, BufferArena>) -> RefMut<'a, BufferArena> {
        let pending = std::mem::take(&mut *self.0.pending.borrow_mut());
        for id in pending {
            arena.remove(id);
        }
        arena
    }

    fn release(&self, id: BufferId) {
        match self.0.arena.try_borrow_mut() {
            Ok(mut arena) => {
                arena.remove(id);
            }
            Err(_) => {
                debug!(slot = id.0, "arena busy, buffer release deferred");
                self.0.pending.borrow_mut().push(id);
            }
        }
    }
}

/// Owned handle to a zero-initialized byte region.
pub struct Buffer {
    id: BufferId,
    len: usize,
    arena: SharedArena,
}

impl Buffer {
    /// Allocates `length` zero bytes.
    pub fn allocate(arena: &SharedArena, length: i64) -> Result<Buffer, MemoryError> {
        if !(0..=MAX_BUFFER_SIZE).contains(&length) {
            return Err(MemoryError::BUFFER_TOO_LARGE);
        }
        Ok(Self::adopt(arena, vec![0u8; length as usize]))
    }

    /// Wraps existing bytes, e.g. a file read into memory.
    pub fn from_bytes(arena: &SharedArena, bytes: Vec<u8>) -> Result<Buffer, MemoryError> {
        if bytes.len() as u64 > MAX_BUFFER_SIZE as u64 {
            return Err(MemoryError::BUFFER_TOO_LARGE);
        }
        Ok(Self::adopt(arena, bytes))
    }

    fn adopt(arena: &SharedArena, bytes: Vec<u8>) -> Buffer {
        let len = bytes.len();
        let id = arena.borrow_mut().insert(bytes.into_boxed_slice());
        EXTERNAL_MEMORY.fetch_add(len as i64, Ordering::Relaxed);
        debug!(slot = id.0, len, "buffer allocated");
        Buffer {
            id,
            len,
            arena: arena.clone(),
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn byte_length(&self) -> usize {
        self.len
    }

    pub fn arena(&self) -> &SharedArena {
        &self.arena
    }

    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.arena.borrow(), |a| a.bytes(self.id))
    }

    pub fn bytes_mut(&self) -> RefMut<'_, [u8]> {
        RefMut::map(self.arena.borrow_mut(), |a| a.bytes_mut(self.id))
    }

    /// Copies `[begin, end)` into a new buffer; indices are normalized like `Array.prototype.slice`.
    pub fn slice(&self, begin: i32, end: Option<i32>) -> Result<Buffer, MemoryError> {
        let (begin, end) = normalize_range(self.len, begin, end);
        let copy = self.bytes()[begin..end].to_vec();
        Self::from_bytes(&self.arena, copy)
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.arena.release(self.id);
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_zeroed_and_sized() {
        let arena = BufferArena::shared();
        let buf = Buffer::allocate(&arena, 16).unwrap();
        assert_eq!(buf.byte_length(), 16);
        assert!(buf.bytes().iter().all(|b| *b == 0));
        assert_eq!(arena.borrow().live_bytes(), 16);
    }

    #[test]
    fn allocate_rejects_out_of_range_sizes() {
        let arena = BufferArena::shared();
        assert_eq!(
            Buffer::allocate(&arena, -1).unwrap_err(),
            MemoryError::BUFFER_TOO_LARGE
        );
        assert_eq!(
            Buffer::allocate(&arena, MAX_BUFFER_SIZE + 1).unwrap_err(),
            MemoryError::BUFFER_TOO_LARGE
        );
    }

    #[test]
    fn drop_frees_slot_once_and_reuses_it() {
        let arena = BufferArena::shared();
        let a = Buffer::allocate(&arena, 4).unwrap();
        let first = a.id();
        drop(a);
        assert_eq!(arena.borrow().live_buffers(), 0);
        assert_eq!(arena.borrow().live_bytes(), 0);
        let b = Buffer::allocate(&arena, 2).unwrap();
        assert_eq!(b.id(), first);
    }

    #[test]
    fn drop_during_borrow_is_deferred_to_next_borrow() {
        let arena = BufferArena::shared();
        let a = Buffer::allocate(&arena, 8).unwrap();
        let b = Buffer::allocate(&arena, 3).unwrap();
        let first = a.id();
        {
            let held = arena.borrow();
            drop(a);
            assert_eq!(held.live_buffers(), 2);
        }
        assert_eq!(arena.pending_frees(), 1);

        let guard = arena.borrow();
        assert_eq!(guard.live_buffers(), 1);
        assert_eq!(guard.live_bytes(), 3);
        drop(guard);
        assert_eq!(arena.pending_frees(), 0);

        let c = Buffer::allocate(&arena, 1).unwrap();
        assert_eq!(c.id(), first);
        drop((b, c));
        assert_eq!(arena.borrow().live_bytes(), 0);
    }

    #[test]
    fn slice_copies_into_fresh_storage() {
        let arena = BufferArena::shared();
        let buf = Buffer::from_bytes(&arena, vec![1, 2, 3, 4, 5]).unwrap();
        let tail = buf.slice(-2, None).unwrap();
        assert_eq!(&*tail.bytes(), &[4, 5]);
        tail.bytes_mut()[0] = 9;
        assert_eq!(buf.bytes()[3], 4);
        let empty = buf.slice(3, Some(1)).unwrap();
        assert_eq!(empty.byte_length(), 0);
    }

    #[test]
    fn pair_mut_borrows_both_directions() {
        let arena = BufferArena::shared();
        let a = Buffer::from_bytes(&arena, vec![1, 2]).unwrap();
        let b = Buffer::from_bytes(&arena, vec![0, 0]).unwrap();
        {
            let mut guard = arena.borrow_mut();
            let (src, dst) = guard.pair_mut(a.id(), b.id());
            dst.copy_from_slice(src);
        }
        assert_eq!(&*b.bytes(), &[1, 2]);
        {
            let mut guard = arena.borrow_mut();
            let (src, dst) = guard.pair_mut(b.id(), a.id());
            dst[0] = src[1] + 1;
        }
        assert_eq!(&*a.bytes(), &[3, 2]);
    }

    #[test]
    fn shrink_trims_trailing_free_slots() {
        let arena = BufferArena::shared();
        let a = Buffer::allocate(&arena, 1).unwrap();
        let b = Buffer::allocate(&arena, 1).unwrap();
        drop(b);
        arena.borrow_mut().shrink();
        assert_eq!(arena.borrow().live_buffers(), 1);
        drop(a);
        arena.borrow_mut().shrink();
        assert_eq!(arena.borrow().live_buffers(), 0);
    }
}
