//! Element copies between views.
//!
//! `copy_within` handles a destination and source that share one buffer, `copy_between` two
//! distinct buffers. Offsets are absolute byte positions in the backing buffer, so overlap is
//! decided on the actual byte ranges rather than on element indices.

use smallvec::SmallVec;

use crate::error::MemoryError;
use crate::layout::ViewLayout;

/// Checks that `source_len` elements fit into `dst` starting at element `offset`.
pub fn check_set_bounds(dst: &ViewLayout, offset: usize, source_len: usize) -> Result<(), MemoryError> {
    match offset.checked_add(source_len) {
        Some(end) if end <= dst.length => Ok(()),
        _ => Err(MemoryError::OutOfBounds("offset or source length out of bounds")),
    }
}

/// Copies every element of `src` into `dst` at element `offset`, both views over `bytes`.
///
/// The result equals copying `src` to a temporary first and then writing the temporary into
/// `dst`, for any overlap of the two byte ranges.
pub fn copy_within(bytes: &mut [u8], dst: &ViewLayout, offset: usize, src: &ViewLayout) {
    if src.length == 0 {
        return;
    }
    if dst.kind == src.kind {
        let at = dst.byte_index(offset);
        bytes.copy_within(src.byte_offset..src.byte_offset + src.byte_length(), at);
        return;
    }
    if dst.kind.size() >= src.kind.size() {
        copy_widening(bytes, dst, offset, src);
    } else {
        copy_narrowing(bytes, dst, offset, src);
    }
}

/// Copies every element of `src` (in `src_bytes`) into `dst` (in `dst_bytes`) at `offset`.
pub fn copy_between(
    dst_bytes: &mut [u8],
    dst: &ViewLayout,
    offset: usize,
    src_bytes: &[u8],
    src: &ViewLayout,
) {
    if dst.kind == src.kind {
        let at = dst.byte_index(offset);
        let len = src.byte_length();
        dst_bytes[at..at + len].copy_from_slice(&src_bytes[src.byte_offset..src.byte_offset + len]);
        return;
    }
    for k in 0..src.length {
        let value = src.kind.load(src_bytes, src.byte_index(k));
        dst.kind.store(dst_bytes, dst.byte_index(offset + k), value);
    }
}

/// Signed distance between where element `k` is written and where it is read.
#[inline]
fn gap(dst: &ViewLayout, offset: usize, src: &ViewLayout, k: usize) -> i64 {
    dst.byte_index(offset + k) as i64 - src.byte_index(k) as i64
}

#[inline]
fn move_one(bytes: &mut [u8], dst: &ViewLayout, offset: usize, src: &ViewLayout, k: usize) {
    let value = src.kind.load(bytes, src.byte_index(k));
    dst.kind.store(bytes, dst.byte_index(offset + k), value);
}

/// Destination elements at least as wide as source elements.
///
/// The gap grows with `k`. A forward pass is safe while the write of element `k` ends at or
/// before the read of element `k + 1`; a backward pass is safe while the write of element `k`
/// starts at or after the end of source element `k - 1`. Whatever neither pass can take is
/// staged and written last.
fn copy_widening(bytes: &mut [u8], dst: &ViewLayout, offset: usize, src: &ViewLayout) {
    let n = src.length;
    let mut i = 0;
    while i < n && gap(dst, offset, src, i + 1) <= 0 {
        move_one(bytes, dst, offset, src, i);
        i += 1;
    }
    let mut j = n;
    while j > i && gap(dst, offset, src, j - 1) >= 0 {
        move_one(bytes, dst, offset, src, j - 1);
        j -= 1;
    }
    let staged: SmallVec<[f64; 8]> = (i..j)
        .map(|k| src.kind.load(bytes, src.byte_index(k)))
        .collect();
    for (k, value) in (i..j).zip(staged) {
        dst.kind.store(bytes, dst.byte_index(offset + k), value);
    }
}

/// Destination elements narrower than source elements.
///
/// The gap shrinks with `k`, so the forward-safe elements form a suffix and the backward-safe
/// ones a prefix. The suffix is written first, front to back, and never touches the prefix's
/// source bytes; the prefix then runs back to front. No staging is needed.
fn copy_narrowing(bytes: &mut [u8], dst: &ViewLayout, offset: usize, src: &ViewLayout) {
    let n = src.length;
    let t = (0..n)
        .find(|&k| gap(dst, offset, src, k + 1) <= 0)
        .unwrap_or(n);
    for k in t..n {
        move_one(bytes, dst, offset, src, k);
    }
    for k in (0..t).rev() {
        move_one(bytes, dst, offset, src, k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn layout(kind: ElementKind, byte_offset: usize, length: usize) -> ViewLayout {
        ViewLayout {
            kind,
            byte_offset,
            length,
        }
    }

    #[test]
    fn same_kind_overlap_is_memmove() {
        let mut bytes = [1, 2, 3, 4, 5, 6];
        let v = layout(ElementKind::Uint8, 0, 6);
        let src = v.subarray(0, Some(4));
        copy_within(&mut bytes, &v, 2, &src);
        assert_eq!(bytes, [1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn widening_onto_own_bytes() {
        // Uint8 [1, 2, 3, 4] at bytes 0..4 spread into Uint16 covering bytes 0..8.
        let mut bytes = [1u8, 2, 3, 4, 0, 0, 0, 0];
        let src = layout(ElementKind::Uint8, 0, 4);
        let dst = layout(ElementKind::Uint16, 0, 4);
        copy_within(&mut bytes, &dst, 0, &src);
        let got: Vec<f64> = (0..4).filter_map(|i| dst.get(&bytes, i)).collect();
        assert_eq!(got, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn narrowing_onto_own_bytes() {
        let mut bytes = [0u8; 16];
        let src = layout(ElementKind::Int32, 0, 4);
        for (i, v) in [10.0, -20.0, 30.0, 40.0].into_iter().enumerate() {
            src.set(&mut bytes, i, v);
        }
        let dst = layout(ElementKind::Int8, 2, 4);
        copy_within(&mut bytes, &dst, 0, &src);
        let got: Vec<f64> = (0..4).filter_map(|i| dst.get(&bytes, i)).collect();
        assert_eq!(got, [10.0, -20.0, 30.0, 40.0]);
    }

    #[test]
    fn bounds_check() {
        let dst = layout(ElementKind::Uint8, 0, 4);
        assert!(check_set_bounds(&dst, 1, 3).is_ok());
        assert_eq!(
            check_set_bounds(&dst, 2, 3),
            Err(MemoryError::OutOfBounds("offset or source length out of bounds"))
        );
        assert!(check_set_bounds(&dst, usize::MAX, 1).is_err());
    }
}
