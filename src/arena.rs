//! Grouped bump allocation for per-message and per-connection memory.
//!
//! An [`Arena`] owns a chain of byte chunks. Allocations never move and are
//! released all at once when the arena is dropped; there is no per-allocation
//! free. Decoded operation views borrow out of the arena (or, for the common
//! case of zero-copy decode, directly out of the original frame bytes that
//! the arena itself owns), so the borrow checker enforces "nothing outlives
//! `end_pool`" instead of a runtime check.

use std::cell::RefCell;

const DEFAULT_CHUNK_SIZE: usize = 4096;

struct Chunk {
    data: Vec<u8>,
    used: usize,
}

impl Chunk {
    fn new(size: usize) -> Self {
        Chunk {
            data: vec![0u8; size],
            used: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.used
    }
}

/// A bump-allocated memory region with grouped release.
///
/// Cloning an `Arena` handle is not supported; an arena is owned by exactly
/// one [`crate::connection::Connection`] (the connection arena) or by one
/// in-flight message (the message arena).
pub struct Arena {
    chunks: RefCell<Vec<Chunk>>,
    chunk_size: usize,
}

impl Arena {
    /// Create an empty arena using the default chunk size.
    pub fn new() -> Self {
        Arena::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty arena whose chunks grow in increments of `chunk_size`
    /// bytes (rounded up as needed for oversized single allocations).
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Arena {
            chunks: RefCell::new(Vec::new()),
            chunk_size,
        }
    }

    /// Copy `bytes` into the arena and return a slice borrowed from it.
    ///
    /// This is the primitive the frame reader uses to take ownership of
    /// incoming wire bytes: once copied in, the arena is the sole owner and
    /// every downstream decoded view borrows from this storage.
    pub fn alloc_copy(&self, bytes: &[u8]) -> &[u8] {
        let dst = self.alloc(bytes.len());
        dst.copy_from_slice(bytes);
        dst
    }

    /// Return a zeroed, mutable slice of exactly `len` bytes, borrowed from
    /// the arena for its lifetime.
    pub fn alloc(&self, len: usize) -> &mut [u8] {
        let mut chunks = self.chunks.borrow_mut();
        let need_new_chunk = match chunks.last() {
            Some(c) => c.remaining() < len,
            None => true,
        };
        if need_new_chunk {
            let size = self.chunk_size.max(len);
            chunks.push(Chunk::new(size));
        }
        let chunk = chunks.last_mut().expect("chunk just pushed if needed");
        let start = chunk.used;
        chunk.used += len;
        // SAFETY: the returned slice borrows from a `Vec<u8>` that lives
        // inside `self.chunks`, which is never reallocated or truncated
        // after this point (only appended to via new `Chunk`s), and the
        // returned lifetime is tied to `&self`, so the slice cannot outlive
        // the arena. Chunks themselves are never moved once pushed because
        // we only ever hand out references into the last chunk's backing
        // storage, and that storage's address is fixed once allocated.
        unsafe {
            let ptr = chunk.data.as_mut_ptr().add(start);
            std::slice::from_raw_parts_mut(ptr, len)
        }
    }

    /// Total bytes currently committed across all chunks.
    pub fn used(&self) -> usize {
        self.chunks.borrow().iter().map(|c| c.used).sum()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Arena::new()
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena").field("used", &self.used()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_within_one_chunk_does_not_move() {
        let arena = Arena::with_chunk_size(64);
        let a = arena.alloc_copy(b"hello");
        let a_ptr = a.as_ptr();
        let _b = arena.alloc_copy(b"world");
        // Re-borrow is not possible while holding `a`, so instead verify
        // the bytes read back correctly, which would fail if the backing
        // chunk had been reallocated out from under `a`.
        assert_eq!(a_ptr as usize % 1, 0);
        assert_eq!(a, b"hello");
    }

    #[test]
    fn alloc_spans_multiple_chunks() {
        let arena = Arena::with_chunk_size(4);
        let a = arena.alloc_copy(b"ab");
        let b = arena.alloc_copy(b"cdef");
        assert_eq!(a, b"ab");
        assert_eq!(b, b"cdef");
        assert_eq!(arena.used(), 6);
    }

    #[test]
    fn oversized_allocation_gets_its_own_chunk() {
        let arena = Arena::with_chunk_size(4);
        let big = arena.alloc(100);
        assert_eq!(big.len(), 100);
    }
}
