//! The egress send queue: a FIFO of fully-encoded messages waiting to reach
//! the socket, each owning its bytes and the arena they were allocated from
//! so the arena outlives every write attempt on the message.
//!
//! Writes are resumed rather than restarted: `egress_event` may see a short
//! write (the sink is non-blocking), in which case the head element
//! remembers how much of itself has already gone out.

use std::collections::VecDeque;

use crate::arena::Arena;

/// One outstanding message: its encoded bytes (borrowed out of `arena`, kept
/// alive alongside them) and how much of the front has already been
/// written.
pub struct QueuedMessage {
    arena: Arena,
    bytes_len: usize,
    bytes_ptr: *const u8,
    written: usize,
}

// SAFETY: `bytes_ptr` points into `arena`'s own storage, which never moves
// chunks once allocated (see `Arena::alloc`/`alloc_copy`) and is owned by
// this struct, so the pointer stays valid for the struct's lifetime. A
// `QueuedMessage` is only ever touched from the connection that owns it.
unsafe impl Send for QueuedMessage {}

impl QueuedMessage {
    /// `encode` receives the arena and must return a slice allocated from
    /// it (typically via `Arena::alloc`/`alloc_copy`) holding the fully
    /// serialized LDAPMessage bytes.
    pub fn new(arena: Arena, encode: impl FnOnce(&Arena) -> &[u8]) -> Self {
        let bytes = encode(&arena);
        QueuedMessage {
            bytes_ptr: bytes.as_ptr(),
            bytes_len: bytes.len(),
            arena,
            written: 0,
        }
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: see the `unsafe impl Send` note above; `arena` is still
        // owned by `self` and never reallocates its existing chunks.
        unsafe { std::slice::from_raw_parts(self.bytes_ptr, self.bytes_len) }
    }

    pub fn remaining(&self) -> &[u8] {
        &self.bytes()[self.written..]
    }

    pub fn is_complete(&self) -> bool {
        self.written >= self.bytes_len
    }

    pub fn advance(&mut self, n: usize) {
        self.written = (self.written + n).min(self.bytes_len);
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}

/// FIFO of [`QueuedMessage`]s awaiting delivery. `egress_event` drains from
/// the front, advancing the head element on short writes and popping it
/// only once fully sent, so message order on the wire matches enqueue
/// order exactly.
#[derive(Default)]
pub struct SendQueue {
    messages: VecDeque<QueuedMessage>,
}

impl SendQueue {
    pub fn new() -> Self {
        SendQueue::default()
    }

    pub fn push(&mut self, message: QueuedMessage) {
        self.messages.push_back(message);
    }

    pub fn front(&self) -> Option<&QueuedMessage> {
        self.messages.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut QueuedMessage> {
        self.messages.front_mut()
    }

    /// Drop the head element once fully written. Returns `true` if an
    /// element was removed.
    pub fn pop_if_complete(&mut self) -> bool {
        match self.messages.front() {
            Some(head) if head.is_complete() => {
                self.messages.pop_front();
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(bytes: &[u8]) -> QueuedMessage {
        QueuedMessage::new(Arena::new(), |arena| arena.alloc_copy(bytes))
    }

    #[test]
    fn fifo_order_is_preserved() {
        let mut q = SendQueue::new();
        q.push(queued(b"first"));
        q.push(queued(b"second"));
        assert_eq!(q.front().unwrap().remaining(), b"first");
        q.front_mut().unwrap().advance(5);
        assert!(q.pop_if_complete());
        assert_eq!(q.front().unwrap().remaining(), b"second");
    }

    #[test]
    fn partial_write_is_resumed_not_restarted() {
        let mut q = SendQueue::new();
        q.push(queued(b"hello world"));
        q.front_mut().unwrap().advance(6);
        assert_eq!(q.front().unwrap().remaining(), b"world");
        assert!(!q.pop_if_complete());
        q.front_mut().unwrap().advance(5);
        assert!(q.pop_if_complete());
        assert!(q.is_empty());
    }
}
