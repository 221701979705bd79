//! `Connection`: one LDAP endpoint over a non-blocking byte source/sink
//! pair, driven by the two edge-triggered entry points `ingress_event` and
//! `egress_event`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::arena::Arena;
use crate::dispatch;
use crate::error::LdapError;
use crate::frame::FrameReader;
use crate::ops::{MessageID, ProtocolOp};
use crate::sendqueue::{QueuedMessage, SendQueue};
use crate::structural::Structural;

/// A non-blocking ingress byte channel. Must never block; a would-block
/// condition is reported as `Ok(0)` (mirroring `TcpStream::try_read`'s
/// "no data yet" case folded into a short read by the frame reader, which
/// treats `0` as "nothing more available right now").
pub trait ByteSource {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, LdapError>;
}

/// A non-blocking egress byte channel.
pub trait ByteSink {
    fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError>;
}

fn io_result(r: std::io::Result<usize>) -> Result<usize, LdapError> {
    match r {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(LdapError::Io(e)),
    }
}

impl ByteSource for tokio::net::TcpStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, LdapError> {
        io_result(tokio::net::TcpStream::try_read(self, buf))
    }
}

impl ByteSink for tokio::net::TcpStream {
    fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError> {
        io_result(tokio::net::TcpStream::try_write(self, buf))
    }
}

impl ByteSource for tokio::net::UnixStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, LdapError> {
        io_result(tokio::net::UnixStream::try_read(self, buf))
    }
}

impl ByteSink for tokio::net::UnixStream {
    fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError> {
        io_result(tokio::net::UnixStream::try_write(self, buf))
    }
}

/// RFC 1823-style diagnostic slots, mirrored from the outcome of every
/// ingress/egress entry point for applications written against that
/// convention.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticState {
    pub ld_errno: i32,
    pub ld_matched: Option<String>,
    pub ld_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

/// One logical LDAP socket pair: a byte source, a byte sink, the frame
/// reader assembling the current inbound message, the outbound send queue,
/// a long-lived connection arena, and the shared `Structural` this
/// connection was built against.
///
/// The source and sink are boxed trait objects rather than type parameters:
/// the registry's callbacks (§4.7) are bound once into a `Structural` that
/// is shared by every connection it is attached to, regardless of whether
/// that connection rides a `TcpStream`, a `UnixStream`, or a test harness,
/// so `Connection` itself must be a single concrete type for a callback
/// signature to name.
///
/// Not `Sync`: §5 requires a connection never be driven from two threads at
/// once, and the interior frame-reader/send-queue state is not safe for
/// concurrent access without that guarantee.
pub struct Connection {
    structural: Arc<Structural>,
    source: Box<dyn ByteSource + Send>,
    sink: Box<dyn ByteSink + Send>,
    reader: FrameReader,
    send_queue: SendQueue,
    connection_arena: Arena,
    pending_requests: HashMap<u32, ProtocolOpTagStub>,
    pub diagnostics: DiagnosticState,
    pub state: ConnectionState,
    next_message_id: u32,
}

/// Placeholder for the originating request's opcode, stashed so the
/// reply-context index (`pending_requests`) can be consulted by future
/// opresp-layer policy without re-decoding the original request.
pub type ProtocolOpTagStub = u32;

impl Connection {
    pub fn new(
        structural: Arc<Structural>,
        source: impl ByteSource + Send + 'static,
        sink: impl ByteSink + Send + 'static,
    ) -> Self {
        Connection {
            structural,
            source: Box::new(source),
            sink: Box::new(sink),
            reader: FrameReader::new(),
            send_queue: SendQueue::new(),
            connection_arena: Arena::new(),
            pending_requests: HashMap::new(),
            diagnostics: DiagnosticState::default(),
            state: ConnectionState::Open,
            next_message_id: 1,
        }
    }

    pub fn structural(&self) -> &Arc<Structural> {
        &self.structural
    }

    pub fn connection_arena(&self) -> &Arena {
        &self.connection_arena
    }

    /// Allocate the next outgoing message id (wrapping, as RFC 4511 leaves
    /// the numbering space to the implementation).
    pub fn next_message_id(&mut self) -> MessageID {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1).max(1);
        MessageID(id)
    }

    pub fn note_pending_request(&mut self, msg_id: MessageID, opcode: u32) {
        self.pending_requests.insert(msg_id.0, opcode);
    }

    pub fn take_pending_request(&mut self, msg_id: MessageID) -> Option<u32> {
        self.pending_requests.remove(&msg_id.0)
    }

    /// Pull and dispatch as many complete frames as `self.source` yields
    /// without blocking. Returns the number of bytes consumed this call.
    pub fn ingress_event(&mut self) -> Result<usize, LdapError> {
        if self.state == ConnectionState::Closed {
            return Ok(0);
        }
        let mut total = 0;
        loop {
            let frame = match self.reader.ingress_event(&mut self.source) {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(total),
                Err(e) => {
                    self.fail(&e);
                    return Err(e);
                }
            };
            total += frame.bytes().len();
            if let Err(e) = dispatch::ingress::dispatch_frame(self, &frame) {
                self.fail(&e);
                return Err(e);
            }
        }
    }

    /// Drain the send queue into `self.sink` without blocking, resuming a
    /// short write from where it left off.
    pub fn egress_event(&mut self) -> Result<usize, LdapError> {
        if self.state == ConnectionState::Closed {
            return Ok(0);
        }
        let mut total = 0;
        loop {
            let Some(head) = self.send_queue.front_mut() else {
                return Ok(total);
            };
            if head.remaining().is_empty() {
                self.send_queue.pop_if_complete();
                continue;
            }
            match self.sink.try_write(head.remaining()) {
                Ok(0) => return Ok(total),
                Ok(n) => {
                    head.advance(n);
                    total += n;
                    self.send_queue.pop_if_complete();
                }
                Err(e) => {
                    self.fail(&e);
                    return Err(e);
                }
            }
        }
    }

    pub fn enqueue(&mut self, message: QueuedMessage) {
        self.send_queue.push(message);
    }

    pub fn can_send(&self) -> bool {
        !self.send_queue.is_empty()
    }

    fn fail(&mut self, error: &LdapError) {
        self.diagnostics.ld_errno = error.ld_errno();
        self.diagnostics.ld_error = Some(error.to_string());
        if error.is_fatal() {
            self.state = ConnectionState::Closed;
        }
    }
}

/// Generic egress entry point: encode `op` with `controls` under `msg_id`
/// and enqueue it. Typed `put_<operation>` wrappers in [`dispatch::egress`]
/// forward here after building the right `ProtocolOp` variant.
pub fn put_operation(
    conn: &mut Connection,
    msg_id: MessageID,
    op: &ProtocolOp<'_>,
    controls: &[crate::controls::Control<'_>],
) -> Result<(), LdapError> {
    dispatch::egress::dispatch_operation(conn, msg_id, op, controls)
}

#[cfg(test)]
impl Connection {
    /// A connection with no real I/O, for unit tests of layers above the
    /// byte-source boundary (e.g. the registry).
    pub fn for_test() -> Self {
        Connection::new(Structural::builder().build(), tests::NullSource, tests::NullSink)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub struct NullSource;
    impl ByteSource for NullSource {
        fn try_read(&mut self, _buf: &mut [u8]) -> Result<usize, LdapError> {
            Ok(0)
        }
    }

    pub struct NullSink;
    impl ByteSink for NullSink {
        fn try_write(&mut self, _buf: &[u8]) -> Result<usize, LdapError> {
            Ok(0)
        }
    }

    /// An in-memory duplex byte pair implementing `ByteSource`/`ByteSink`,
    /// used by integration tests that need a real wire round trip without a
    /// socket.
    pub struct DuplexPair {
        pub inbound: std::collections::VecDeque<u8>,
        pub outbound: Vec<u8>,
    }

    impl ByteSource for DuplexPair {
        fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, LdapError> {
            let n = buf.len().min(self.inbound.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.inbound.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl ByteSink for DuplexPair {
        fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError> {
            self.outbound.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn fresh_connection_is_open() {
        let conn = Connection::for_test();
        assert_eq!(conn.state, ConnectionState::Open);
        assert_eq!(conn.diagnostics.ld_errno, 0);
    }

    #[test]
    fn message_ids_increment() {
        let mut conn = Connection::for_test();
        let a = conn.next_message_id();
        let b = conn.next_message_id();
        assert_eq!(a.0 + 1, b.0);
    }
}
