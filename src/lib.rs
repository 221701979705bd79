//! A bidirectional, layered dispatch framework for LDAP endpoints.
//!
//! Unlike a client library, this crate has no notion of "the server" on the
//! other end of the wire: the same six-layer cascade (`dercursor` ↔
//! `ldapmessage` ↔ `opcode` ↔ `operation`) decodes and encodes messages in
//! both directions, so the same [`Connection`](connection::Connection) type
//! can sit on either side of a socket, with application behaviour supplied
//! entirely through the [`registry`] callbacks bound into a
//! [`Structural`](structural::Structural).

pub mod arena;
pub mod connection;
pub mod controls;
pub mod der;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod frame;
pub mod message;
pub mod opcode;
pub mod ops;
pub mod policy;
pub mod registry;
pub mod sendqueue;
pub mod structural;

pub use connection::{ByteSink, ByteSource, Connection};
pub use error::LdapError;
pub use ops::{MessageID, ProtocolOp, ProtocolOpTag};
pub use policy::RejectMask;
pub use registry::OpRegistry;
pub use structural::Structural;
