//! Error types returned by the dispatch pipeline.

use thiserror::Error;

/// Errors distinguishing the ways a connection's ingress or egress pipeline
/// can fail to carry a message through to completion.
#[derive(Debug, Error)]
pub enum LdapError {
    /// The underlying byte source or sink reported an I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame's outer SEQUENCE/length could not be parsed.
    #[error("framing error: {0}")]
    Framing(&'static str),

    /// A frame was well-formed but an interior ASN.1 field failed to decode.
    #[error("decode error: {0}")]
    Decode(String),

    /// The opcode was refused by the connection's reject mask or a control
    /// policy hook.
    #[error("operation rejected by policy")]
    PolicyRejected,

    /// No registry callback is bound for the opcode.
    #[error("operation not implemented")]
    NotImplemented,

    /// Arena allocation failed (the chunk size requested exceeds any
    /// practical message, or the allocator is out of memory).
    #[error("resource exhausted: {0}")]
    ResourceExhausted(&'static str),

    /// A user-supplied callback returned an error.
    #[error("callback error: {0}")]
    Callback(String),
}

impl LdapError {
    /// Whether this error tears down the connection (§7: Io, Framing, and
    /// ResourceExhausted are only fatal when connection-level state, rather
    /// than a single message, failed to allocate — callers distinguish that
    /// case themselves and only call this for the connection-level kind).
    pub fn is_fatal(&self) -> bool {
        matches!(self, LdapError::Io(_) | LdapError::Framing(_))
    }

    /// A small RFC 1823-flavoured numeric code, mirrored onto
    /// `Connection::diagnostics.ld_errno` so applications written against
    /// that convention can branch on it without matching the Rust enum.
    pub fn ld_errno(&self) -> i32 {
        match self {
            LdapError::Io(_) => 1,
            LdapError::Framing(_) => 2,
            LdapError::Decode(_) => 3,
            LdapError::PolicyRejected => 4,
            LdapError::NotImplemented => 5,
            LdapError::ResourceExhausted(_) => 6,
            LdapError::Callback(_) => 7,
        }
    }
}

impl From<asn1_rs::Error> for LdapError {
    fn from(e: asn1_rs::Error) -> Self {
        LdapError::Decode(e.to_string())
    }
}

impl From<nom::Err<LdapError>> for LdapError {
    fn from(e: nom::Err<LdapError>) -> Self {
        match e {
            nom::Err::Incomplete(_) => LdapError::Decode("incomplete input".into()),
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}

impl nom::error::ParseError<&[u8]> for LdapError {
    fn from_error_kind(_input: &[u8], kind: nom::error::ErrorKind) -> Self {
        LdapError::Decode(format!("{:?}", kind))
    }

    fn append(_input: &[u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl<E> nom::error::FromExternalError<&[u8], E> for LdapError
where
    E: std::fmt::Display,
{
    fn from_external_error(_input: &[u8], _kind: nom::error::ErrorKind, e: E) -> Self {
        LdapError::Decode(e.to_string())
    }
}

pub type Result<'a, T> = std::result::Result<(&'a [u8], T), nom::Err<LdapError>>;
