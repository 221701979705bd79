//! Typed request/response structures for every operation the pipeline
//! understands, and their DER decode/encode implementations.
//!
//! The base RFC 4511 operations live in this module; extended operations
//! (StartTLS, Password Modify, Cancel, ...) live in [`extended`]; the filter
//! grammar lives in [`crate::filter`]; result codes and `LDAPResult` live in
//! [`result`].

pub mod add;
pub mod bind;
pub mod compare;
pub mod extended;
pub mod modify;
pub mod result;
pub mod search;

use rusticata_macros::newtype_enum;
use std::borrow::Cow;

pub use result::{LdapResult, ResultCode};

/// RFC 4511 application tag numbers, plus the synthetic numbers this crate
/// assigns to parsed extended operations (see [`crate::opcode`]).
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct ProtocolOpTag(pub u32);

newtype_enum! {
impl display ProtocolOpTag {
    BindRequest = 0,
    BindResponse = 1,
    UnbindRequest = 2,
    SearchRequest = 3,
    SearchResultEntry = 4,
    SearchResultDone = 5,
    ModifyRequest = 6,
    ModifyResponse = 7,
    AddRequest = 8,
    AddResponse = 9,
    DelRequest = 10,
    DelResponse = 11,
    ModDnRequest = 12,
    ModDnResponse = 13,
    CompareRequest = 14,
    CompareResponse = 15,
    AbandonRequest = 16,
    SearchResultReference = 19,
    ExtendedRequest = 23,
    ExtendedResponse = 24,
    IntermediateResponse = 25,
}
}

/// `MessageID ::= INTEGER (0 .. maxInt)`
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct MessageID(pub u32);

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct SearchScope(pub u32);

newtype_enum! {
impl debug SearchScope {
    BaseObject = 0,
    SingleLevel = 1,
    WholeSubtree = 2,
}
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DerefAliases(pub u32);

newtype_enum! {
impl debug DerefAliases {
    NeverDerefAliases = 0,
    DerefInSearching = 1,
    DerefFindingBaseObj = 2,
    DerefAlways = 3,
}
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ModifyOperation(pub u32);

newtype_enum! {
impl debug ModifyOperation {
    Add = 0,
    Delete = 1,
    Replace = 2,
}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdapString<'a>(pub Cow<'a, str>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdapDN<'a>(pub Cow<'a, str>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelativeLdapDN<'a>(pub Cow<'a, str>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdapOID<'a>(pub Cow<'a, str>);

/// One message's worth of decoded operation, still tagged with its opcode.
///
/// This is the shape the `operation` ingress layer hands to registry
/// callbacks, and the shape the egress `operation` layer accepts from
/// `put_operation`. Extended operations are pre-unwrapped by the `opcode`
/// layer into their specific variant; [`ProtocolOp::ExtendedRequest`] and
/// [`ProtocolOp::ExtendedResponse`] remain available for callbacks that want
/// the raw OID/value form instead.
#[derive(Clone, Debug, PartialEq)]
pub enum ProtocolOp<'a> {
    BindRequest(bind::BindRequest<'a>),
    BindResponse(bind::BindResponse<'a>),
    UnbindRequest,
    SearchRequest(search::SearchRequest<'a>),
    SearchResultEntry(search::SearchResultEntry<'a>),
    SearchResultDone(LdapResult<'a>),
    SearchResultReference(Vec<LdapString<'a>>),
    ModifyRequest(modify::ModifyRequest<'a>),
    ModifyResponse(modify::ModifyResponse<'a>),
    AddRequest(add::AddRequest<'a>),
    AddResponse(LdapResult<'a>),
    DelRequest(LdapDN<'a>),
    DelResponse(LdapResult<'a>),
    ModDnRequest(add::ModDnRequest<'a>),
    ModDnResponse(LdapResult<'a>),
    CompareRequest(compare::CompareRequest<'a>),
    CompareResponse(LdapResult<'a>),
    AbandonRequest(MessageID),
    ExtendedRequest(extended::ExtendedRequest<'a>),
    ExtendedResponse(extended::ExtendedResponse<'a>),
    IntermediateResponse(extended::IntermediateResponse<'a>),
}

impl ProtocolOp<'_> {
    pub fn tag(&self) -> ProtocolOpTag {
        let op = match self {
            ProtocolOp::BindRequest(_) => 0,
            ProtocolOp::BindResponse(_) => 1,
            ProtocolOp::UnbindRequest => 2,
            ProtocolOp::SearchRequest(_) => 3,
            ProtocolOp::SearchResultEntry(_) => 4,
            ProtocolOp::SearchResultDone(_) => 5,
            ProtocolOp::ModifyRequest(_) => 6,
            ProtocolOp::ModifyResponse(_) => 7,
            ProtocolOp::AddRequest(_) => 8,
            ProtocolOp::AddResponse(_) => 9,
            ProtocolOp::DelRequest(_) => 10,
            ProtocolOp::DelResponse(_) => 11,
            ProtocolOp::ModDnRequest(_) => 12,
            ProtocolOp::ModDnResponse(_) => 13,
            ProtocolOp::CompareRequest(_) => 14,
            ProtocolOp::CompareResponse(_) => 15,
            ProtocolOp::AbandonRequest(_) => 16,
            ProtocolOp::SearchResultReference(_) => 19,
            ProtocolOp::ExtendedRequest(_) => 23,
            ProtocolOp::ExtendedResponse(_) => 24,
            ProtocolOp::IntermediateResponse(_) => 25,
        };
        ProtocolOpTag(op)
    }

    /// Encode this operation's `protocolOp` DER bytes (the `[APPLICATION n]`
    /// tagged body, not the enclosing `LDAPMessage` SEQUENCE).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ProtocolOp::BindRequest(r) => r.encode(),
            ProtocolOp::BindResponse(r) => r.encode(),
            ProtocolOp::UnbindRequest => {
                let mut out = Vec::new();
                out.push(0x42); // [APPLICATION 2], primitive, no content
                out.push(0x00);
                out
            }
            ProtocolOp::SearchRequest(r) => r.encode(),
            ProtocolOp::SearchResultEntry(r) => r.encode(),
            ProtocolOp::SearchResultDone(r) => r.encode(5),
            ProtocolOp::SearchResultReference(uris) => {
                let mut content = Vec::new();
                for uri in uris {
                    crate::der::push_octet_string(&mut content, uri.0.as_bytes());
                }
                let mut out = Vec::new();
                crate::der::push_tlv(&mut out, 0x73, &content); // [APPLICATION 19]
                out
            }
            ProtocolOp::ModifyRequest(r) => r.encode(),
            ProtocolOp::ModifyResponse(r) => r.encode(),
            ProtocolOp::AddRequest(r) => r.encode(),
            ProtocolOp::AddResponse(r) => r.encode(9),
            ProtocolOp::DelRequest(dn) => {
                let mut out = Vec::new();
                out.push(0x4a); // [APPLICATION 10], primitive, IMPLICIT over OCTET STRING
                crate::der::push_length(&mut out, dn.0.len());
                out.extend_from_slice(dn.0.as_bytes());
                out
            }
            ProtocolOp::DelResponse(r) => r.encode(11),
            ProtocolOp::ModDnRequest(r) => r.encode(),
            ProtocolOp::ModDnResponse(r) => r.encode(13),
            ProtocolOp::CompareRequest(r) => r.encode(),
            ProtocolOp::CompareResponse(r) => r.encode(15),
            ProtocolOp::AbandonRequest(id) => {
                let mut out = Vec::new();
                out.push(0x50); // [APPLICATION 16], primitive, IMPLICIT over INTEGER
                let bytes = id.0.to_be_bytes();
                let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(3);
                let content = &bytes[first_nonzero..];
                crate::der::push_length(&mut out, content.len());
                out.extend_from_slice(content);
                out
            }
            ProtocolOp::ExtendedRequest(r) => r.encode(),
            ProtocolOp::ExtendedResponse(r) => r.encode(),
            ProtocolOp::IntermediateResponse(r) => r.encode(),
        }
    }

    /// Borrow the embedded `LDAPResult`, for operations that carry one.
    pub fn result(&self) -> Option<&LdapResult> {
        match self {
            ProtocolOp::BindResponse(r) => Some(&r.result),
            ProtocolOp::ModifyResponse(r) => Some(&r.result),
            ProtocolOp::ExtendedResponse(r) => Some(&r.result),
            ProtocolOp::SearchResultDone(r)
            | ProtocolOp::AddResponse(r)
            | ProtocolOp::DelResponse(r)
            | ProtocolOp::ModDnResponse(r)
            | ProtocolOp::CompareResponse(r) => Some(r),
            _ => None,
        }
    }
}
