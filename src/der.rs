//! Thin DER cursor primitives used by the frame reader and the dispatch
//! pipeline's `dercursor`/`ldapmessage` layers.
//!
//! Everything below tag/length peeking is delegated to [`asn1_rs`], the
//! external DER/BER codec this crate builds on; this module only adds the
//! handful of "peek without fully decoding" operations the pipeline needs
//! before it knows which typed structure to hand a buffer to.

use crate::error::LdapError;
use asn1_rs::{Class, FromBer, Header};

/// Tag number of the outer `LDAPMessage` SEQUENCE.
pub const SEQUENCE_TAG: u8 = 0x30;

/// Result of peeking a TLV header without consuming its content.
#[derive(Debug, Clone, Copy)]
pub struct PeekedTag {
    pub class: Class,
    pub constructed: bool,
    pub tag: u32,
    /// Length of the header itself (tag + length octets), i.e. the offset
    /// at which the value bytes begin.
    pub header_len: usize,
    /// Length of the value, once the length octets are fully decoded.
    pub value_len: usize,
}

/// Peek a tag/length pair at the front of `bytes` without decoding content.
///
/// Returns `Ok(None)` if `bytes` does not yet contain a complete header
/// (more input is needed); this lets the frame reader distinguish "not
/// enough bytes yet" from a genuine framing error.
pub fn peek_tlv(bytes: &[u8]) -> Result<Option<PeekedTag>, LdapError> {
    match Header::from_ber(bytes) {
        Ok((rest, header)) => {
            let header_len = bytes.len() - rest.len();
            let value_len = header
                .length()
                .definite()
                .map_err(|_| LdapError::Framing("indefinite-length encoding is not supported"))?;
            Ok(Some(PeekedTag {
                class: header.class(),
                constructed: header.is_constructed(),
                tag: header.tag().0,
                header_len,
                value_len,
            }))
        }
        Err(asn1_rs::Err::Incomplete(_)) => Ok(None),
        Err(_) => Err(LdapError::Framing("malformed tag or length")),
    }
}

/// DER length octets (short or long form), appended to `out`.
pub(crate) fn push_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let be = len.to_be_bytes();
        let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let octets = &be[first_nonzero..];
        out.push(0x80 | octets.len() as u8);
        out.extend_from_slice(octets);
    }
}

/// A tag octet plus length-prefixed content, appended to `out`.
pub(crate) fn push_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    push_length(out, content.len());
    out.extend_from_slice(content);
}

/// Minimal-length two's complement big-endian encoding of a non-negative
/// value, used for both `INTEGER` and `ENUMERATED` (whose DER encodings are
/// identical save for the tag octet).
fn minimal_int_bytes(value: u32) -> Vec<u8> {
    let be = value.to_be_bytes();
    let first_nonzero = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    let mut content = be[first_nonzero..].to_vec();
    if content[0] & 0x80 != 0 {
        content.insert(0, 0);
    }
    content
}

pub(crate) fn push_integer(out: &mut Vec<u8>, value: u32) {
    push_tlv(out, 0x02, &minimal_int_bytes(value));
}

pub(crate) fn push_enumerated(out: &mut Vec<u8>, value: u32) {
    push_tlv(out, 0x0a, &minimal_int_bytes(value));
}

pub(crate) fn push_octet_string(out: &mut Vec<u8>, bytes: &[u8]) {
    push_tlv(out, 0x04, bytes);
}

pub(crate) fn push_boolean(out: &mut Vec<u8>, value: bool) {
    push_tlv(out, 0x01, &[if value { 0xff } else { 0x00 }]);
}

/// Advance past one complete TLV without decoding its content. Returns the
/// remaining bytes after the value, or `None` if `bytes` is not yet a
/// complete TLV.
pub fn skip_tlv(bytes: &[u8]) -> Result<Option<&[u8]>, LdapError> {
    match peek_tlv(bytes)? {
        Some(peeked) => {
            let total = peeked.header_len + peeked.value_len;
            if bytes.len() < total {
                Ok(None)
            } else {
                Ok(Some(&bytes[total..]))
            }
        }
        None => Ok(None),
    }
}
