//! LDAPMessage outer framing: on ingress, split a frame into
//! `(messageID, protocolOp bytes, controls)` without decoding the operation
//! itself; on egress, wrap an already-encoded operation back into a full
//! LDAPMessage.

use asn1_rs::{Class, FromBer, Header};

use crate::arena::Arena;
use crate::controls::{self, Control};
use crate::der::{self, SEQUENCE_TAG};
use crate::error::LdapError;
use crate::ops::MessageID;

/// One ingress frame's outer layer: the protocolOp is still raw bytes
/// (header included), tagged with its application number, ready for the
/// `opcode` layer to peek.
pub struct RawMessage<'a> {
    pub message_id: MessageID,
    pub op_tag: u32,
    pub op_bytes: &'a [u8],
    pub controls: Vec<Control<'a>>,
}

/// `LDAPMessage ::= SEQUENCE { messageID MessageID, protocolOp CHOICE {...},
/// controls [0] Controls OPTIONAL }`
pub fn decode(bytes: &[u8]) -> Result<RawMessage<'_>, LdapError> {
    let (rest, outer) =
        Header::from_ber(bytes).map_err(|_| LdapError::Framing("malformed LDAPMessage header"))?;
    if outer.tag().0 != 16 || !outer.is_constructed() {
        return Err(LdapError::Framing("LDAPMessage is not a SEQUENCE"));
    }
    let body_len = outer
        .length()
        .definite()
        .map_err(|_| LdapError::Framing("indefinite-length LDAPMessage"))?;
    if rest.len() < body_len {
        return Err(LdapError::Framing("LDAPMessage shorter than its declared length"));
    }
    let body = &rest[..body_len];

    let (after_id, message_id) =
        MessageID::from_ber(body).map_err(|_| LdapError::Decode("messageID".into()))?;

    let op_peek = der::peek_tlv(after_id)?.ok_or(LdapError::Decode("protocolOp".into()))?;
    let op_total = op_peek.header_len + op_peek.value_len;
    if after_id.len() < op_total {
        return Err(LdapError::Decode("protocolOp truncated".into()));
    }
    let op_bytes = &after_id[..op_total];
    let after_op = &after_id[op_total..];

    let controls = if after_op.is_empty() {
        Vec::new()
    } else {
        let ctl_peek = der::peek_tlv(after_op)?.ok_or(LdapError::Decode("controls".into()))?;
        if ctl_peek.class != Class::ContextSpecific || ctl_peek.tag != 0 {
            return Err(LdapError::Decode("unexpected trailing bytes after protocolOp".into()));
        }
        let value = &after_op[ctl_peek.header_len..ctl_peek.header_len + ctl_peek.value_len];
        let (_, controls) = controls::parse_controls(value).map_err(|e| match e {
            nom::Err::Incomplete(_) => LdapError::Decode("controls truncated".into()),
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        })?;
        controls
    };

    Ok(RawMessage {
        message_id,
        op_tag: op_peek.tag,
        op_bytes,
        controls,
    })
}

/// Wrap `op_bytes` (a complete, already-tagged protocolOp TLV) and an
/// optional pre-encoded `[0] Controls` TLV into a full LDAPMessage,
/// allocated from `arena`.
pub fn encode<'a>(
    arena: &'a Arena,
    message_id: MessageID,
    op_bytes: &[u8],
    controls_bytes: Option<&[u8]>,
) -> &'a [u8] {
    let mut body = Vec::with_capacity(op_bytes.len() + 16);
    der::push_integer(&mut body, message_id.0);
    body.extend_from_slice(op_bytes);
    if let Some(controls) = controls_bytes {
        body.extend_from_slice(controls);
    }

    let mut framed = Vec::with_capacity(body.len() + 6);
    der::push_tlv(&mut framed, SEQUENCE_TAG, &body);

    arena.alloc_copy(&framed)
}

/// Encode a `Controls ::= SEQUENCE OF Control` list under its `[0]` context
/// tag, for passing as `controls_bytes` to [`encode`].
pub fn encode_controls(controls: &[Control<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for c in controls {
        let mut control = Vec::new();
        der::push_octet_string(&mut control, c.control_type.0.as_bytes());
        if c.criticality {
            der::push_boolean(&mut control, true);
        }
        if let Some(value) = &c.control_value {
            der::push_octet_string(&mut control, value);
        }
        der::push_tlv(&mut body, SEQUENCE_TAG, &control);
    }
    let mut out = Vec::new();
    der::push_tlv(&mut out, 0xa0, &body); // [0] constructed, context-specific
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_message_id_and_op_bytes() {
        // SEQUENCE { INTEGER 7, [APPLICATION 2] (UnbindRequest, empty) }
        let bytes = [0x30, 0x05, 0x02, 0x01, 0x07, 0x42, 0x00];
        let msg = decode(&bytes).unwrap();
        assert_eq!(msg.message_id.0, 7);
        assert_eq!(msg.op_tag, 2);
        assert_eq!(msg.op_bytes, &[0x42, 0x00]);
        assert!(msg.controls.is_empty());
    }

    #[test]
    fn round_trips_message_id_through_encode() {
        let arena = Arena::new();
        let op_bytes = [0x42u8, 0x00];
        let out = encode(&arena, MessageID(300), &op_bytes, None);
        let msg = decode(out).unwrap();
        assert_eq!(msg.message_id.0, 300);
        assert_eq!(msg.op_bytes, &op_bytes);
    }
}
