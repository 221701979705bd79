//! Opcode numbering shared by ingress and egress, and the reject-mask bit
//! layout.
//!
//! RFC 4511 opcodes (0-16, 19, 23-25) are fixed by the protocol. Extended
//! operations recognised by OID are assigned synthetic numbers starting at
//! 32, in the order they are listed here, so that both dispatch directions
//! agree on numbering purely by sharing this module (no runtime table is
//! needed to keep them in sync).

use crate::ops::ProtocolOpTag;

/// Synthetic opcode numbers for parsed extended operations. Values below 32
/// are reserved for RFC 4511 base operations (see [`ProtocolOpTag`]).
pub mod extended_opcode {
    pub const START_TLS_REQUEST: u32 = 32;
    pub const START_TLS_RESPONSE: u32 = 33;
    pub const PASSWD_MODIFY_REQUEST: u32 = 34;
    pub const PASSWD_MODIFY_RESPONSE: u32 = 35;
    pub const WHOAMI_REQUEST: u32 = 36;
    pub const WHOAMI_RESPONSE: u32 = 37;
    pub const CANCEL_REQUEST: u32 = 38;
    pub const CANCEL_RESPONSE: u32 = 39;
    pub const START_LBURP_REQUEST: u32 = 40;
    pub const START_LBURP_RESPONSE: u32 = 41;
    pub const LBURP_UPDATE_REQUEST: u32 = 42;
    pub const LBURP_UPDATE_RESPONSE: u32 = 43;
    pub const END_LBURP_REQUEST: u32 = 44;
    pub const END_LBURP_RESPONSE: u32 = 45;
    pub const TURN_REQUEST: u32 = 46;
    pub const TURN_RESPONSE: u32 = 47;
    pub const TXN_START_REQUEST: u32 = 48;
    pub const TXN_START_RESPONSE: u32 = 49;
    pub const TXN_END_REQUEST: u32 = 50;
    pub const TXN_END_RESPONSE: u32 = 51;
    pub const TXN_ABORTED_NOTICE: u32 = 52;
}

/// Extended-operation OIDs this crate recognises, mapping each to the
/// synthetic request opcode the `opcode` ingress layer assigns it.
pub const EXTENDED_OID_TABLE: &[(&str, u32)] = &[
    ("1.3.6.1.4.1.1466.20037", extended_opcode::START_TLS_REQUEST),
    ("1.3.6.1.4.1.4203.1.11.1", extended_opcode::PASSWD_MODIFY_REQUEST),
    ("1.3.6.1.4.1.4203.1.11.3", extended_opcode::WHOAMI_REQUEST),
    ("1.3.6.1.1.8", extended_opcode::CANCEL_REQUEST),
    ("1.3.6.1.4.1.4203.1.10.2", extended_opcode::START_LBURP_REQUEST),
    ("1.3.6.1.4.1.4203.1.10.3", extended_opcode::LBURP_UPDATE_REQUEST),
    ("1.3.6.1.4.1.4203.1.10.4", extended_opcode::END_LBURP_REQUEST),
    ("1.3.6.1.1.19", extended_opcode::TURN_REQUEST),
    ("1.3.6.1.1.21.1", extended_opcode::TXN_START_REQUEST),
    ("1.3.6.1.1.21.3", extended_opcode::TXN_END_REQUEST),
];

/// Look up the synthetic opcode for a recognised extended-request OID.
pub fn lookup_extended_opcode(oid: &str) -> Option<u32> {
    EXTENDED_OID_TABLE
        .iter()
        .find(|(known, _)| *known == oid)
        .map(|(_, opcode)| *opcode)
}

/// Whether `tag` (an RFC 4511 base opcode, or an unrecognised one) names a
/// request that expects a reply, used to decide whether a policy
/// rejection or decode failure should synthesize an error response or
/// simply drop the message. Unrecognised tags default to "request-like" so
/// an unknown opcode still gets an `unwillingToPerform` reply rather than
/// being silently dropped.
pub fn is_request_tag(tag: ProtocolOpTag) -> bool {
    !matches!(tag.0, 1 | 4 | 5 | 7 | 9 | 11 | 13 | 15 | 19 | 24 | 25)
}

/// Whether a synthetic extended opcode names a request. `TXN_ABORTED_NOTICE`
/// is an unsolicited server notification, not a request, so it is excluded.
pub fn is_request_extended(opcode: u32) -> bool {
    matches!(
        opcode,
        extended_opcode::START_TLS_REQUEST
            | extended_opcode::PASSWD_MODIFY_REQUEST
            | extended_opcode::WHOAMI_REQUEST
            | extended_opcode::CANCEL_REQUEST
            | extended_opcode::START_LBURP_REQUEST
            | extended_opcode::LBURP_UPDATE_REQUEST
            | extended_opcode::END_LBURP_REQUEST
            | extended_opcode::TURN_REQUEST
            | extended_opcode::TXN_START_REQUEST
            | extended_opcode::TXN_END_REQUEST
    )
}

/// Bit position of a base (non-extended) opcode within reject-mask word 0,
/// mirroring the `LILLYGETR_*` constants of the originating C API: bit N is
/// set for `ProtocolOpTag` value N.
pub fn reject_bit(tag: ProtocolOpTag) -> u32 {
    1u32 << tag.0.min(31)
}

/// Bit position of a synthetic extended opcode within reject-mask word 1.
/// Opcode 32 maps to bit 0, opcode 63 to bit 31.
pub fn reject_bit_extended(opcode: u32) -> u32 {
    1u32 << (opcode - 32).min(31)
}
