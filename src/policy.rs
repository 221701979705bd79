//! Reject-mask policy: two bitwords deciding, per opcode, whether an
//! incoming or outgoing operation is even handed to the registry.
//!
//! Mirrors the originating library's `lillyget_reject`/`lillyget_reject0`
//! pair of 32-bit masks: word 0 covers RFC 4511 base opcodes (bit N for
//! opcode N, see [`crate::opcode::reject_bit`]), word 1 covers the synthetic
//! extended-operation opcodes assigned from 32 upward (see
//! [`crate::opcode::reject_bit_extended`]).

use crate::opcode::{reject_bit, reject_bit_extended};
use crate::ops::ProtocolOpTag;

/// Two 32-bit masks of opcodes to refuse outright, checked before an
/// operation ever reaches its registry callback. A connection holds one of
/// these per direction (ingress `get`, egress `put`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RejectMask {
    base: u32,
    extended: u32,
}

impl RejectMask {
    pub fn new() -> Self {
        RejectMask::default()
    }

    /// Add `tag` (an RFC 4511 base opcode) to the reject set.
    pub fn reject(&mut self, tag: ProtocolOpTag) -> &mut Self {
        self.base |= reject_bit(tag);
        self
    }

    /// Add a synthetic extended-operation opcode to the reject set.
    pub fn reject_extended(&mut self, opcode: u32) -> &mut Self {
        self.extended |= reject_bit_extended(opcode);
        self
    }

    pub fn allow(&mut self, tag: ProtocolOpTag) -> &mut Self {
        self.base &= !reject_bit(tag);
        self
    }

    pub fn allow_extended(&mut self, opcode: u32) -> &mut Self {
        self.extended &= !reject_bit_extended(opcode);
        self
    }

    pub fn is_rejected(&self, tag: ProtocolOpTag) -> bool {
        self.base & reject_bit(tag) != 0
    }

    pub fn is_rejected_extended(&self, opcode: u32) -> bool {
        self.extended & reject_bit_extended(opcode) != 0
    }

    /// Reject everything: used to build an allow-list by starting closed
    /// and calling [`RejectMask::allow`] for each permitted opcode.
    pub fn reject_all() -> Self {
        RejectMask {
            base: u32::MAX,
            extended: u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_mask_rejects_nothing() {
        let mask = RejectMask::new();
        assert!(!mask.is_rejected(ProtocolOpTag::BindRequest));
        assert!(!mask.is_rejected_extended(34));
    }

    #[test]
    fn reject_then_allow_round_trips() {
        let mut mask = RejectMask::new();
        mask.reject(ProtocolOpTag::DelRequest);
        assert!(mask.is_rejected(ProtocolOpTag::DelRequest));
        assert!(!mask.is_rejected(ProtocolOpTag::BindRequest));
        mask.allow(ProtocolOpTag::DelRequest);
        assert!(!mask.is_rejected(ProtocolOpTag::DelRequest));
    }

    #[test]
    fn reject_all_then_allow_builds_an_allow_list() {
        let mut mask = RejectMask::reject_all();
        assert!(mask.is_rejected(ProtocolOpTag::BindRequest));
        mask.allow(ProtocolOpTag::BindRequest);
        assert!(!mask.is_rejected(ProtocolOpTag::BindRequest));
        assert!(mask.is_rejected(ProtocolOpTag::SearchRequest));
    }

    #[test]
    fn extended_opcodes_use_the_second_word() {
        let mut mask = RejectMask::new();
        mask.reject_extended(34); // PASSWD_MODIFY_REQUEST
        assert!(mask.is_rejected_extended(34));
        assert!(!mask.is_rejected_extended(36)); // WHOAMI_REQUEST
    }
}
