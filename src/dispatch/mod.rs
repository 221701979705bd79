//! The bidirectional six-layer dispatch pipeline: `dercursor` ↔
//! `ldapmessage` ↔ `opcode` ↔ `operation`, ingress and egress.
//!
//! Each layer is described in full in [`ingress`] and [`egress`]; this
//! module only re-exports them and the opcode-classification helpers they
//! share.

pub mod egress;
pub mod ingress;
