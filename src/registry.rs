//! The opcode-indexed table of operation callbacks.
//!
//! `OpRegistry` keeps two aligned views on the same data, mirroring the
//! original library's `union LillyOpRegistry { by_opcode; by_name }`: a
//! named field per operation for ergonomic registration
//! (`registry.bind_request = Some(handler)`), and [`OpRegistry::dispatch`]
//! which maps a numeric opcode straight to that field. Rust has no portable
//! union-of-function-pointers, so the two views are kept in sync by
//! construction (the `define_registry!` table below) rather than by
//! overlaying storage.

use crate::connection::Connection;
use crate::controls::Control;
use crate::error::LdapError;
use crate::ops::{MessageID, ProtocolOp, ProtocolOpTag};

/// A registered handler: given the connection, the message ID, the decoded
/// operation and its controls, perform whatever side effect the application
/// wants (typically queueing a response via `Connection::put_operation`).
pub type Callback = Box<
    dyn for<'msg> Fn(&mut Connection, MessageID, &ProtocolOp<'msg>, &[Control<'msg>]) -> Result<(), LdapError>
        + Send
        + Sync,
>;

macro_rules! define_registry {
    ( $( $field:ident => $opcode:expr ),* $(,)? ) => {
        /// One callback slot per recognised RFC 4511 operation. Unbound
        /// (`None`) slots make [`OpRegistry::dispatch`] return
        /// [`LdapError::NotImplemented`].
        #[derive(Default)]
        pub struct OpRegistry {
            $( pub $field: Option<Callback>, )*
        }

        impl OpRegistry {
            pub fn empty() -> Self {
                Self::default()
            }

            $(
                pub fn $field(mut self, cb: Callback) -> Self {
                    self.$field = Some(cb);
                    self
                }
            )*

            /// Look up the callback bound to `opcode`, regardless of which
            /// named field it lives in. Used by the `operation` dispatch
            /// layer so it doesn't need its own copy of the opcode table.
            pub fn dispatch(
                &self,
                opcode: ProtocolOpTag,
                conn: &mut Connection,
                msg_id: MessageID,
                op: &ProtocolOp<'_>,
                controls: &[Control<'_>],
            ) -> Result<(), LdapError> {
                let slot = match opcode.0 {
                    $( $opcode => &self.$field, )*
                    _ => return Err(LdapError::NotImplemented),
                };
                match slot {
                    Some(cb) => cb(conn, msg_id, op, controls),
                    None => Err(LdapError::NotImplemented),
                }
            }

            /// `(field name, opcode, bound?)` for every slot, used by tests
            /// and diagnostics to check a registry's coverage at a glance.
            pub fn coverage(&self) -> Vec<(&'static str, u32, bool)> {
                vec![
                    $( (stringify!($field), $opcode, self.$field.is_some()), )*
                ]
            }
        }
    };
}

define_registry! {
    bind_request => 0,
    bind_response => 1,
    unbind_request => 2,
    search_request => 3,
    search_result_entry => 4,
    search_result_done => 5,
    modify_request => 6,
    modify_response => 7,
    add_request => 8,
    add_response => 9,
    del_request => 10,
    del_response => 11,
    moddn_request => 12,
    moddn_response => 13,
    compare_request => 14,
    compare_response => 15,
    abandon_request => 16,
    search_result_reference => 19,
    extended_request => 23,
    extended_response => 24,
    intermediate_response => 25,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_slot_dispatches_not_implemented() {
        let registry = OpRegistry::empty();
        let mut conn = Connection::for_test();
        let op = ProtocolOp::UnbindRequest;
        let err = registry
            .dispatch(ProtocolOpTag::UnbindRequest, &mut conn, MessageID(1), &op, &[])
            .unwrap_err();
        assert!(matches!(err, LdapError::NotImplemented));
    }

    #[test]
    fn unknown_opcode_is_not_implemented() {
        let registry = OpRegistry::empty();
        let mut conn = Connection::for_test();
        let op = ProtocolOp::UnbindRequest;
        let err = registry
            .dispatch(ProtocolOpTag(200), &mut conn, MessageID(1), &op, &[])
            .unwrap_err();
        assert!(matches!(err, LdapError::NotImplemented));
    }
}
