//! Egress cascade: `operation` → `ldapmessage` → `dercursor`.
//!
//! Mirrors [`super::ingress`] in the opposite direction: a caller (a
//! registry callback, or application code driving the connection directly)
//! hands a [`ProtocolOp`] to [`dispatch_operation`], which runs it through
//! the egress reject mask and control-send hooks before encoding and
//! enqueueing it.

use crate::connection::Connection;
use crate::controls::{Control, PolicyOutcome};
use crate::error::LdapError;
use crate::message;
use crate::ops::{MessageID, ProtocolOp};
use crate::sendqueue::QueuedMessage;

/// Entry point used by [`crate::connection::put_operation`] and the typed
/// `put_<operation>` wrappers below.
pub fn dispatch_operation(
    conn: &mut Connection,
    msg_id: MessageID,
    op: &ProtocolOp<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    operation_layer(conn, msg_id, op, controls)
}

/// Layer 4 (`operation`, egress direction): consult the egress reject mask
/// before anything is encoded.
fn operation_layer(
    conn: &mut Connection,
    msg_id: MessageID,
    op: &ProtocolOp<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    let tag = op.tag();
    if conn.structural().egress_reject.is_rejected(tag) {
        log::debug!("outgoing opcode {} rejected by egress policy", tag.0);
        return Err(LdapError::PolicyRejected);
    }
    opcode_layer(conn, msg_id, op, controls)
}

/// Layer 3 (`opcode`, egress direction): run the control-send hooks, which
/// may replace the outgoing controls list or veto the send outright.
fn opcode_layer(
    conn: &mut Connection,
    msg_id: MessageID,
    op: &ProtocolOp<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    let tag = op.tag();
    let structural = conn.structural().clone();

    let mut effective: Option<Vec<Control<'_>>> = None;
    for hook in [
        structural.controls.send_by_opcode.get(&tag.0),
        structural.controls.send_all.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        let current = effective.as_deref().unwrap_or(controls);
        match hook(current) {
            PolicyOutcome::Accept => {}
            PolicyOutcome::Replace(replacement) => effective = Some(replacement),
            PolicyOutcome::Reject(code) => {
                log::debug!("outgoing opcode {} vetoed by control policy: {code}", tag.0);
                return Err(LdapError::PolicyRejected);
            }
        }
    }

    match effective {
        Some(replacement) => ldapmessage_layer(conn, msg_id, op, &replacement),
        None => ldapmessage_layer(conn, msg_id, op, controls),
    }
}

/// Layer 2 (`ldapmessage`, egress direction): encode the operation and any
/// controls, then wrap both in an LDAPMessage SEQUENCE.
fn ldapmessage_layer(
    conn: &mut Connection,
    msg_id: MessageID,
    op: &ProtocolOp<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    let op_bytes = op.encode();
    let controls_bytes = if controls.is_empty() {
        None
    } else {
        Some(message::encode_controls(controls))
    };
    dercursor_layer(conn, msg_id, op_bytes, controls_bytes)
}

/// Layer 1 (`dercursor`, egress direction): allocate a message-scoped arena,
/// copy the finished LDAPMessage bytes into it, and hand the result to the
/// send queue.
fn dercursor_layer(
    conn: &mut Connection,
    msg_id: MessageID,
    op_bytes: Vec<u8>,
    controls_bytes: Option<Vec<u8>>,
) -> Result<(), LdapError> {
    let arena = crate::arena::Arena::new();
    let queued = QueuedMessage::new(arena, |arena| {
        message::encode(arena, msg_id, &op_bytes, controls_bytes.as_deref())
    });
    conn.enqueue(queued);
    Ok(())
}

/// Typed egress helpers for the operations exercised by this crate's own
/// test scenarios. Applications needing the rest of the catalogue can
/// build a [`ProtocolOp`] directly and call [`dispatch_operation`] (or
/// [`crate::connection::put_operation`]); adding the remaining typed
/// wrappers is purely mechanical once a caller needs one.
pub fn put_bind_request(
    conn: &mut Connection,
    msg_id: MessageID,
    request: crate::ops::bind::BindRequest<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    dispatch_operation(conn, msg_id, &ProtocolOp::BindRequest(request), controls)
}

pub fn put_bind_response(
    conn: &mut Connection,
    msg_id: MessageID,
    response: crate::ops::bind::BindResponse<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    dispatch_operation(conn, msg_id, &ProtocolOp::BindResponse(response), controls)
}

pub fn put_unbind_request(
    conn: &mut Connection,
    msg_id: MessageID,
) -> Result<(), LdapError> {
    dispatch_operation(conn, msg_id, &ProtocolOp::UnbindRequest, &[])
}

pub fn put_search_request(
    conn: &mut Connection,
    msg_id: MessageID,
    request: crate::ops::search::SearchRequest<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    dispatch_operation(conn, msg_id, &ProtocolOp::SearchRequest(request), controls)
}

pub fn put_search_result_entry(
    conn: &mut Connection,
    msg_id: MessageID,
    entry: crate::ops::search::SearchResultEntry<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    dispatch_operation(conn, msg_id, &ProtocolOp::SearchResultEntry(entry), controls)
}

pub fn put_search_result_done(
    conn: &mut Connection,
    msg_id: MessageID,
    result: crate::ops::LdapResult<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    dispatch_operation(conn, msg_id, &ProtocolOp::SearchResultDone(result), controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::ops::result::ResultCode;
    use crate::ops::{LdapDN, LdapResult, LdapString};
    use std::borrow::Cow;

    #[test]
    fn unbind_request_enqueues_a_frame() {
        let mut conn = Connection::for_test();
        put_unbind_request(&mut conn, MessageID(1)).unwrap();
        assert!(conn.can_send());
    }

    #[test]
    fn bind_response_round_trips_through_the_wire() {
        let mut conn = Connection::for_test();
        let response = crate::ops::bind::BindResponse {
            result: LdapResult {
                result_code: ResultCode::Success,
                matched_dn: LdapDN(Cow::Borrowed("")),
                diagnostic_message: LdapString(Cow::Borrowed("")),
            },
            server_sasl_creds: None,
        };
        put_bind_response(&mut conn, MessageID(1), response, &[]).unwrap();
        assert!(conn.can_send());
    }
}
