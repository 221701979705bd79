//! Ingress cascade: `dercursor` → `ldapmessage` → `opcode` → `operation`.
//!
//! Each function below is the *default* behaviour of one layer; `Structural`
//! handler-override slots exist for applications that want to replace a
//! layer, but nothing in this crate's own operation catalogue needs to, so
//! the cascade is expressed directly rather than through indirection that
//! would never be exercised.

use asn1_rs::FromBer;

use crate::connection::Connection;
use crate::controls::{Control, PolicyOutcome};
use crate::error::LdapError;
use crate::frame::CompletedFrame;
use crate::message::{self, RawMessage};
use crate::opcode;
use crate::ops::result::LdapResult;
use crate::ops::{self, MessageID, ProtocolOp, ProtocolOpTag, ResultCode};

fn parsed<'a, T>(
    result: asn1_rs::ParseResult<'a, T, LdapError>,
) -> Result<T, LdapError> {
    result.map(|(_, v)| v).map_err(LdapError::from)
}

/// Layer 1 (`dercursor`): split the frame into `(messageID, protocolOp
/// bytes, controls)`. A frame that fails even this far is dropped with a
/// log line, since there is no messageID to echo back.
pub fn dispatch_frame(
    conn: &mut Connection,
    frame: &CompletedFrame,
) -> Result<(), LdapError> {
    match message::decode(frame.bytes()) {
        Ok(raw) => ldapmessage_layer(conn, raw),
        Err(e) => {
            log::warn!("dropping malformed LDAPMessage: {e}");
            Ok(())
        }
    }
}

/// Layer 2 (`ldapmessage`): derive the opcode from the application tag and
/// consult the ingress reject mask.
fn ldapmessage_layer(
    conn: &mut Connection,
    mut raw: RawMessage<'_>,
) -> Result<(), LdapError> {
    let tag = ProtocolOpTag(raw.op_tag);
    log::trace!("ldapmessage: msgid={} opcode={}", raw.message_id.0, tag.0);
    if conn.structural().ingress_reject.is_rejected(tag) {
        log::debug!("opcode {} rejected by ingress policy", tag.0);
        reject(conn, raw.message_id, tag.0, ResultCode::UnwillingToPerform);
        return Ok(());
    }

    let structural = conn.structural().clone();
    for hook in [
        structural.controls.recv_by_opcode.get(&tag.0),
        structural.controls.recv_all.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        match hook(&raw.controls) {
            PolicyOutcome::Accept => {}
            PolicyOutcome::Replace(replacement) => raw.controls = replacement,
            PolicyOutcome::Reject(code) => {
                log::debug!("opcode {} vetoed by control policy: {code}", tag.0);
                reject(conn, raw.message_id, tag.0, code);
                return Ok(());
            }
        }
    }

    opcode_layer(conn, raw, tag)
}

/// Layer 3 (`opcode`): for `ExtendedRequest`, peel the OID and map it to a
/// synthetic opcode for reject-mask purposes; every other tag passes
/// straight through to decoding.
fn opcode_layer(
    conn: &mut Connection,
    raw: RawMessage<'_>,
    tag: ProtocolOpTag,
) -> Result<(), LdapError> {
    if tag == ProtocolOpTag::ExtendedRequest {
        return match parsed(ops::extended::ExtendedRequest::from_ber(raw.op_bytes)) {
            Ok(request) => {
                if let Some(synthetic) = opcode::lookup_extended_opcode(&request.request_name.0) {
                    log::trace!("opcode: ExtendedRequest resolved to synthetic opcode {synthetic}");
                    if conn.structural().ingress_reject.is_rejected_extended(synthetic) {
                        log::debug!("extended opcode {synthetic} rejected by ingress policy");
                        reject(conn, raw.message_id, tag.0, ResultCode::UnwillingToPerform);
                        return Ok(());
                    }
                }
                operation_layer(conn, raw.message_id, tag, ProtocolOp::ExtendedRequest(request), &raw.controls)
            }
            Err(e) => {
                log::warn!("failed to decode ExtendedRequest: {e}");
                reject(conn, raw.message_id, tag.0, ResultCode::ProtocolError);
                Ok(())
            }
        };
    }
    decode_and_dispatch(conn, raw, tag)
}

/// Decode the operation body for every other recognised tag, then hand off
/// to the `operation` layer. A decode failure synthesizes a `protocolError`
/// response for requests; an unrecognised tag synthesizes
/// `unwillingToPerform`.
fn decode_and_dispatch(
    conn: &mut Connection,
    raw: RawMessage<'_>,
    tag: ProtocolOpTag,
) -> Result<(), LdapError> {
    let msg_id = raw.message_id;
    let controls = raw.controls;
    let decoded: Result<ProtocolOp<'_>, LdapError> = match tag.0 {
        0 => parsed(ops::bind::BindRequest::from_ber(raw.op_bytes)).map(ProtocolOp::BindRequest),
        1 => parsed(ops::bind::BindResponse::from_ber(raw.op_bytes)).map(ProtocolOp::BindResponse),
        2 => Ok(ProtocolOp::UnbindRequest),
        3 => parsed(ops::search::SearchRequest::from_ber(raw.op_bytes)).map(ProtocolOp::SearchRequest),
        4 => parsed(ops::search::SearchResultEntry::from_ber(raw.op_bytes)).map(ProtocolOp::SearchResultEntry),
        5 => parsed(ops::search::parse_search_result_done(raw.op_bytes)).map(ProtocolOp::SearchResultDone),
        6 => parsed(ops::modify::ModifyRequest::from_ber(raw.op_bytes)).map(ProtocolOp::ModifyRequest),
        7 => parsed(ops::modify::parse_modify_response(raw.op_bytes)).map(ProtocolOp::ModifyResponse),
        8 => parsed(ops::add::AddRequest::from_ber(raw.op_bytes)).map(ProtocolOp::AddRequest),
        9 => parsed(ops::add::parse_add_response(raw.op_bytes)).map(ProtocolOp::AddResponse),
        10 => parsed(ops::add::parse_del_request(raw.op_bytes)).map(ProtocolOp::DelRequest),
        11 => parsed(ops::add::parse_del_response(raw.op_bytes)).map(ProtocolOp::DelResponse),
        12 => parsed(ops::add::ModDnRequest::from_ber(raw.op_bytes)).map(ProtocolOp::ModDnRequest),
        13 => parsed(ops::add::parse_moddn_response(raw.op_bytes)).map(ProtocolOp::ModDnResponse),
        14 => parsed(ops::compare::CompareRequest::from_ber(raw.op_bytes)).map(ProtocolOp::CompareRequest),
        15 => parsed(ops::compare::parse_compare_response(raw.op_bytes)).map(ProtocolOp::CompareResponse),
        16 => decode_abandon_request(raw.op_bytes).map(ProtocolOp::AbandonRequest),
        19 => parsed(ops::search::parse_search_result_reference(raw.op_bytes))
            .map(ProtocolOp::SearchResultReference),
        24 => parsed(ops::extended::ExtendedResponse::from_ber(raw.op_bytes)).map(ProtocolOp::ExtendedResponse),
        25 => parsed(ops::extended::IntermediateResponse::from_ber(raw.op_bytes))
            .map(ProtocolOp::IntermediateResponse),
        _ => Err(LdapError::NotImplemented),
    };

    match decoded {
        Ok(op) => operation_layer(conn, msg_id, tag, op, &controls),
        Err(LdapError::NotImplemented) => {
            log::debug!("opcode {} has no known decode, treating as not implemented", tag.0);
            reject(conn, msg_id, tag.0, ResultCode::UnwillingToPerform);
            Ok(())
        }
        Err(e) => {
            log::warn!("failed to decode opcode {}: {e}", tag.0);
            reject(conn, msg_id, tag.0, ResultCode::ProtocolError);
            Ok(())
        }
    }
}

/// `AbandonRequest ::= [APPLICATION 16] MessageID` — an IMPLICIT tag over
/// INTEGER, so the bytes past the header are the raw big-endian value, not
/// a nested `INTEGER` TLV.
fn decode_abandon_request(bytes: &[u8]) -> Result<MessageID, LdapError> {
    let peek = crate::der::peek_tlv(bytes)?.ok_or_else(|| LdapError::Decode("AbandonRequest truncated".into()))?;
    let content = &bytes[peek.header_len..peek.header_len + peek.value_len];
    let value = content.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
    Ok(MessageID(value))
}

/// Layer 4 (`operation`): look the opcode up in the registry and invoke its
/// callback, or synthesize `unwillingToPerform` if unbound.
fn operation_layer(
    conn: &mut Connection,
    msg_id: MessageID,
    tag: ProtocolOpTag,
    op: ProtocolOp<'_>,
    controls: &[Control<'_>],
) -> Result<(), LdapError> {
    let structural = conn.structural().clone();
    match structural.registry.dispatch(tag, conn, msg_id, &op, controls) {
        Ok(()) => Ok(()),
        Err(LdapError::NotImplemented) => {
            log::debug!("no registry callback bound for opcode {}", tag.0);
            reject(conn, msg_id, tag.0, ResultCode::UnwillingToPerform);
            Ok(())
        }
        Err(e) => {
            log::warn!("callback for opcode {} failed: {e}", tag.0);
            reject(conn, msg_id, tag.0, ResultCode::OperationsError);
            Ok(())
        }
    }
}

/// Synthesize and enqueue an error response for `request_tag`'s reply
/// opcode, echoing `msg_id`. Silently does nothing for tags with no reply
/// (UnbindRequest, AbandonRequest) or that are themselves responses.
fn reject(
    conn: &mut Connection,
    msg_id: MessageID,
    request_tag: u32,
    result_code: ResultCode,
) {
    if !opcode::is_request_tag(ProtocolOpTag(request_tag)) {
        return;
    }
    let response_tag = response_tag_for(request_tag);
    let Some(response_tag) = response_tag else {
        return;
    };
    let result = LdapResult::with_code(result_code);
    let bytes = result.encode(response_tag);
    let arena = crate::arena::Arena::new();
    let queued = crate::sendqueue::QueuedMessage::new(arena, |arena| {
        crate::message::encode(arena, msg_id, &bytes, None)
    });
    conn.enqueue(queued);
}

/// Map a request opcode to its reply's application tag. Falls back to
/// `ExtendedResponse` (24) for any request this crate doesn't otherwise
/// recognise, since every response in the catalogue carries nothing but
/// `COMPONENTS OF LDAPResult` and an `ExtendedResponse` is a legal generic
/// carrier for one (RFC 4511 §4.12); unrecognised opcodes have no better
/// home to send an error back through.
fn response_tag_for(request_tag: u32) -> Option<u8> {
    match request_tag {
        0 => Some(1),
        2 | 16 => None,
        3 => Some(5),
        6 => Some(7),
        8 => Some(9),
        10 => Some(11),
        12 => Some(13),
        14 => Some(15),
        23 => Some(24),
        _ => Some(24),
    }
}
