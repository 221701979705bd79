//! End-to-end scenarios driving a [`Connection`] purely through its public
//! ingress/egress entry points, with no knowledge of the internal cascade.

use asn1_rs::FromBer;
use ldap_endpoint::arena::Arena;
use ldap_endpoint::connection::Connection;
use ldap_endpoint::filter::{Attribute, AttributeValue, Filter, PartialAttribute};
use ldap_endpoint::message;
use ldap_endpoint::ops::add::AddRequest;
use ldap_endpoint::ops::bind::{AuthenticationChoice, BindRequest, BindResponse};
use ldap_endpoint::ops::extended::ExtendedResponse;
use ldap_endpoint::ops::modify::{Change, ModifyRequest};
use ldap_endpoint::ops::result::ResultCode;
use ldap_endpoint::ops::search::{SearchRequest, SearchResultEntry};
use ldap_endpoint::ops::{
    DerefAliases, LdapDN, LdapResult, LdapString, MessageID, ModifyOperation, ProtocolOp, SearchScope,
};
use ldap_endpoint::registry::OpRegistry;
use ldap_endpoint::structural::Structural;
use ldap_endpoint::{ByteSink, ByteSource, LdapError};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// An in-memory byte channel that can be made to dole out `chunk` bytes at
/// a time, to exercise partial-I/O resumption.
struct TestChannel {
    inbound: VecDeque<u8>,
    chunk: usize,
}

impl TestChannel {
    fn new(bytes: Vec<u8>, chunk: usize) -> Self {
        TestChannel {
            inbound: bytes.into_iter().collect(),
            chunk,
        }
    }
}

impl ByteSource for TestChannel {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, LdapError> {
        let n = buf.len().min(self.inbound.len()).min(self.chunk);
        for slot in buf.iter_mut().take(n) {
            *slot = self.inbound.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl ByteSink for TestChannel {
    fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError> {
        Ok(buf.len())
    }
}

fn frame(op: &ProtocolOp<'_>, msg_id: MessageID) -> Vec<u8> {
    let arena = Arena::new();
    message::encode(&arena, msg_id, &op.encode(), None).to_vec()
}

/// Sink that copies everything written to it into a shared buffer the test
/// can inspect after the `Connection` that owns it has run, since
/// `Connection` takes its sink by value and exposes no accessor back to it.
#[derive(Clone)]
struct CapturingSink(Arc<Mutex<Vec<u8>>>);

impl CapturingSink {
    fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (CapturingSink(buf.clone()), buf)
    }
}

impl ByteSink for CapturingSink {
    fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Scenario 1: BindRequest v3 simple.
#[test]
fn bind_request_v3_simple() {
    let seen: Arc<Mutex<Vec<(u8, String, Option<Vec<u8>>)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();

    let registry = OpRegistry::empty().bind_request(Box::new(move |_conn, _msg_id, op, _controls| {
        let ProtocolOp::BindRequest(br) = op else { unreachable!() };
        let simple = match &br.authentication {
            AuthenticationChoice::Simple(v) => Some(v.to_vec()),
            _ => None,
        };
        seen_cb.lock().unwrap().push((br.version, br.name.0.to_string(), simple));
        Ok(())
    }));
    let structural = Structural::builder().registry(registry).build();

    let req = BindRequest {
        version: 3,
        name: LdapDN(Cow::Borrowed("cn=admin")),
        authentication: AuthenticationChoice::Simple(Cow::Borrowed(b"secret")),
    };
    let bytes = frame(&ProtocolOp::BindRequest(req), MessageID(1));

    let chan = TestChannel::new(bytes, usize::MAX);
    let mut conn = Connection::new(structural, chan, TestChannel::new(Vec::new(), 0));
    conn.ingress_event().unwrap();

    let captured = seen.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].0, 3);
    assert_eq!(captured[0].1, "cn=admin");
    assert_eq!(captured[0].2.as_deref(), Some(&b"secret"[..]));
}

/// Scenario 2: SearchRequest over a whole subtree with a Present filter.
#[test]
fn search_request_subtree() {
    let seen: Arc<Mutex<Vec<(SearchScope, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();

    let registry = OpRegistry::empty().search_request(Box::new(move |_conn, _msg_id, op, _controls| {
        let ProtocolOp::SearchRequest(sr) = op else { unreachable!() };
        seen_cb.lock().unwrap().push((sr.scope, sr.attributes.len()));
        Ok(())
    }));
    let structural = Structural::builder().registry(registry).build();

    let req = SearchRequest {
        base_object: LdapDN(Cow::Borrowed("dc=example,dc=com")),
        scope: SearchScope::WholeSubtree,
        deref_aliases: DerefAliases::NeverDerefAliases,
        size_limit: 0,
        time_limit: 0,
        types_only: false,
        filter: Filter::Present(LdapString(Cow::Borrowed("objectClass"))),
        attributes: vec![LdapString(Cow::Borrowed("cn")), LdapString(Cow::Borrowed("sn"))],
    };
    let bytes = frame(&ProtocolOp::SearchRequest(req), MessageID(2));

    let chan = TestChannel::new(bytes, usize::MAX);
    let mut conn = Connection::new(structural, chan, TestChannel::new(Vec::new(), 0));
    conn.ingress_event().unwrap();

    let captured = seen.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].0, SearchScope::WholeSubtree);
    assert_eq!(captured[0].1, 2);
}

/// Scenario 3: SearchResultEntry carrying two attributes, three values total.
#[test]
fn search_result_entry_two_attributes() {
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = seen.clone();

    let registry = OpRegistry::empty().search_result_entry(Box::new(move |_conn, _msg_id, op, _controls| {
        let ProtocolOp::SearchResultEntry(sre) = op else { unreachable!() };
        let total: usize = sre.attributes.iter().map(|a| a.attr_vals.len()).sum();
        seen_cb.lock().unwrap().push(total);
        Ok(())
    }));
    let structural = Structural::builder().registry(registry).build();

    let entry = SearchResultEntry {
        object_name: LdapDN(Cow::Borrowed("uid=alice,dc=example,dc=com")),
        attributes: vec![
            PartialAttribute {
                attr_type: LdapString(Cow::Borrowed("mail")),
                attr_vals: vec![
                    AttributeValue(Cow::Borrowed(b"a@x")),
                    AttributeValue(Cow::Borrowed(b"b@y")),
                ],
            },
            PartialAttribute {
                attr_type: LdapString(Cow::Borrowed("cn")),
                attr_vals: vec![AttributeValue(Cow::Borrowed(b"Alice"))],
            },
        ],
    };
    let bytes = frame(&ProtocolOp::SearchResultEntry(entry), MessageID(3));

    let chan = TestChannel::new(bytes, usize::MAX);
    let mut conn = Connection::new(structural, chan, TestChannel::new(Vec::new(), 0));
    conn.ingress_event().unwrap();

    let captured = seen.lock().unwrap();
    assert_eq!(captured.as_slice(), &[3]);
}

/// Scenario 4: an empty-body UnbindRequest.
#[test]
fn unbind_request_empty_body() {
    let seen: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
    let seen_cb = seen.clone();

    let registry = OpRegistry::empty().unbind_request(Box::new(move |_conn, _msg_id, op, _controls| {
        assert!(matches!(op, ProtocolOp::UnbindRequest));
        *seen_cb.lock().unwrap() += 1;
        Ok(())
    }));
    let structural = Structural::builder().registry(registry).build();

    let bytes = frame(&ProtocolOp::UnbindRequest, MessageID(4));
    let chan = TestChannel::new(bytes, usize::MAX);
    let mut conn = Connection::new(structural, chan, TestChannel::new(Vec::new(), 0));
    conn.ingress_event().unwrap();

    assert_eq!(*seen.lock().unwrap(), 1);
}

/// Scenario 5: the same SearchRequest as scenario 2, fed one byte at a
/// time, still produces exactly one callback invocation.
#[test]
fn chunked_delivery_produces_one_callback() {
    let seen: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
    let seen_cb = seen.clone();

    let registry = OpRegistry::empty().search_request(Box::new(move |_conn, _msg_id, _op, _controls| {
        *seen_cb.lock().unwrap() += 1;
        Ok(())
    }));
    let structural = Structural::builder().registry(registry).build();

    let req = SearchRequest {
        base_object: LdapDN(Cow::Borrowed("dc=example,dc=com")),
        scope: SearchScope::WholeSubtree,
        deref_aliases: DerefAliases::NeverDerefAliases,
        size_limit: 0,
        time_limit: 0,
        types_only: false,
        filter: Filter::Present(LdapString(Cow::Borrowed("objectClass"))),
        attributes: vec![LdapString(Cow::Borrowed("cn")), LdapString(Cow::Borrowed("sn"))],
    };
    let bytes = frame(&ProtocolOp::SearchRequest(req), MessageID(5));

    let chan = TestChannel::new(bytes, 1);
    let mut conn = Connection::new(structural, chan, TestChannel::new(Vec::new(), 0));
    for _ in 0..64 {
        conn.ingress_event().unwrap();
        if *seen.lock().unwrap() == 1 {
            break;
        }
    }

    assert_eq!(*seen.lock().unwrap(), 1);
}

/// Scenario 6: an unrecognised protocolOp tag synthesizes
/// `unwillingToPerform`, echoing the original messageID, and leaves the
/// connection open. Tag 17 (`0x40 | 17 = 0x51`) is not one of this crate's
/// recognised application numbers (0-16, 19, 23-25), so it genuinely falls
/// through `decode_and_dispatch`'s default arm rather than being mistaken
/// for a real, if empty, operation.
#[test]
fn unknown_opcode_synthesizes_unwilling_to_perform() {
    let structural = Structural::builder().build();

    // SEQUENCE { INTEGER 6, [APPLICATION 17] (empty, primitive) }
    let bytes: Vec<u8> = vec![0x30, 0x05, 0x02, 0x01, 0x06, 0x40 | 17u8, 0x00];

    let chan = TestChannel::new(bytes, usize::MAX);
    let (sink, captured) = CapturingSink::new();
    let mut conn = Connection::new(structural, chan, sink);
    conn.ingress_event().unwrap();
    conn.egress_event().unwrap();

    assert_eq!(conn.state, ldap_endpoint::connection::ConnectionState::Open);

    let out = captured.lock().unwrap();
    let msg = message::decode(&out).unwrap();
    assert_eq!(msg.message_id.0, 6);
    assert_eq!(msg.op_tag, 24); // no typed reply for tag 17, falls back to ExtendedResponse
    let (_, response) = ExtendedResponse::from_ber(msg.op_bytes).unwrap();
    assert_eq!(response.result.result_code, ResultCode::UnwillingToPerform);
}

/// Passthrough identity (spec scenario 1's echo case): a callback that
/// hands the decoded operation straight back to `put_operation` must
/// produce, byte for byte, the same LDAPMessage that came in.
#[test]
fn bind_request_passthrough_is_byte_identical() {
    let registry = OpRegistry::empty().bind_request(Box::new(|conn, msg_id, op, controls| {
        ldap_endpoint::connection::put_operation(conn, msg_id, op, controls)
    }));
    let structural = Structural::builder().registry(registry).build();

    let req = BindRequest {
        version: 3,
        name: LdapDN(Cow::Borrowed("cn=admin")),
        authentication: AuthenticationChoice::Simple(Cow::Borrowed(b"secret")),
    };
    let bytes = frame(&ProtocolOp::BindRequest(req), MessageID(7));

    let chan = TestChannel::new(bytes.clone(), usize::MAX);
    let (sink, captured) = CapturingSink::new();
    let mut conn = Connection::new(structural, chan, sink);
    conn.ingress_event().unwrap();
    conn.egress_event().unwrap();

    assert_eq!(captured.lock().unwrap().as_slice(), bytes.as_slice());
}

/// Passthrough identity (spec scenario 4's echo case), over the
/// zero-length UnbindRequest body.
#[test]
fn unbind_request_passthrough_is_byte_identical() {
    let registry = OpRegistry::empty().unbind_request(Box::new(|conn, msg_id, op, controls| {
        ldap_endpoint::connection::put_operation(conn, msg_id, op, controls)
    }));
    let structural = Structural::builder().registry(registry).build();

    let bytes = frame(&ProtocolOp::UnbindRequest, MessageID(8));

    let chan = TestChannel::new(bytes.clone(), usize::MAX);
    let (sink, captured) = CapturingSink::new();
    let mut conn = Connection::new(structural, chan, sink);
    conn.ingress_event().unwrap();
    conn.egress_event().unwrap();

    assert_eq!(captured.lock().unwrap().as_slice(), bytes.as_slice());
}

/// Opcode round-trip: `encode(decode(wire(O))) == wire(O)` for a
/// representative slice of the operation catalogue, covering a CHOICE
/// field (authentication), an IMPLICIT-tagged request (Delete), a request
/// built of nested attribute lists (Add, Modify), and the
/// `COMPONENTS OF LDAPResult`-only response shape (BindResponse).
#[test]
fn bind_request_round_trips_through_the_wire_codec() {
    let req = BindRequest {
        version: 3,
        name: LdapDN(Cow::Borrowed("cn=admin,dc=example,dc=com")),
        authentication: AuthenticationChoice::Simple(Cow::Borrowed(b"hunter2")),
    };
    let wire = req.encode();
    let (_, decoded) = BindRequest::from_ber(&wire).unwrap();
    assert_eq!(decoded.encode(), wire);
}

#[test]
fn bind_response_round_trips_through_the_wire_codec() {
    let resp = BindResponse {
        result: LdapResult {
            result_code: ResultCode::Success,
            matched_dn: LdapDN(Cow::Borrowed("cn=admin,dc=example,dc=com")),
            diagnostic_message: LdapString(Cow::Borrowed("")),
        },
        server_sasl_creds: None,
    };
    let wire = resp.encode();
    let (_, decoded) = BindResponse::from_ber(&wire).unwrap();
    assert_eq!(decoded.encode(), wire);
}

#[test]
fn search_request_round_trips_through_the_wire_codec() {
    let req = SearchRequest {
        base_object: LdapDN(Cow::Borrowed("dc=example,dc=com")),
        scope: SearchScope::WholeSubtree,
        deref_aliases: DerefAliases::NeverDerefAliases,
        size_limit: 10,
        time_limit: 30,
        types_only: false,
        filter: Filter::Present(LdapString(Cow::Borrowed("objectClass"))),
        attributes: vec![LdapString(Cow::Borrowed("cn"))],
    };
    let wire = req.encode();
    let (_, decoded) = SearchRequest::from_ber(&wire).unwrap();
    assert_eq!(decoded.encode(), wire);
}

#[test]
fn search_result_entry_round_trips_through_the_wire_codec() {
    let entry = SearchResultEntry {
        object_name: LdapDN(Cow::Borrowed("uid=alice,dc=example,dc=com")),
        attributes: vec![PartialAttribute {
            attr_type: LdapString(Cow::Borrowed("cn")),
            attr_vals: vec![AttributeValue(Cow::Borrowed(b"Alice"))],
        }],
    };
    let wire = entry.encode();
    let (_, decoded) = SearchResultEntry::from_ber(&wire).unwrap();
    assert_eq!(decoded.encode(), wire);
}

#[test]
fn add_request_round_trips_through_the_wire_codec() {
    let req = AddRequest {
        entry: LdapDN(Cow::Borrowed("uid=bob,dc=example,dc=com")),
        attributes: vec![Attribute {
            attr_type: LdapString(Cow::Borrowed("objectClass")),
            attr_vals: vec![AttributeValue(Cow::Borrowed(b"inetOrgPerson"))],
        }],
    };
    let wire = req.encode();
    let (_, decoded) = AddRequest::from_ber(&wire).unwrap();
    assert_eq!(decoded.encode(), wire);
}

#[test]
fn modify_request_round_trips_through_the_wire_codec() {
    let req = ModifyRequest {
        object: LdapDN(Cow::Borrowed("uid=bob,dc=example,dc=com")),
        changes: vec![Change {
            operation: ModifyOperation::Replace,
            modification: PartialAttribute {
                attr_type: LdapString(Cow::Borrowed("mail")),
                attr_vals: vec![AttributeValue(Cow::Borrowed(b"bob@example.com"))],
            },
        }],
    };
    let wire = req.encode();
    let (_, decoded) = ModifyRequest::from_ber(&wire).unwrap();
    assert_eq!(decoded.encode(), wire);
}

#[test]
fn del_request_round_trips_through_the_wire_codec() {
    let dn = LdapDN(Cow::Borrowed("uid=bob,dc=example,dc=com"));
    let wire = ProtocolOp::DelRequest(dn).encode();
    let (_, decoded) = ldap_endpoint::ops::add::parse_del_request(&wire).unwrap();
    assert_eq!(ProtocolOp::DelRequest(decoded).encode(), wire);
}

#[test]
fn unbind_request_round_trips_through_the_wire_codec() {
    let wire = ProtocolOp::UnbindRequest.encode();
    assert_eq!(wire, vec![0x42, 0x00]);
    assert_eq!(ProtocolOp::UnbindRequest.encode(), wire);
}
