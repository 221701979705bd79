//! Pass an LDAPMessage frame through the ingress cascade, print what was
//! decoded at each operation, and echo a canned response back out.
//!
//! Reads one or more complete BER frames concatenated on stdin and writes
//! whatever the bound callbacks enqueue to stdout, so it can be driven as
//! `printf '...' | cargo run --example passthrough`.

use ldap_endpoint::connection::Connection;
use ldap_endpoint::controls::Control;
use ldap_endpoint::ops::{LdapDN, LdapResult, LdapString, ProtocolOp, ResultCode};
use ldap_endpoint::registry::OpRegistry;
use ldap_endpoint::structural::Structural;
use ldap_endpoint::{ByteSink, ByteSource, LdapError};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::Arc;

fn print_bind_request(conn: &mut Connection, msg_id: ldap_endpoint::MessageID, op: &ProtocolOp<'_>, _controls: &[Control<'_>]) -> Result<(), LdapError> {
    let ProtocolOp::BindRequest(br) = op else { unreachable!() };
    println!("Got BindRequest");
    println!(" - version {}", br.version);
    println!(" - name \"{}\"", br.name.0);
    let response = ldap_endpoint::ops::bind::BindResponse {
        result: LdapResult {
            result_code: ResultCode::Success,
            matched_dn: LdapDN(br.name.0.clone()),
            diagnostic_message: LdapString(std::borrow::Cow::Borrowed("")),
        },
        server_sasl_creds: None,
    };
    ldap_endpoint::dispatch::egress::put_bind_response(conn, msg_id, response, &[])
}

fn print_unbind_request(_conn: &mut Connection, _msg_id: ldap_endpoint::MessageID, _op: &ProtocolOp<'_>, _controls: &[Control<'_>]) -> Result<(), LdapError> {
    println!("Got UnbindRequest");
    Ok(())
}

fn print_search_request(conn: &mut Connection, msg_id: ldap_endpoint::MessageID, op: &ProtocolOp<'_>, _controls: &[Control<'_>]) -> Result<(), LdapError> {
    let ProtocolOp::SearchRequest(sr) = op else { unreachable!() };
    println!("Got SearchRequest");
    println!(" - baseObject \"{}\"", sr.base_object.0);
    println!(" - scope {:?}", sr.scope);
    println!(" - derefAliases {:?}", sr.deref_aliases);
    for attr in &sr.attributes {
        println!(" - attribute \"{}\"", attr.0);
    }
    let result = LdapResult {
        result_code: ResultCode::Success,
        matched_dn: LdapDN(std::borrow::Cow::Borrowed("")),
        diagnostic_message: LdapString(std::borrow::Cow::Borrowed("")),
    };
    ldap_endpoint::dispatch::egress::put_search_result_done(conn, msg_id, result, &[])
}

/// A one-shot byte source/sink pair wrapping the frames read from stdin and
/// whatever gets written back; used instead of a socket so this demo needs
/// no network setup.
struct StdioChannel {
    inbound: VecDeque<u8>,
}

impl ByteSource for StdioChannel {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, LdapError> {
        let n = buf.len().min(self.inbound.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.inbound.pop_front().unwrap();
        }
        Ok(n)
    }
}

struct StdoutSink;

impl ByteSink for StdoutSink {
    fn try_write(&mut self, buf: &[u8]) -> Result<usize, LdapError> {
        std::io::stdout().write_all(buf).map_err(LdapError::Io)?;
        Ok(buf.len())
    }
}

fn main() {
    env_logger::init();

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .expect("reading stdin");

    let registry = OpRegistry::empty()
        .bind_request(Box::new(print_bind_request))
        .unbind_request(Box::new(print_unbind_request))
        .search_request(Box::new(print_search_request));
    let structural: Arc<Structural> = Structural::builder().registry(registry).build();

    let source = StdioChannel {
        inbound: input.into_iter().collect(),
    };
    let mut conn = Connection::new(structural, source, StdoutSink);

    loop {
        match conn.ingress_event() {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("ingress error: {e}");
                break;
            }
        }
    }
    if let Err(e) = conn.egress_event() {
        eprintln!("egress error: {e}");
    }
}
