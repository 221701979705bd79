//! `CompareRequest`/`CompareResponse` (RFC 4511 §4.10).

use super::{LdapDN, LdapResult};
use crate::error::LdapError;
use crate::filter::AttributeValueAssertion;
use asn1_rs::{Class, FromBer, ParseResult, TaggedParser};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompareRequest<'a> {
    pub entry: LdapDN<'a>,
    pub ava: AttributeValueAssertion<'a>,
}

/// `CompareRequest ::= [APPLICATION 14] SEQUENCE { entry LDAPDN, ava
/// AttributeValueAssertion }`
impl<'a> FromBer<'a, LdapError> for CompareRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 14, bytes, |i| {
            let (i, entry) = LdapDN::from_ber(i)?;
            let (i, ava) = AttributeValueAssertion::from_ber(i)?;
            Ok((i, CompareRequest { entry, ava }))
        })
    }
}

impl CompareRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.entry.0.as_bytes());
        let mut ava = Vec::new();
        crate::der::push_octet_string(&mut ava, self.ava.attribute_desc.0.as_bytes());
        crate::der::push_octet_string(&mut ava, &self.ava.assertion_value);
        crate::der::push_tlv(&mut content, 0x30, &ava);
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x6e, &content); // [APPLICATION 14]
        out
    }
}

/// `CompareResponse ::= [APPLICATION 15] LDAPResult`
///
/// Unlike every other response, a successful Compare returns `compareFalse`
/// (5) or `compareTrue` (6) rather than `success` (0); other codes indicate
/// a genuine error.
pub fn parse_compare_response(bytes: &[u8]) -> ParseResult<'_, LdapResult<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 15, bytes, super::result::parse_ldap_result_content)
}
