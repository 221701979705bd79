//! `ModifyRequest` / `ModifyResponse` (RFC 4511 §4.6).

use super::result::parse_ldap_enum_as_u32;
use super::{LdapDN, LdapResult, ModifyOperation};
use crate::error::LdapError;
use crate::filter::PartialAttribute;
use asn1_rs::{Class, FromBer, ParseResult, Sequence, TaggedParser};
use nom::combinator::{complete, map};
use nom::multi::many1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModifyRequest<'a> {
    pub object: LdapDN<'a>,
    pub changes: Vec<Change<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModifyResponse<'a> {
    pub result: LdapResult<'a>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Change<'a> {
    pub operation: ModifyOperation,
    pub modification: PartialAttribute<'a>,
}

/// `ModifyRequest ::= [APPLICATION 6] SEQUENCE { object LDAPDN, changes
/// SEQUENCE OF change SEQUENCE { operation ENUMERATED, modification
/// PartialAttribute } }`
impl<'a> FromBer<'a, LdapError> for ModifyRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 6, bytes, |i| {
            let (i, object) = LdapDN::from_ber(i)?;
            let (i, changes) = Sequence::from_ber_and_then(i, many1(complete(Change::from_ber)))?;
            Ok((i, ModifyRequest { object, changes }))
        })
    }
}

impl ModifyRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.object.0.as_bytes());
        let mut changes = Vec::new();
        for change in &self.changes {
            let mut change_content = Vec::new();
            crate::der::push_enumerated(&mut change_content, change.operation.0);
            change_content.extend_from_slice(&change.modification.encode());
            crate::der::push_tlv(&mut changes, 0x30, &change_content);
        }
        crate::der::push_tlv(&mut content, 0x30, &changes);
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x66, &content); // [APPLICATION 6]
        out
    }
}

impl ModifyResponse<'_> {
    pub fn encode(&self) -> Vec<u8> {
        self.result.encode(7)
    }
}

/// `ModifyResponse ::= [APPLICATION 7] LDAPResult`
pub fn parse_modify_response(bytes: &[u8]) -> ParseResult<'_, ModifyResponse<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 7, bytes, |i| {
        let (i, result) = super::result::parse_ldap_result_content(i)?;
        Ok((i, ModifyResponse { result }))
    })
}

impl<'a> FromBer<'a, LdapError> for Change<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, operation) = map(parse_ldap_enum_as_u32, ModifyOperation)(i)?;
            let (i, modification) = PartialAttribute::from_ber(i)?;
            Ok((
                i,
                Change {
                    operation,
                    modification,
                },
            ))
        })
    }
}
