//! `AddRequest`/`AddResponse` (RFC 4511 §4.7), `DelRequest`/`DelResponse`
//! (§4.8), and `ModifyDNRequest`/`ModifyDNResponse` (§4.9). Grouped together
//! because each is a short, self-contained wrapper around `LDAPDN` plus at
//! most one other field.

use super::{LdapDN, LdapResult, RelativeLdapDN};
use crate::error::LdapError;
use crate::filter::Attribute;
use asn1_rs::{Class, FromBer, OptTaggedParser, ParseResult, Sequence, Tag, TaggedParser};
use nom::combinator::complete;
use nom::multi::many0;
use nom::Err;
use std::borrow::Cow;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddRequest<'a> {
    pub entry: LdapDN<'a>,
    pub attributes: Vec<Attribute<'a>>,
}

/// `AddRequest ::= [APPLICATION 8] SEQUENCE { entry LDAPDN, attributes
/// AttributeList }`
impl<'a> FromBer<'a, LdapError> for AddRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 8, bytes, |i| {
            let (i, entry) = LdapDN::from_ber(i)?;
            let (i, attributes) =
                Sequence::from_ber_and_then(i, many0(complete(Attribute::from_ber)))?;
            Ok((i, AddRequest { entry, attributes }))
        })
    }
}

impl AddRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.entry.0.as_bytes());
        let mut attrs = Vec::new();
        for a in &self.attributes {
            attrs.extend_from_slice(&a.encode());
        }
        crate::der::push_tlv(&mut content, 0x30, &attrs);
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x68, &content); // [APPLICATION 8]
        out
    }
}

/// `AddResponse ::= [APPLICATION 9] LDAPResult`
pub fn parse_add_response(bytes: &[u8]) -> ParseResult<'_, LdapResult<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 9, bytes, super::result::parse_ldap_result_content)
}

/// `DelRequest ::= [APPLICATION 10] LDAPDN`
pub fn parse_del_request(bytes: &[u8]) -> ParseResult<'_, LdapDN<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 10, bytes, |i| {
        let s = std::str::from_utf8(i)
            .or(Err(Err::Error(LdapError::Decode("DelRequest DN not utf-8".into()))))?;
        Ok((&b""[..], LdapDN(Cow::Borrowed(s))))
    })
}

/// `DelResponse ::= [APPLICATION 11] LDAPResult`
pub fn parse_del_response(bytes: &[u8]) -> ParseResult<'_, LdapResult<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 11, bytes, super::result::parse_ldap_result_content)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModDnRequest<'a> {
    pub entry: LdapDN<'a>,
    pub newrdn: RelativeLdapDN<'a>,
    pub deleteoldrdn: bool,
    pub newsuperior: Option<LdapDN<'a>>,
}

/// `ModifyDNRequest ::= [APPLICATION 12] SEQUENCE { entry LDAPDN, newrdn
/// RelativeLDAPDN, deleteoldrdn BOOLEAN, newSuperior [0] LDAPDN OPTIONAL }`
impl<'a> FromBer<'a, LdapError> for ModDnRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 12, bytes, |i| {
            let (i, entry) = LdapDN::from_ber(i)?;
            let (i, newrdn) = RelativeLdapDN::from_ber(i)?;
            let (i, deleteoldrdn) = <bool>::from_ber(i).map_err(Err::convert)?;
            let (i, newsuperior) = OptTaggedParser::new(Class::ContextSpecific, Tag(0))
                .parse_ber(i, |_, i| {
                    let s = std::str::from_utf8(i)
                        .or(Err(Err::Error(LdapError::Decode("newSuperior not utf-8".into()))))?;
                    Ok((&b""[..], LdapDN(Cow::Borrowed(s))))
                })?;
            Ok((
                i,
                ModDnRequest {
                    entry,
                    newrdn,
                    deleteoldrdn,
                    newsuperior,
                },
            ))
        })
    }
}

impl ModDnRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.entry.0.as_bytes());
        crate::der::push_octet_string(&mut content, self.newrdn.0.as_bytes());
        crate::der::push_boolean(&mut content, self.deleteoldrdn);
        if let Some(newsuperior) = &self.newsuperior {
            crate::der::push_tlv(&mut content, 0x80, newsuperior.0.as_bytes());
        }
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x6c, &content); // [APPLICATION 12]
        out
    }
}

/// `ModifyDNResponse ::= [APPLICATION 13] LDAPResult`
pub fn parse_moddn_response(bytes: &[u8]) -> ParseResult<'_, LdapResult<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 13, bytes, super::result::parse_ldap_result_content)
}
