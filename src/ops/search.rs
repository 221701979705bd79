//! `SearchRequest` and its three response forms (RFC 4511 §4.5).

use super::result::{parse_ldap_enum_as_u32, parse_ldap_int_as_u32};
use super::{DerefAliases, LdapDN, LdapString, SearchScope};
use crate::error::LdapError;
use crate::filter::{Filter, PartialAttribute};
use asn1_rs::{Class, FromBer, ParseResult, Sequence, TaggedParser};
use nom::combinator::{complete, map};
use nom::multi::{many0, many1};
use nom::Err;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchRequest<'a> {
    pub base_object: LdapDN<'a>,
    pub scope: SearchScope,
    pub deref_aliases: DerefAliases,
    pub size_limit: u32,
    pub time_limit: u32,
    pub types_only: bool,
    pub filter: Filter<'a>,
    pub attributes: Vec<LdapString<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchResultEntry<'a> {
    pub object_name: LdapDN<'a>,
    pub attributes: Vec<PartialAttribute<'a>>,
}

/// `SearchRequest ::= [APPLICATION 3] SEQUENCE { baseObject LDAPDN, scope
/// ENUMERATED, derefAliases ENUMERATED, sizeLimit INTEGER, timeLimit
/// INTEGER, typesOnly BOOLEAN, filter Filter, attributes AttributeSelection }`
impl<'a> FromBer<'a, LdapError> for SearchRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 3, bytes, |i| {
            let (i, base_object) = LdapDN::from_ber(i)?;
            let (i, scope) = map(parse_ldap_enum_as_u32, SearchScope)(i)?;
            let (i, deref_aliases) = map(parse_ldap_enum_as_u32, DerefAliases)(i)?;
            let (i, size_limit) = parse_ldap_int_as_u32(i)?;
            let (i, time_limit) = parse_ldap_int_as_u32(i)?;
            let (i, types_only) = <bool>::from_ber(i).map_err(Err::convert)?;
            let (i, filter) = Filter::from_ber(i)?;
            let (i, attributes) =
                Sequence::from_ber_and_then(i, many0(complete(LdapString::from_ber)))?;
            Ok((
                i,
                SearchRequest {
                    base_object,
                    scope,
                    deref_aliases,
                    size_limit,
                    time_limit,
                    types_only,
                    filter,
                    attributes,
                },
            ))
        })
    }
}

/// `SearchResultEntry ::= [APPLICATION 4] SEQUENCE { objectName LDAPDN,
/// attributes PartialAttributeList }`
impl<'a> FromBer<'a, LdapError> for SearchResultEntry<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 4, bytes, |i| {
            let (i, object_name) = LdapDN::from_ber(i)?;
            let (i, attributes) =
                Sequence::from_ber_and_then(i, many0(complete(PartialAttribute::from_ber)))?;
            Ok((
                i,
                SearchResultEntry {
                    object_name,
                    attributes,
                },
            ))
        })
    }
}

impl SearchRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.base_object.0.as_bytes());
        crate::der::push_enumerated(&mut content, self.scope.0);
        crate::der::push_enumerated(&mut content, self.deref_aliases.0);
        crate::der::push_integer(&mut content, self.size_limit);
        crate::der::push_integer(&mut content, self.time_limit);
        crate::der::push_boolean(&mut content, self.types_only);
        content.extend_from_slice(&self.filter.encode());
        let mut attrs = Vec::new();
        for a in &self.attributes {
            crate::der::push_octet_string(&mut attrs, a.0.as_bytes());
        }
        crate::der::push_tlv(&mut content, 0x30, &attrs);
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x63, &content); // [APPLICATION 3]
        out
    }
}

impl SearchResultEntry<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.object_name.0.as_bytes());
        let mut attrs = Vec::new();
        for a in &self.attributes {
            attrs.extend_from_slice(&a.encode());
        }
        crate::der::push_tlv(&mut content, 0x30, &attrs);
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x64, &content); // [APPLICATION 4]
        out
    }
}

/// `SearchResultDone ::= [APPLICATION 5] LDAPResult`
pub fn parse_search_result_done(
    bytes: &[u8],
) -> ParseResult<'_, super::LdapResult<'_>, LdapError> {
    TaggedParser::from_ber_and_then(Class::Application, 5, bytes, super::result::parse_ldap_result_content)
}

/// `SearchResultReference ::= [APPLICATION 19] SEQUENCE SIZE (1..MAX) OF uri URI`
pub fn parse_search_result_reference(
    bytes: &[u8],
) -> ParseResult<'_, Vec<LdapString<'_>>, LdapError> {
    TaggedParser::from_ber_and_then(
        Class::Application,
        19,
        bytes,
        many1(complete(LdapString::from_ber)),
    )
}
