//! `BindRequest` / `BindResponse` (RFC 4511 §4.2).

use super::result::parse_ldap_result_content;
use super::{LdapDN, LdapResult, LdapString};
use crate::error::LdapError;
use asn1_rs::{Class, FromBer, Header, ParseResult, TaggedParser};
use nom::bytes::streaming::take;
use nom::combinator::{map, opt, verify};
use nom::Err;
use std::borrow::Cow;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindRequest<'a> {
    pub version: u8,
    pub name: LdapDN<'a>,
    pub authentication: AuthenticationChoice<'a>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaslCredentials<'a> {
    pub mechanism: LdapString<'a>,
    pub credentials: Option<Cow<'a, [u8]>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthenticationChoice<'a> {
    Simple(Cow<'a, [u8]>),
    Sasl(SaslCredentials<'a>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindResponse<'a> {
    pub result: LdapResult<'a>,
    pub server_sasl_creds: Option<Cow<'a, [u8]>>,
}

/// `BindRequest ::= [APPLICATION 0] SEQUENCE { version INTEGER (1..127),
/// name LDAPDN, authentication AuthenticationChoice }`
impl<'a> FromBer<'a, LdapError> for BindRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 0, bytes, |i| {
            let (i, version) = verify(u8::from_ber, |&n| n < 128)(i).map_err(Err::convert)?;
            let (i, name) = LdapDN::from_ber(i)?;
            let (i, authentication) = AuthenticationChoice::from_ber(i)?;
            Ok((
                i,
                BindRequest {
                    version,
                    name,
                    authentication,
                },
            ))
        })
    }
}

/// `BindResponse ::= [APPLICATION 1] SEQUENCE { COMPONENTS OF LDAPResult,
/// serverSaslCreds [7] OCTET STRING OPTIONAL }`
impl<'a> FromBer<'a, LdapError> for BindResponse<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 1, bytes, |i| {
            let (i, result) = parse_ldap_result_content(i)?;
            let (i, server_sasl_creds) = asn1_rs::OptTaggedParser::new(Class::ContextSpecific, asn1_rs::Tag(7))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            Ok((
                i,
                BindResponse {
                    result,
                    server_sasl_creds,
                },
            ))
        })
    }
}

/// `AuthenticationChoice ::= CHOICE { simple [0] OCTET STRING, sasl [3]
/// SaslCredentials, ... }`
impl<'a> FromBer<'a, LdapError> for AuthenticationChoice<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        let (rem, header) = Header::from_ber(bytes).map_err(Err::convert)?;
        match header.tag().0 {
            0 => {
                let sz = header
                    .length()
                    .definite()
                    .map_err(|_| Err::Error(LdapError::Framing("indefinite-length authentication choice")))?;
                let (i, b) = take(sz)(rem)?;
                Ok((i, AuthenticationChoice::Simple(Cow::Borrowed(b))))
            }
            3 => map(parse_sasl_credentials, AuthenticationChoice::Sasl)(rem),
            n => Err(Err::Error(LdapError::Decode(format!(
                "unsupported authentication choice tag {}",
                n
            )))),
        }
    }
}

impl BindRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_tlv(&mut content, 0x02, &[self.version]);
        crate::der::push_octet_string(&mut content, self.name.0.as_bytes());
        match &self.authentication {
            AuthenticationChoice::Simple(creds) => {
                crate::der::push_tlv(&mut content, 0x80, creds);
            }
            AuthenticationChoice::Sasl(sasl) => {
                let mut sasl_content = Vec::new();
                crate::der::push_octet_string(&mut sasl_content, sasl.mechanism.0.as_bytes());
                if let Some(creds) = &sasl.credentials {
                    crate::der::push_octet_string(&mut sasl_content, creds);
                }
                crate::der::push_tlv(&mut content, 0xa3, &sasl_content);
            }
        }
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x60, &content); // [APPLICATION 0]
        out
    }
}

impl BindResponse<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_enumerated(&mut content, self.result.result_code.0);
        crate::der::push_octet_string(&mut content, self.result.matched_dn.0.as_bytes());
        crate::der::push_octet_string(&mut content, self.result.diagnostic_message.0.as_bytes());
        if let Some(creds) = &self.server_sasl_creds {
            crate::der::push_tlv(&mut content, 0x87, creds);
        }
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x61, &content); // [APPLICATION 1]
        out
    }
}

fn parse_sasl_credentials(i: &[u8]) -> ParseResult<'_, SaslCredentials<'_>, LdapError> {
    let (i, mechanism) = LdapString::from_ber(i)?;
    let (i, credentials) = opt(nom::combinator::complete(map(
        super::result::parse_ldap_octet_string_as_slice,
        Cow::Borrowed,
    )))(i)?;
    Ok((
        i,
        SaslCredentials {
            mechanism,
            credentials,
        },
    ))
}
