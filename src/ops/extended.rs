//! `ExtendedRequest`/`ExtendedResponse`/`IntermediateResponse` (RFC 4511
//! §4.12), and the specific named extended operations the `opcode` dispatch
//! layer recognises by OID: StartTLS (RFC 4511 §4.14), Password Modify (RFC
//! 3062), Who Am I (RFC 4532), Cancel (RFC 3909), LBURP (RFC 4373), Turn
//! (RFC 4531), and Transactions (RFC 5805).

use super::{LdapOID, LdapResult};
use crate::error::LdapError;
use asn1_rs::{Class, FromBer, OptTaggedParser, ParseResult, Sequence, Tag, TaggedParser};
use std::borrow::Cow;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtendedRequest<'a> {
    pub request_name: LdapOID<'a>,
    pub request_value: Option<Cow<'a, [u8]>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtendedResponse<'a> {
    pub result: LdapResult<'a>,
    pub response_name: Option<LdapOID<'a>>,
    pub response_value: Option<Cow<'a, [u8]>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IntermediateResponse<'a> {
    pub response_name: Option<LdapOID<'a>>,
    pub response_value: Option<Cow<'a, [u8]>>,
}

/// `ExtendedRequest ::= [APPLICATION 23] SEQUENCE { requestName [0] LDAPOID,
/// requestValue [1] OCTET STRING OPTIONAL }`
impl<'a> FromBer<'a, LdapError> for ExtendedRequest<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 23, bytes, |i| {
            let (i, request_name) = TaggedParser::from_ber_and_then(Class::ContextSpecific, 0, i, |i| {
                let s = std::str::from_utf8(i)
                    .or(Err(nom::Err::Error(LdapError::Decode("requestName not utf-8".into()))))?;
                Ok((&b""[..], LdapOID(Cow::Borrowed(s))))
            })?;
            let (i, request_value) = OptTaggedParser::new(Class::ContextSpecific, Tag(1))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            Ok((
                i,
                ExtendedRequest {
                    request_name,
                    request_value,
                },
            ))
        })
    }
}

/// `ExtendedResponse ::= [APPLICATION 24] SEQUENCE { COMPONENTS OF
/// LDAPResult, responseName [10] LDAPOID OPTIONAL, responseValue [11]
/// OCTET STRING OPTIONAL }`
impl<'a> FromBer<'a, LdapError> for ExtendedResponse<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 24, bytes, |i| {
            let (i, result) = super::result::parse_ldap_result_content(i)?;
            let (i, response_name) = OptTaggedParser::new(Class::ContextSpecific, Tag(10))
                .parse_ber(i, |_, i| {
                    let s = std::str::from_utf8(i)
                        .or(Err(nom::Err::Error(LdapError::Decode("responseName not utf-8".into()))))?;
                    Ok((&b""[..], LdapOID(Cow::Borrowed(s))))
                })?;
            let (i, response_value) = OptTaggedParser::new(Class::ContextSpecific, Tag(11))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            Ok((
                i,
                ExtendedResponse {
                    result,
                    response_name,
                    response_value,
                },
            ))
        })
    }
}

/// `IntermediateResponse ::= [APPLICATION 25] SEQUENCE { responseName [0]
/// LDAPOID OPTIONAL, responseValue [1] OCTET STRING OPTIONAL }`
impl<'a> FromBer<'a, LdapError> for IntermediateResponse<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        TaggedParser::from_ber_and_then(Class::Application, 25, bytes, |i| {
            let (i, response_name) = OptTaggedParser::new(Class::ContextSpecific, Tag(0))
                .parse_ber(i, |_, i| {
                    let s = std::str::from_utf8(i)
                        .or(Err(nom::Err::Error(LdapError::Decode("responseName not utf-8".into()))))?;
                    Ok((&b""[..], LdapOID(Cow::Borrowed(s))))
                })?;
            let (i, response_value) = OptTaggedParser::new(Class::ContextSpecific, Tag(1))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            Ok((
                i,
                IntermediateResponse {
                    response_name,
                    response_value,
                },
            ))
        })
    }
}

impl ExtendedRequest<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_tlv(&mut content, 0x80, self.request_name.0.as_bytes());
        if let Some(value) = &self.request_value {
            crate::der::push_tlv(&mut content, 0x81, value);
        }
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x77, &content); // [APPLICATION 23]
        out
    }
}

impl ExtendedResponse<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_enumerated(&mut content, self.result.result_code.0);
        crate::der::push_octet_string(&mut content, self.result.matched_dn.0.as_bytes());
        crate::der::push_octet_string(&mut content, self.result.diagnostic_message.0.as_bytes());
        if let Some(name) = &self.response_name {
            crate::der::push_tlv(&mut content, 0x8a, name.0.as_bytes());
        }
        if let Some(value) = &self.response_value {
            crate::der::push_tlv(&mut content, 0x8b, value);
        }
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x78, &content); // [APPLICATION 24]
        out
    }
}

impl IntermediateResponse<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        if let Some(name) = &self.response_name {
            crate::der::push_tlv(&mut content, 0x80, name.0.as_bytes());
        }
        if let Some(value) = &self.response_value {
            crate::der::push_tlv(&mut content, 0x81, value);
        }
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x79, &content); // [APPLICATION 25]
        out
    }
}

/// `PasswdModifyRequestValue ::= SEQUENCE { userIdentity [0] OCTET STRING
/// OPTIONAL, oldPasswd [1] OCTET STRING OPTIONAL, newPasswd [2] OCTET
/// STRING OPTIONAL }` (RFC 3062).
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct PasswdModifyRequestValue<'a> {
    pub user_identity: Option<Cow<'a, [u8]>>,
    pub old_passwd: Option<Cow<'a, [u8]>>,
    pub new_passwd: Option<Cow<'a, [u8]>>,
}

impl<'a> FromBer<'a, LdapError> for PasswdModifyRequestValue<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, user_identity) = OptTaggedParser::new(Class::ContextSpecific, Tag(0))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            let (i, old_passwd) = OptTaggedParser::new(Class::ContextSpecific, Tag(1))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            let (i, new_passwd) = OptTaggedParser::new(Class::ContextSpecific, Tag(2))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            Ok((
                i,
                PasswdModifyRequestValue {
                    user_identity,
                    old_passwd,
                    new_passwd,
                },
            ))
        })
    }
}

/// `PasswdModifyResponseValue ::= SEQUENCE { genPasswd [0] OCTET STRING
/// OPTIONAL }` (RFC 3062).
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct PasswdModifyResponseValue<'a> {
    pub gen_passwd: Option<Cow<'a, [u8]>>,
}

impl<'a> FromBer<'a, LdapError> for PasswdModifyResponseValue<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, gen_passwd) = OptTaggedParser::new(Class::ContextSpecific, Tag(0))
                .parse_ber(i, |_, data| Ok((&b""[..], Cow::Borrowed(data))))?;
            Ok((i, PasswdModifyResponseValue { gen_passwd }))
        })
    }
}

/// Cancel (RFC 3909): `cancelRequestValue ::= SEQUENCE { cancelID
/// MessageID }`. The response is a plain `ExtendedResponse` with no value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CancelRequestValue {
    pub cancel_id: super::MessageID,
}

impl<'a> FromBer<'a, LdapError> for CancelRequestValue {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, cancel_id) = super::MessageID::from_ber(i)?;
            Ok((i, CancelRequestValue { cancel_id }))
        })
    }
}

/// Who Am I (RFC 4532): the request carries no value; the response value is
/// an `authzId` octet string, passed through uninterpreted since its
/// grammar (`dnAuthzId` / `uAuthzId`) is an application-level concern.
pub type WhoamiResponseValue<'a> = Cow<'a, [u8]>;

/// LBURP (RFC 4373) start request value: a client-chosen batch size and an
/// optional batch version hint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartLburpRequestValue<'a> {
    pub expected_update_rate: u32,
    pub extra: Option<Cow<'a, [u8]>>,
}

impl<'a> FromBer<'a, LdapError> for StartLburpRequestValue<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, expected_update_rate) = super::result::parse_ldap_int_as_u32(i)?;
            let (i, extra) = asn1_rs::nom::combinator::opt(asn1_rs::nom::combinator::complete(
                asn1_rs::nom::combinator::map(super::result::parse_ldap_octet_string_as_slice, Cow::Borrowed),
            ))(i)?;
            Ok((
                i,
                StartLburpRequestValue {
                    expected_update_rate,
                    extra,
                },
            ))
        })
    }
}

/// `TxnEndReq ::= SEQUENCE { commit BOOLEAN DEFAULT TRUE, identifier OCTET
/// STRING }` (RFC 5805 §4).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxnEndRequestValue<'a> {
    pub commit: bool,
    pub identifier: Cow<'a, [u8]>,
}

impl<'a> FromBer<'a, LdapError> for TxnEndRequestValue<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, maybe_commit) = <Option<bool>>::from_ber(i).map_err(nom::Err::convert)?;
            let commit = maybe_commit.unwrap_or(true);
            let (i, identifier) =
                asn1_rs::nom::combinator::map(super::result::parse_ldap_octet_string_as_slice, Cow::Borrowed)(i)?;
            Ok((i, TxnEndRequestValue { commit, identifier }))
        })
    }
}

/// `TxnEndRes ::= SEQUENCE { messageID MessageID OPTIONAL, updatesControls
/// SEQUENCE OF ... OPTIONAL }` is simplified here to its identifier, since
/// per-update controls are out of scope for this crate's operation
/// catalogue (applications needing them read raw `response_value`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxnEndResponseValue {
    pub identifier: Option<super::MessageID>,
}
