//! `LDAPResult` and the RFC 4511 Appendix A.1 result-code catalogue.

use super::{LdapDN, LdapString};
use crate::error::LdapError;
use asn1_rs::{Enumerated, FromBer, ParseResult};
use nom::Err;
use rusticata_macros::newtype_enum;
use std::fmt;

#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct ResultCode(pub u32);

newtype_enum! {
impl debug ResultCode {
    Success = 0,
    OperationsError = 1,
    ProtocolError = 2,
    TimeLimitExceeded = 3,
    SizeLimitExceeded = 4,
    CompareFalse = 5,
    CompareTrue = 6,
    AuthMethodNotSupported = 7,
    StrongerAuthRequired = 8,
    // -- 9 reserved --
    Referral = 10,
    AdminLimitExceeded = 11,
    UnavailableCriticalExtension = 12,
    ConfidentialityRequired = 13,
    SaslBindInProgress = 14,
    NoSuchAttribute = 16,
    UndefinedAttributeType = 17,
    InappropriateMatching = 18,
    ConstraintViolation = 19,
    AttributeOrValueExists = 20,
    InvalidAttributeSyntax = 21,
    // -- 22-31 unused --
    NoSuchObject = 32,
    AliasProblem = 33,
    InvalidDNSyntax = 34,
    // -- 35 reserved for undefined isLeaf --
    AliasDereferencingProblem = 36,
    // -- 37-47 unused --
    InappropriateAuthentication = 48,
    InvalidCredentials = 49,
    InsufficientAccessRights = 50,
    Busy = 51,
    Unavailable = 52,
    UnwillingToPerform = 53,
    LoopDetect = 54,
    // -- 55-63 unused --
    NamingViolation = 64,
    ObjectClassViolation = 65,
    NotAllowedOnNonLeaf = 66,
    NotAllowedOnRDN = 67,
    EntryAlreadyExists = 68,
    ObjectClassModsProhibited = 69,
    // -- 70 reserved for CLDAP --
    AffectsMultipleDSAs = 71,
    // -- 72-79 unused --
    Other = 80,
    Abandoned = 88,
}
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ResultCode {
    /// True for the codes RFC 4511 treats as non-error outcomes of a
    /// request: success and referral.
    pub fn is_non_error(self) -> bool {
        self == ResultCode::Success || self == ResultCode::Referral
    }
}

/// `LDAPResult ::= SEQUENCE { resultCode, matchedDN, diagnosticMessage,
/// referral [3] Referral OPTIONAL }`
///
/// Referrals are not modelled separately; applications needing them should
/// inspect `diagnostic_message` or extend this struct, matching the
/// distilled design's stance of leaving referral chasing to the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LdapResult<'a> {
    pub result_code: ResultCode,
    pub matched_dn: LdapDN<'a>,
    pub diagnostic_message: LdapString<'a>,
}

impl<'a> LdapResult<'a> {
    /// Construct a minimal result carrying only a result code, for
    /// synthesizing policy-rejection responses.
    pub fn with_code(result_code: ResultCode) -> LdapResult<'static> {
        LdapResult {
            result_code,
            matched_dn: LdapDN(std::borrow::Cow::Borrowed("")),
            diagnostic_message: LdapString(std::borrow::Cow::Borrowed("")),
        }
    }
}

impl LdapResult<'_> {
    /// Encode as `[APPLICATION tag] SEQUENCE { resultCode, matchedDN,
    /// diagnosticMessage }`, for responses carrying nothing past
    /// `COMPONENTS OF LDAPResult` (Bind/Modify/Add/Del/ModDN/Compare
    /// responses, and the synthesized policy-rejection response).
    pub fn encode(&self, application_tag: u8) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_enumerated(&mut content, self.result_code.0);
        crate::der::push_octet_string(&mut content, self.matched_dn.0.as_bytes());
        crate::der::push_octet_string(&mut content, self.diagnostic_message.0.as_bytes());
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x60 | application_tag, &content);
        out
    }
}

impl fmt::Display for LdapResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "rc={} ({}), dn: \"{}\", text: \"{}\"",
            self.result_code.0, self.result_code, self.matched_dn.0, self.diagnostic_message.0
        )
    }
}

pub(crate) fn parse_ldap_enum_as_u32(i: &[u8]) -> ParseResult<'_, u32, LdapError> {
    let (i, obj) = Enumerated::from_ber(i).map_err(Err::convert)?;
    Ok((i, obj.0))
}

pub(crate) fn parse_ldap_result_content(i: &[u8]) -> ParseResult<'_, LdapResult<'_>, LdapError> {
    use asn1_rs::nom::combinator::map;
    let (i, result_code) = map(parse_ldap_enum_as_u32, ResultCode)(i)?;
    let (i, matched_dn) = LdapDN::from_ber(i)?;
    let (i, diagnostic_message) = LdapString::from_ber(i)?;
    Ok((
        i,
        LdapResult {
            result_code,
            matched_dn,
            diagnostic_message,
        },
    ))
}

impl<'a> FromBer<'a, LdapError> for LdapDN<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        let (i, b) = <&[u8]>::from_ber(bytes).map_err(Err::convert)?;
        let s = std::str::from_utf8(b).or(Err(Err::Error(LdapError::Decode(
            "LDAPDN is not valid UTF-8".into(),
        ))))?;
        Ok((i, LdapDN(std::borrow::Cow::Borrowed(s))))
    }
}

impl<'a> FromBer<'a, LdapError> for super::RelativeLdapDN<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        let (i, b) = <&[u8]>::from_ber(bytes).map_err(Err::convert)?;
        let s = std::str::from_utf8(b).or(Err(Err::Error(LdapError::Decode(
            "RelativeLDAPDN is not valid UTF-8".into(),
        ))))?;
        Ok((i, super::RelativeLdapDN(std::borrow::Cow::Borrowed(s))))
    }
}

impl<'a> FromBer<'a, LdapError> for LdapString<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        let (i, b) = <&[u8]>::from_ber(bytes).map_err(Err::convert)?;
        let s = std::str::from_utf8(b).or(Err(Err::Error(LdapError::Decode(
            "LDAPString is not valid UTF-8".into(),
        ))))?;
        Ok((i, LdapString(std::borrow::Cow::Borrowed(s))))
    }
}

impl<'a> FromBer<'a, LdapError> for super::LdapOID<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        let (i, b) = <&[u8]>::from_ber(bytes).map_err(Err::convert)?;
        let s = std::str::from_utf8(b).or(Err(Err::Error(LdapError::Decode(
            "LDAPOID is not valid UTF-8".into(),
        ))))?;
        Ok((i, super::LdapOID(std::borrow::Cow::Borrowed(s))))
    }
}

impl<'a> FromBer<'a, LdapError> for super::MessageID {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        use asn1_rs::nom::combinator::map;
        map(u32::from_ber, super::MessageID)(bytes).map_err(Err::convert)
    }
}

pub(crate) fn parse_ldap_octet_string_as_slice<'a>(
    i: &'a [u8],
) -> ParseResult<'a, &'a [u8], LdapError> {
    <&[u8]>::from_ber(i).map_err(Err::convert)
}

pub(crate) fn parse_ldap_int_as_u32(i: &[u8]) -> ParseResult<'_, u32, LdapError> {
    <u32>::from_ber(i).map_err(Err::convert)
}
