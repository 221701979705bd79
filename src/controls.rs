//! LDAP controls: the `(OID, criticality, value)` triples RFC 4511 lets
//! applications attach to a message, plus the decode/encode for the
//! `Controls ::= SEQUENCE OF Control` list carried as LDAPMessage's
//! context-tag-0 element.

use crate::error::LdapError;
use crate::ops::LdapOID;
use crate::ops::ResultCode;
use asn1_rs::{FromBer, ParseResult, Sequence};
use nom::combinator::{complete, opt};
use nom::multi::many0;
use nom::Err;
use std::borrow::Cow;

/// `Control ::= SEQUENCE { controlType LDAPOID, criticality BOOLEAN DEFAULT
/// FALSE, controlValue OCTET STRING OPTIONAL }`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Control<'a> {
    pub control_type: LdapOID<'a>,
    pub criticality: bool,
    pub control_value: Option<Cow<'a, [u8]>>,
}

impl<'a> Control<'a> {
    pub fn new(oid: impl Into<Cow<'a, str>>, criticality: bool, value: Option<Cow<'a, [u8]>>) -> Self {
        Control {
            control_type: LdapOID(oid.into()),
            criticality,
            control_value: value,
        }
    }
}

impl<'a> FromBer<'a, LdapError> for Control<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, control_type) = LdapOID::from_ber(i)?;
            let (i, maybe_critical) = <Option<bool>>::from_ber(i).map_err(Err::convert)?;
            let criticality = maybe_critical.unwrap_or(false);
            let (i, control_value) = opt(complete(asn1_rs::nom::combinator::map(
                crate::ops::result::parse_ldap_octet_string_as_slice,
                Cow::Borrowed,
            )))(i)?;
            Ok((
                i,
                Control {
                    control_type,
                    criticality,
                    control_value,
                },
            ))
        })
    }
}

/// Parse the `Controls ::= SEQUENCE OF Control` list out of the bytes inside
/// LDAPMessage's `[0]` tag (the tag itself is stripped by the caller, the
/// `dercursor` ingress layer).
pub fn parse_controls(bytes: &[u8]) -> ParseResult<'_, Vec<Control<'_>>, LdapError> {
    many0(complete(Control::from_ber))(bytes)
}

/// Outcome of a control-policy hook: accept the controls list unchanged,
/// replace it, or reject the whole message with a result code.
pub enum PolicyOutcome<'a> {
    Accept,
    Replace(Vec<Control<'a>>),
    Reject(ResultCode),
}

/// A control-inspection hook, installed on [`crate::structural::Structural`]
/// for either direction and either a specific opcode or "all opcodes".
pub type ControlHook = Box<dyn for<'a> Fn(&[Control<'a>]) -> PolicyOutcome<'a> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_criticality_is_false() {
        let c = Control::new("1.2.3.4", false, None);
        assert!(!c.criticality);
        assert_eq!(c.control_type.0, "1.2.3.4");
    }
}
