//! The RFC 4511 `Filter` CHOICE, `(Partial)Attribute`, and the attribute
//! value types they're built from, plus DER decode and a human-readable
//! string grammar (RFC 4515) for `Filter`.

use crate::error::LdapError;
use crate::ops::result::parse_ldap_octet_string_as_slice;
use crate::ops::LdapString;
use asn1_rs::{Any, Class, FromBer, OptTaggedImplicit, OptTaggedParser, ParseResult, Sequence, Set, Tag, TaggedParser};
use nom::combinator::{complete, map};
use nom::multi::{many0, many1};
use nom::Err;
use std::borrow::Cow;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Filter<'a> {
    And(Vec<Filter<'a>>),
    Or(Vec<Filter<'a>>),
    Not(Box<Filter<'a>>),
    EqualityMatch(AttributeValueAssertion<'a>),
    Substrings(SubstringFilter<'a>),
    GreaterOrEqual(AttributeValueAssertion<'a>),
    LessOrEqual(AttributeValueAssertion<'a>),
    Present(LdapString<'a>),
    ApproxMatch(AttributeValueAssertion<'a>),
    ExtensibleMatch(MatchingRuleAssertion<'a>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartialAttribute<'a> {
    pub attr_type: LdapString<'a>,
    pub attr_vals: Vec<AttributeValue<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute<'a> {
    pub attr_type: LdapString<'a>,
    pub attr_vals: Vec<AttributeValue<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeValueAssertion<'a> {
    pub attribute_desc: LdapString<'a>,
    pub assertion_value: Cow<'a, [u8]>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeDescription<'a>(pub Cow<'a, str>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchingRuleAssertion<'a> {
    pub matching_rule: Option<LdapString<'a>>,
    pub rule_type: Option<AttributeDescription<'a>>,
    pub assertion_value: AssertionValue<'a>,
    pub dn_attributes: Option<bool>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubstringFilter<'a> {
    pub filter_type: LdapString<'a>,
    pub substrings: Vec<Substring<'a>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Substring<'a> {
    Initial(AssertionValue<'a>),
    Any(AssertionValue<'a>),
    Final(AssertionValue<'a>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssertionValue<'a>(pub Cow<'a, [u8]>);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeValue<'a>(pub Cow<'a, [u8]>);

fn parse_ldap_attribute_value_assertion_content(
    content: &[u8],
) -> ParseResult<'_, AttributeValueAssertion<'_>, LdapError> {
    let (content, attribute_desc) = LdapString::from_ber(content)?;
    let (content, assertion_value) = parse_ldap_octet_string_as_slice(content)?;
    Ok((
        content,
        AttributeValueAssertion {
            attribute_desc,
            assertion_value: Cow::Borrowed(assertion_value),
        },
    ))
}

impl<'a> FromBer<'a, LdapError> for AttributeValueAssertion<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, parse_ldap_attribute_value_assertion_content)
    }
}

fn parse_ldap_attribute_value(i: &[u8]) -> ParseResult<'_, AttributeValue<'_>, LdapError> {
    map(parse_ldap_octet_string_as_slice, |v| {
        AttributeValue(Cow::Borrowed(v))
    })(i)
}

impl<'a> FromBer<'a, LdapError> for PartialAttribute<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, attr_type) = LdapString::from_ber(i)?;
            let (i, attr_vals) =
                Set::from_ber_and_then(i, |inner| many0(complete(parse_ldap_attribute_value))(inner))?;
            Ok((
                i,
                PartialAttribute {
                    attr_type,
                    attr_vals,
                },
            ))
        })
    }
}

impl<'a> FromBer<'a, LdapError> for Attribute<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        Sequence::from_ber_and_then(bytes, |i| {
            let (i, attr_type) = LdapString::from_ber(i)?;
            let (i, attr_vals) =
                Set::from_ber_and_then(i, |inner| many1(complete(parse_ldap_attribute_value))(inner))?;
            Ok((
                i,
                Attribute {
                    attr_type,
                    attr_vals,
                },
            ))
        })
    }
}

/// `Filter ::= CHOICE { and [0], or [1], not [2], equalityMatch [3],
/// substrings [4], greaterOrEqual [5], lessOrEqual [6], present [7],
/// approxMatch [8], extensibleMatch [9], ... }`
impl<'a> FromBer<'a, LdapError> for Filter<'a> {
    fn from_ber(bytes: &'a [u8]) -> ParseResult<'a, Self, LdapError> {
        let (rem, any) = Any::from_ber(bytes).map_err(Err::convert)?;
        any.class()
            .assert_eq(Class::ContextSpecific)
            .map_err(|e| Err::Error(e.into()))?;
        let content = any.data;
        let (_, filter) = match any.tag().0 {
            0 => {
                let (rem, sub) = many1(complete(Filter::from_ber))(content)?;
                Ok((rem, Filter::And(sub)))
            }
            1 => {
                let (rem, sub) = many1(complete(Filter::from_ber))(content)?;
                Ok((rem, Filter::Or(sub)))
            }
            2 => map(Filter::from_ber, |f| Filter::Not(Box::new(f)))(content),
            3 => map(
                parse_ldap_attribute_value_assertion_content,
                Filter::EqualityMatch,
            )(content),
            4 => map(parse_ldap_substrings_filter_content, Filter::Substrings)(content),
            5 => map(
                parse_ldap_attribute_value_assertion_content,
                Filter::GreaterOrEqual,
            )(content),
            6 => map(
                parse_ldap_attribute_value_assertion_content,
                Filter::LessOrEqual,
            )(content),
            7 => {
                let s = std::str::from_utf8(content)
                    .or(Err(Err::Error(LdapError::Decode("present attr desc not utf-8".into()))))?;
                Ok(([].as_ref(), Filter::Present(LdapString(Cow::Borrowed(s)))))
            }
            8 => map(
                parse_ldap_attribute_value_assertion_content,
                Filter::ApproxMatch,
            )(content),
            9 => map(
                parse_ldap_matching_rule_assertion_content,
                Filter::ExtensibleMatch,
            )(content),
            n => Err(Err::Error(LdapError::Decode(format!(
                "unsupported filter choice tag {}",
                n
            )))),
        }?;
        Ok((rem, filter))
    }
}

fn parse_ldap_substrings_filter_content(i: &[u8]) -> ParseResult<'_, SubstringFilter<'_>, LdapError> {
    let (i, filter_type) = LdapString::from_ber(i)?;
    let (i, substrings) =
        Sequence::from_ber_and_then(i, |inner| many1(complete(parse_ldap_substring))(inner))?;
    Ok((
        i,
        SubstringFilter {
            filter_type,
            substrings,
        },
    ))
}

fn parse_ldap_substring(bytes: &[u8]) -> ParseResult<'_, Substring<'_>, LdapError> {
    let (rem, any) = Any::from_ber(bytes).map_err(Err::convert)?;
    let b = AssertionValue(Cow::Borrowed(any.data));
    match any.tag().0 {
        0 => Ok((rem, Substring::Initial(b))),
        1 => Ok((rem, Substring::Any(b))),
        2 => Ok((rem, Substring::Final(b))),
        n => Err(Err::Error(LdapError::Decode(format!(
            "unsupported substring choice tag {}",
            n
        )))),
    }
}

fn parse_ldap_matching_rule_assertion_content(
    i: &[u8],
) -> ParseResult<'_, MatchingRuleAssertion<'_>, LdapError> {
    let (i, matching_rule) = OptTaggedParser::new(Class::ContextSpecific, Tag(1))
        .parse_ber(i, |_, content| {
            let s = std::str::from_utf8(content)
                .or(Err(Err::Error(LdapError::Decode("matchingRule not utf-8".into()))))?;
            Ok((&b""[..], LdapString(Cow::Borrowed(s))))
        })?;
    let (i, rule_type) = OptTaggedParser::new(Class::ContextSpecific, Tag(2))
        .parse_ber(i, |_, content| {
            let s = std::str::from_utf8(content)
                .or(Err(Err::Error(LdapError::Decode("matching rule type not utf-8".into()))))?;
            Ok((&b""[..], AttributeDescription(Cow::Borrowed(s))))
        })?;
    let (i, assertion_value) = TaggedParser::from_ber_and_then(Class::ContextSpecific, 3, i, |content| {
        Ok((&b""[..], AssertionValue(Cow::Borrowed(content))))
    })?;
    let (i, dn_attributes) =
        OptTaggedImplicit::<bool, asn1_rs::Error, 4>::from_ber(i).map_err(Err::convert)?;
    let dn_attributes = dn_attributes.map(|t| t.into_inner());
    Ok((
        i,
        MatchingRuleAssertion {
            matching_rule,
            rule_type,
            assertion_value,
            dn_attributes,
        },
    ))
}

impl AttributeValueAssertion<'_> {
    fn encode_into(&self, out: &mut Vec<u8>) {
        crate::der::push_octet_string(out, self.attribute_desc.0.as_bytes());
        crate::der::push_octet_string(out, &self.assertion_value);
    }
}

impl PartialAttribute<'_> {
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        crate::der::push_octet_string(&mut content, self.attr_type.0.as_bytes());
        let mut vals = Vec::new();
        for v in &self.attr_vals {
            crate::der::push_octet_string(&mut vals, &v.0);
        }
        let mut set = Vec::new();
        crate::der::push_tlv(&mut set, 0x31, &vals); // SET tag, constructed
        content.extend_from_slice(&set);
        let mut out = Vec::new();
        crate::der::push_tlv(&mut out, 0x30, &content);
        out
    }
}

impl Attribute<'_> {
    pub fn encode(&self) -> Vec<u8> {
        // Identical shape to PartialAttribute; AttributeList just requires
        // at least one value, enforced at decode time rather than encode.
        let as_partial = PartialAttribute {
            attr_type: self.attr_type.clone(),
            attr_vals: self.attr_vals.clone(),
        };
        as_partial.encode()
    }
}

impl Filter<'_> {
    /// Encode as the `[CONTEXT n]` CHOICE tag RFC 4511 §4.5.1 defines.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Filter::And(subs) => {
                let mut content = Vec::new();
                for s in subs {
                    content.extend_from_slice(&s.encode());
                }
                crate::der::push_tlv(&mut out, 0xa0, &content);
            }
            Filter::Or(subs) => {
                let mut content = Vec::new();
                for s in subs {
                    content.extend_from_slice(&s.encode());
                }
                crate::der::push_tlv(&mut out, 0xa1, &content);
            }
            Filter::Not(inner) => {
                crate::der::push_tlv(&mut out, 0xa2, &inner.encode());
            }
            Filter::EqualityMatch(ava) => {
                let mut content = Vec::new();
                ava.encode_into(&mut content);
                crate::der::push_tlv(&mut out, 0xa3, &content);
            }
            Filter::Substrings(s) => {
                let mut content = Vec::new();
                crate::der::push_octet_string(&mut content, s.filter_type.0.as_bytes());
                let mut subs = Vec::new();
                for sub in &s.substrings {
                    let (tag, v) = match sub {
                        Substring::Initial(v) => (0x80, v),
                        Substring::Any(v) => (0x81, v),
                        Substring::Final(v) => (0x82, v),
                    };
                    crate::der::push_tlv(&mut subs, tag, &v.0);
                }
                crate::der::push_tlv(&mut content, 0x30, &subs);
                crate::der::push_tlv(&mut out, 0xa4, &content);
            }
            Filter::GreaterOrEqual(ava) => {
                let mut content = Vec::new();
                ava.encode_into(&mut content);
                crate::der::push_tlv(&mut out, 0xa5, &content);
            }
            Filter::LessOrEqual(ava) => {
                let mut content = Vec::new();
                ava.encode_into(&mut content);
                crate::der::push_tlv(&mut out, 0xa6, &content);
            }
            Filter::Present(attr) => {
                out.push(0x87); // primitive, context 7
                crate::der::push_length(&mut out, attr.0.len());
                out.extend_from_slice(attr.0.as_bytes());
            }
            Filter::ApproxMatch(ava) => {
                let mut content = Vec::new();
                ava.encode_into(&mut content);
                crate::der::push_tlv(&mut out, 0xa8, &content);
            }
            Filter::ExtensibleMatch(mra) => {
                let mut content = Vec::new();
                if let Some(rule) = &mra.matching_rule {
                    content.push(0x81);
                    crate::der::push_length(&mut content, rule.0.len());
                    content.extend_from_slice(rule.0.as_bytes());
                }
                if let Some(rule_type) = &mra.rule_type {
                    content.push(0x82);
                    crate::der::push_length(&mut content, rule_type.0.len());
                    content.extend_from_slice(rule_type.0.as_bytes());
                }
                content.push(0x83);
                crate::der::push_length(&mut content, mra.assertion_value.0.len());
                content.extend_from_slice(&mra.assertion_value.0);
                if let Some(dn_attrs) = mra.dn_attributes {
                    content.push(0x84);
                    crate::der::push_length(&mut content, 1);
                    content.push(if dn_attrs { 0xff } else { 0x00 });
                }
                crate::der::push_tlv(&mut out, 0xa9, &content);
            }
        }
        out
    }
}

/// Escape a filter literal per RFC 4515 section 3: parentheses, asterisk,
/// backslash and NUL must be represented as `\` followed by two hex digits.
pub fn ldap_escape<'a, S: Into<Cow<'a, str>>>(lit: S) -> Cow<'a, str> {
    #[inline]
    fn needs_escape(c: u8) -> bool {
        c == b'\\' || c == b'*' || c == b'(' || c == b')' || c == 0
    }

    #[inline]
    fn xdigit(c: u8) -> u8 {
        c + if c < 10 { b'0' } else { b'a' - 10 }
    }

    let lit = lit.into();
    let mut output: Option<Vec<u8>> = None;
    for (i, &c) in lit.as_bytes().iter().enumerate() {
        if needs_escape(c) {
            let output = output.get_or_insert_with(|| {
                let mut v = Vec::with_capacity(lit.len() + 12);
                v.extend(lit[..i].as_bytes());
                v
            });
            output.push(b'\\');
            output.push(xdigit(c >> 4));
            output.push(xdigit(c & 0xF));
        } else if let Some(output) = output.as_mut() {
            output.push(c);
        }
    }
    match output {
        // Safety: only ASCII bytes were substituted for ASCII escape
        // sequences, and the source was valid UTF-8.
        Some(output) => Cow::Owned(unsafe { String::from_utf8_unchecked(output) }),
        None => lit,
    }
}

pub mod string {
    //! RFC 4515 string representation: parse into a [`super::Filter`], and
    //! format a [`super::Filter`] back into its string representation.
    use super::*;
    use nom::branch::alt;
    use nom::bytes::complete::{tag, take_while, take_while1};
    use nom::character::complete::{char, digit1};
    use nom::combinator::{opt, recognize, verify};
    use nom::multi::{many0 as nmany0, many1 as nmany1};
    use nom::sequence::{delimited, preceded};
    use nom::IResult;

    /// Parse a filter string (e.g. `"(&(objectClass=*)(cn=admin))"`) into an
    /// owned [`Filter`] tree. Values that contain RFC 4515 escapes are
    /// unescaped into owned byte buffers; everything else borrows from
    /// `input`.
    pub fn parse(input: &str) -> std::result::Result<Filter<'_>, ()> {
        match filtexpr(input.as_bytes()) {
            Ok((rem, f)) if rem.is_empty() => Ok(f),
            _ => Err(()),
        }
    }

    fn filtexpr(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        alt((filter, item))(i)
    }

    fn filter(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        delimited(char('('), filtercomp, char(')'))(i)
    }

    fn filtercomp(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        alt((and, or, not, item))(i)
    }

    fn filterlist(i: &[u8]) -> IResult<&[u8], Vec<Filter<'_>>> {
        nmany0(filter)(i)
    }

    fn and(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        let (i, _) = char('&')(i)?;
        let (i, subs) = filterlist(i)?;
        Ok((i, Filter::And(subs)))
    }

    fn or(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        let (i, _) = char('|')(i)?;
        let (i, subs) = filterlist(i)?;
        Ok((i, Filter::Or(subs)))
    }

    fn not(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        let (i, _) = char('!')(i)?;
        let (i, f) = filter(i)?;
        Ok((i, Filter::Not(Box::new(f))))
    }

    fn item(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        alt((eq, non_eq))(i)
    }

    fn is_value_char(c: u8) -> bool {
        c != 0 && c != b'(' && c != b')' && c != b'*' && c != b'\\'
    }

    // Unescapes `\XX` sequences as it goes; if none are present the result
    // borrows `i` directly, otherwise it owns a new buffer.
    fn unescaped(i: &[u8]) -> IResult<&[u8], Cow<'_, [u8]>> {
        let start = i;
        let mut pos = 0;
        let mut owned: Option<Vec<u8>> = None;
        loop {
            match i.get(pos) {
                Some(&c) if is_value_char(c) => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(c);
                    }
                    pos += 1;
                }
                Some(b'\\') => {
                    let hi = i.get(pos + 1).copied();
                    let lo = i.get(pos + 2).copied();
                    match (hi.and_then(hexval), lo.and_then(hexval)) {
                        (Some(hi), Some(lo)) => {
                            let buf = owned.get_or_insert_with(|| i[..pos].to_vec());
                            buf.push((hi << 4) | lo);
                            pos += 3;
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }
        let value = match owned {
            Some(v) => Cow::Owned(v),
            None => Cow::Borrowed(&start[..pos]),
        };
        Ok((&i[pos..], value))
    }

    fn hexval(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    }

    fn non_eq(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        let (i, attr) = attributedescription(i)?;
        let (i, op) = alt((tag(">="), tag("<="), tag("~=")))(i)?;
        let (i, value) = unescaped(i)?;
        let assertion = AttributeValueAssertion {
            attribute_desc: LdapString(Cow::Borrowed(attr)),
            assertion_value: value,
        };
        let f = match op {
            b">=" => Filter::GreaterOrEqual(assertion),
            b"<=" => Filter::LessOrEqual(assertion),
            _ => Filter::ApproxMatch(assertion),
        };
        Ok((i, f))
    }

    fn eq(i: &[u8]) -> IResult<&[u8], Filter<'_>> {
        let (i, attr) = attributedescription(i)?;
        let (i, _) = char('=')(i)?;
        let (i, initial) = unescaped(i)?;
        let (i, mid_final) = nmany0(preceded(char('*'), unescaped))(i)?;
        let f = if mid_final.is_empty() {
            Filter::EqualityMatch(AttributeValueAssertion {
                attribute_desc: LdapString(Cow::Borrowed(attr)),
                assertion_value: initial,
            })
        } else if initial.is_empty() && mid_final.len() == 1 && mid_final[0].is_empty() {
            Filter::Present(LdapString(Cow::Borrowed(attr)))
        } else {
            let mut substrings = Vec::new();
            if !initial.is_empty() {
                substrings.push(Substring::Initial(AssertionValue(initial)));
            }
            let n = mid_final.len();
            for (idx, chunk) in mid_final.into_iter().enumerate() {
                if chunk.is_empty() {
                    break;
                }
                substrings.push(if idx + 1 != n {
                    Substring::Any(AssertionValue(chunk))
                } else {
                    Substring::Final(AssertionValue(chunk))
                });
            }
            Filter::Substrings(SubstringFilter {
                filter_type: LdapString(Cow::Borrowed(attr)),
                substrings,
            })
        };
        Ok((i, f))
    }

    fn attributedescription(i: &[u8]) -> IResult<&[u8], &str> {
        let (i, bytes) = recognize(|i| {
            let (i, _) = attributetype(i)?;
            nmany0(preceded(char(';'), take_while1(is_alnum_hyphen)))(i)
        })(i)?;
        Ok((i, std::str::from_utf8(bytes).unwrap_or("")))
    }

    fn attributetype(i: &[u8]) -> IResult<&[u8], &[u8]> {
        alt((numericoid, descr))(i)
    }

    fn numericoid(i: &[u8]) -> IResult<&[u8], &[u8]> {
        recognize(|i| {
            let (i, _) = number(i)?;
            nmany0(preceded(char('.'), number))(i)
        })(i)
    }

    fn number(i: &[u8]) -> IResult<&[u8], &[u8]> {
        verify(digit1, |d: &[u8]| d.len() == 1 || d[0] != b'0')(i)
    }

    fn descr(i: &[u8]) -> IResult<&[u8], &[u8]> {
        recognize(|i| {
            let (i, _) = verify(nom::bytes::complete::take(1usize), |c: &[u8]| {
                c[0].is_ascii_alphabetic()
            })(i)?;
            take_while(is_alnum_hyphen)(i)
        })(i)
    }

    fn is_alnum_hyphen(c: u8) -> bool {
        c.is_ascii_alphanumeric() || c == b'-'
    }

    /// Render a [`Filter`] back to its RFC 4515 string representation.
    pub fn format(filter: &Filter<'_>) -> String {
        let mut out = String::new();
        format_into(filter, &mut out);
        out
    }

    fn format_value(v: &[u8], out: &mut String) {
        out.push_str(&ldap_escape(String::from_utf8_lossy(v)));
    }

    fn format_into(filter: &Filter<'_>, out: &mut String) {
        match filter {
            Filter::And(subs) => {
                out.push('(');
                out.push('&');
                for s in subs {
                    format_into(s, out);
                }
                out.push(')');
            }
            Filter::Or(subs) => {
                out.push('(');
                out.push('|');
                for s in subs {
                    format_into(s, out);
                }
                out.push(')');
            }
            Filter::Not(inner) => {
                out.push('(');
                out.push('!');
                format_into(inner, out);
                out.push(')');
            }
            Filter::EqualityMatch(ava) => {
                out.push('(');
                out.push_str(&ava.attribute_desc.0);
                out.push('=');
                format_value(&ava.assertion_value, out);
                out.push(')');
            }
            Filter::GreaterOrEqual(ava) => {
                out.push('(');
                out.push_str(&ava.attribute_desc.0);
                out.push_str(">=");
                format_value(&ava.assertion_value, out);
                out.push(')');
            }
            Filter::LessOrEqual(ava) => {
                out.push('(');
                out.push_str(&ava.attribute_desc.0);
                out.push_str("<=");
                format_value(&ava.assertion_value, out);
                out.push(')');
            }
            Filter::ApproxMatch(ava) => {
                out.push('(');
                out.push_str(&ava.attribute_desc.0);
                out.push_str("~=");
                format_value(&ava.assertion_value, out);
                out.push(')');
            }
            Filter::Present(attr) => {
                out.push('(');
                out.push_str(&attr.0);
                out.push_str("=*)");
            }
            Filter::Substrings(s) => {
                out.push('(');
                out.push_str(&s.filter_type.0);
                out.push('=');
                for sub in &s.substrings {
                    match sub {
                        Substring::Initial(v) => format_value(&v.0, out),
                        Substring::Any(v) => {
                            out.push('*');
                            format_value(&v.0, out);
                        }
                        Substring::Final(v) => {
                            out.push('*');
                            format_value(&v.0, out);
                        }
                    }
                }
                out.push('*');
                out.push(')');
            }
            Filter::ExtensibleMatch(mra) => {
                out.push('(');
                if let Some(attr) = &mra.rule_type {
                    out.push_str(&attr.0);
                }
                if mra.dn_attributes == Some(true) {
                    out.push_str(":dn");
                }
                if let Some(rule) = &mra.matching_rule {
                    out.push(':');
                    out.push_str(&rule.0);
                }
                out.push_str(":=");
                format_value(&mra.assertion_value.0, out);
                out.push(')');
            }
        }
    }
}
