//! Search filters: the tagged-variant tree described in `spec.md` §3 and
//! §4.2, with RFC 4515 textual parsing/serialization and RFC 4511 BER
//! encoding/decoding.
//!
//! Each operation (`parse`/`write`/`matches`) is a function over a flat
//! `Filter` enum — no inheritance, one tag per variant.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::char,
    combinator::{map, opt, peek},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

use lber::common::TagClass;
use lber::structure::{StructureTag, PL};
use lber::structures::{ASNTag, OctetString, Sequence, Set, Tag};

use crate::attribute::Attribute;
use crate::error::{CodecError, LdapError};

/// A search-filter expression. See RFC 4511 §4.5.1 and RFC 4515.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality { attr: String, value: Vec<u8> },
    Substring {
        attr: String,
        initial: Option<Vec<u8>>,
        any: Vec<Vec<u8>>,
        r#final: Option<Vec<u8>>,
    },
    GreaterOrEqual { attr: String, value: Vec<u8> },
    LessOrEqual { attr: String, value: Vec<u8> },
    Present { attr: String },
    Approx { attr: String, value: Vec<u8> },
    Extensible {
        match_type: Option<String>,
        rule: Option<String>,
        value: Vec<u8>,
        dn_attributes: bool,
    },
}

// BER context-specific tag numbers, RFC 4511 §4.5.1.
const TAG_AND: u64 = 0;
const TAG_OR: u64 = 1;
const TAG_NOT: u64 = 2;
const TAG_EQUALITY: u64 = 3;
const TAG_SUBSTRING: u64 = 4;
const TAG_GE: u64 = 5;
const TAG_LE: u64 = 6;
const TAG_PRESENT: u64 = 7;
const TAG_APPROX: u64 = 8;
const TAG_EXTENSIBLE: u64 = 9;

const SUBSTRING_INITIAL: u64 = 0;
const SUBSTRING_ANY: u64 = 1;
const SUBSTRING_FINAL: u64 = 2;

const EXT_MATCH_RULE: u64 = 1;
const EXT_TYPE: u64 = 2;
const EXT_VALUE: u64 = 3;
const EXT_DN_ATTRS: u64 = 4;

impl Filter {
    /// RFC 4526 absolute-true filter: an empty `And`. Matches every entry.
    pub fn absolute_true() -> Self {
        Filter::And(Vec::new())
    }

    /// RFC 4526 absolute-false filter: an empty `Or`. Matches no entry.
    pub fn absolute_false() -> Self {
        Filter::Or(Vec::new())
    }

    pub fn equality(attr: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Filter::Equality {
            attr: attr.into(),
            value: value.into(),
        }
    }

    pub fn present(attr: impl Into<String>) -> Self {
        Filter::Present { attr: attr.into() }
    }

    /// In-memory evaluation against a set of entry attributes.
    ///
    /// `Extensible` and `Approx` filters always return `false` here: both
    /// require server-side matching-rule or approximate-matching
    /// semantics this crate does not implement locally, per `spec.md`
    /// §4.2.
    pub fn matches(&self, entry: &[Attribute], strict_case: bool) -> bool {
        match self {
            Filter::And(children) => children.iter().all(|c| c.matches(entry, strict_case)),
            Filter::Or(children) => children.iter().any(|c| c.matches(entry, strict_case)),
            Filter::Not(child) => !child.matches(entry, strict_case),
            Filter::Equality { attr, value } => values_of(entry, attr)
                .iter()
                .any(|v| bytes_eq(v, value, strict_case)),
            Filter::Substring {
                attr,
                initial,
                any,
                r#final,
            } => values_of(entry, attr)
                .iter()
                .any(|v| substring_matches(v, initial, any, r#final, strict_case)),
            Filter::GreaterOrEqual { attr, value } => values_of(entry, attr)
                .iter()
                .any(|v| compare_bytes(v, value, strict_case) != std::cmp::Ordering::Less),
            Filter::LessOrEqual { attr, value } => values_of(entry, attr)
                .iter()
                .any(|v| compare_bytes(v, value, strict_case) != std::cmp::Ordering::Greater),
            Filter::Present { attr } => !values_of(entry, attr).is_empty(),
            Filter::Approx { .. } => false,
            Filter::Extensible { .. } => false,
        }
    }

    // ---- BER encode ----

    pub(crate) fn into_tag(self) -> Tag {
        match self {
            Filter::And(children) => set_of_filters(TAG_AND, children),
            Filter::Or(children) => set_of_filters(TAG_OR, children),
            Filter::Not(child) => Tag::ExplicitTag(lber::structures::ExplicitTag {
                class: TagClass::Context,
                id: TAG_NOT,
                inner: Box::new(child.into_tag()),
            }),
            Filter::Equality { attr, value } => ava_sequence(TAG_EQUALITY, attr, value),
            Filter::GreaterOrEqual { attr, value } => ava_sequence(TAG_GE, attr, value),
            Filter::LessOrEqual { attr, value } => ava_sequence(TAG_LE, attr, value),
            Filter::Approx { attr, value } => ava_sequence(TAG_APPROX, attr, value),
            Filter::Present { attr } => Tag::OctetString(OctetString {
                class: TagClass::Context,
                id: TAG_PRESENT,
                inner: attr.into_bytes(),
            }),
            Filter::Substring {
                attr,
                initial,
                any,
                r#final,
            } => {
                let mut pieces = Vec::new();
                if let Some(v) = initial {
                    pieces.push(Tag::OctetString(OctetString {
                        class: TagClass::Context,
                        id: SUBSTRING_INITIAL,
                        inner: v,
                    }));
                }
                for v in any {
                    pieces.push(Tag::OctetString(OctetString {
                        class: TagClass::Context,
                        id: SUBSTRING_ANY,
                        inner: v,
                    }));
                }
                if let Some(v) = r#final {
                    pieces.push(Tag::OctetString(OctetString {
                        class: TagClass::Context,
                        id: SUBSTRING_FINAL,
                        inner: v,
                    }));
                }
                Tag::Sequence(Sequence {
                    class: TagClass::Context,
                    id: TAG_SUBSTRING,
                    inner: vec![
                        Tag::OctetString(OctetString {
                            inner: attr.into_bytes(),
                            ..Default::default()
                        }),
                        Tag::Sequence(Sequence {
                            class: TagClass::Universal,
                            id: 16,
                            inner: pieces,
                        }),
                    ],
                })
            }
            Filter::Extensible {
                match_type,
                rule,
                value,
                dn_attributes,
            } => {
                let mut inner = Vec::new();
                if let Some(rule) = rule {
                    inner.push(Tag::OctetString(OctetString {
                        class: TagClass::Context,
                        id: EXT_MATCH_RULE,
                        inner: rule.into_bytes(),
                    }));
                }
                if let Some(match_type) = match_type {
                    inner.push(Tag::OctetString(OctetString {
                        class: TagClass::Context,
                        id: EXT_TYPE,
                        inner: match_type.into_bytes(),
                    }));
                }
                inner.push(Tag::OctetString(OctetString {
                    class: TagClass::Context,
                    id: EXT_VALUE,
                    inner: value,
                }));
                if dn_attributes {
                    inner.push(Tag::Boolean(lber::structures::Boolean {
                        class: TagClass::Context,
                        id: EXT_DN_ATTRS,
                        inner: true,
                    }));
                }
                Tag::Sequence(Sequence {
                    class: TagClass::Context,
                    id: TAG_EXTENSIBLE,
                    inner,
                })
            }
        }
    }

    // ---- BER decode ----

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        if tag.class != TagClass::Context {
            return Err(CodecError::UnexpectedStructure("Filter tag class".into()));
        }
        match (tag.id, tag.payload) {
            (id, PL::C(children)) if id == TAG_AND => Ok(Filter::And(
                children
                    .into_iter()
                    .map(Filter::try_from_structure)
                    .collect::<Result<_, _>>()?,
            )),
            (id, PL::C(children)) if id == TAG_OR => Ok(Filter::Or(
                children
                    .into_iter()
                    .map(Filter::try_from_structure)
                    .collect::<Result<_, _>>()?,
            )),
            (id, PL::C(mut children)) if id == TAG_NOT => {
                let child = children
                    .pop()
                    .ok_or_else(|| CodecError::UnexpectedStructure("Not filter".into()))?;
                Ok(Filter::Not(Box::new(Filter::try_from_structure(child)?)))
            }
            (id, PL::C(children)) if id == TAG_EQUALITY => {
                let (attr, value) = ava_from_children(children)?;
                Ok(Filter::Equality { attr, value })
            }
            (id, PL::C(children)) if id == TAG_GE => {
                let (attr, value) = ava_from_children(children)?;
                Ok(Filter::GreaterOrEqual { attr, value })
            }
            (id, PL::C(children)) if id == TAG_LE => {
                let (attr, value) = ava_from_children(children)?;
                Ok(Filter::LessOrEqual { attr, value })
            }
            (id, PL::C(children)) if id == TAG_APPROX => {
                let (attr, value) = ava_from_children(children)?;
                Ok(Filter::Approx { attr, value })
            }
            (id, PL::P(bytes)) if id == TAG_PRESENT => Ok(Filter::Present {
                attr: String::from_utf8(bytes)
                    .map_err(|_| CodecError::UnexpectedStructure("Present attr".into()))?,
            }),
            (id, PL::C(mut children)) if id == TAG_SUBSTRING => {
                if children.len() != 2 {
                    return Err(CodecError::UnexpectedStructure("Substring filter".into()));
                }
                let pieces_tag = children.pop().unwrap();
                let attr_tag = children.pop().unwrap();
                let attr = attr_tag
                    .expect_primitive()
                    .and_then(|b| String::from_utf8(b).ok())
                    .ok_or_else(|| CodecError::UnexpectedStructure("Substring attr".into()))?;
                let pieces = pieces_tag
                    .expect_constructed()
                    .ok_or_else(|| CodecError::UnexpectedStructure("Substring pieces".into()))?;
                let mut initial = None;
                let mut any = Vec::new();
                let mut r#final = None;
                for piece in pieces {
                    let id = piece.id;
                    let bytes = piece
                        .expect_primitive()
                        .ok_or_else(|| CodecError::UnexpectedStructure("Substring piece".into()))?;
                    match id {
                        SUBSTRING_INITIAL => initial = Some(bytes),
                        SUBSTRING_ANY => any.push(bytes),
                        SUBSTRING_FINAL => r#final = Some(bytes),
                        _ => return Err(CodecError::UnknownTag(format!("substring piece {id}"))),
                    }
                }
                Ok(Filter::Substring {
                    attr,
                    initial,
                    any,
                    r#final,
                })
            }
            (id, PL::C(children)) if id == TAG_EXTENSIBLE => {
                let mut match_type = None;
                let mut rule = None;
                let mut value = None;
                let mut dn_attributes = false;
                for field in children {
                    let id = field.id;
                    match id {
                        EXT_MATCH_RULE => {
                            rule = field.expect_primitive().and_then(|b| String::from_utf8(b).ok())
                        }
                        EXT_TYPE => {
                            match_type =
                                field.expect_primitive().and_then(|b| String::from_utf8(b).ok())
                        }
                        EXT_VALUE => value = field.expect_primitive(),
                        EXT_DN_ATTRS => {
                            dn_attributes = field
                                .expect_primitive()
                                .and_then(|b| b.first().copied())
                                .map(|b| b != 0)
                                .unwrap_or(false)
                        }
                        _ => return Err(CodecError::UnknownTag(format!("extensible field {id}"))),
                    }
                }
                Ok(Filter::Extensible {
                    match_type,
                    rule,
                    value: value
                        .ok_or_else(|| CodecError::UnexpectedStructure("Extensible value".into()))?,
                    dn_attributes,
                })
            }
            (id, _) => Err(CodecError::UnknownTag(format!("filter tag {id}"))),
        }
    }

    // ---- textual (RFC 4515) ----

    pub fn parse_text(input: &str) -> Result<Self, LdapError> {
        let wrapped = if input.starts_with('(') {
            input.to_string()
        } else {
            format!("({input})")
        };
        match parse_filter(&wrapped) {
            Ok((rest, filter)) if rest.is_empty() => Ok(filter),
            _ => Err(LdapError::InvalidInput(format!(
                "malformed filter string: {input}"
            ))),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }
}

fn values_of<'e>(entry: &'e [Attribute], attr: &str) -> Vec<&'e [u8]> {
    entry
        .iter()
        .filter(|a| a.r#type.eq_ignore_ascii_case(attr))
        .flat_map(|a| a.values.iter().map(|v| v.as_slice()))
        .collect()
}

fn bytes_eq(a: &[u8], b: &[u8], strict_case: bool) -> bool {
    if strict_case {
        a == b
    } else {
        lowercase(a) == lowercase(b)
    }
}

fn compare_bytes(a: &[u8], b: &[u8], strict_case: bool) -> std::cmp::Ordering {
    if strict_case {
        a.cmp(b)
    } else {
        lowercase(a).cmp(&lowercase(b))
    }
}

fn lowercase(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| b.to_ascii_lowercase()).collect()
}

fn substring_matches(
    value: &[u8],
    initial: &Option<Vec<u8>>,
    any: &[Vec<u8>],
    r#final: &Option<Vec<u8>>,
    strict_case: bool,
) -> bool {
    let hay = if strict_case {
        value.to_vec()
    } else {
        lowercase(value)
    };
    let norm = |v: &[u8]| if strict_case { v.to_vec() } else { lowercase(v) };

    let mut cursor = 0usize;
    if let Some(initial) = initial {
        let needle = norm(initial);
        if !hay[cursor..].starts_with(&needle[..]) {
            return false;
        }
        cursor += needle.len();
    }
    for piece in any {
        let needle = norm(piece);
        match find_subslice(&hay[cursor..], &needle) {
            Some(offset) => cursor += offset + needle.len(),
            None => return false,
        }
    }
    if let Some(r#final) = r#final {
        let needle = norm(r#final);
        if !hay[cursor..].ends_with(&needle[..]) {
            return false;
        }
    }
    true
}

fn find_subslice(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

fn set_of_filters(id: u64, children: Vec<Filter>) -> Tag {
    Tag::Set(Set {
        class: TagClass::Context,
        id,
        inner: children.into_iter().map(Filter::into_tag).collect(),
    })
}

fn ava_sequence(id: u64, attr: String, value: Vec<u8>) -> Tag {
    Tag::Sequence(Sequence {
        class: TagClass::Context,
        id,
        inner: vec![
            Tag::OctetString(OctetString {
                inner: attr.into_bytes(),
                ..Default::default()
            }),
            Tag::OctetString(OctetString {
                inner: value,
                ..Default::default()
            }),
        ],
    })
}

fn ava_from_children(mut children: Vec<StructureTag>) -> Result<(String, Vec<u8>), CodecError> {
    if children.len() != 2 {
        return Err(CodecError::UnexpectedStructure("AVA filter".into()));
    }
    let value_tag = children.pop().unwrap();
    let attr_tag = children.pop().unwrap();
    let value = value_tag
        .expect_primitive()
        .ok_or_else(|| CodecError::UnexpectedStructure("AVA value".into()))?;
    let attr = attr_tag
        .expect_primitive()
        .and_then(|b| String::from_utf8(b).ok())
        .ok_or_else(|| CodecError::UnexpectedStructure("AVA attr".into()))?;
    Ok((attr, value))
}

// ---- textual parser (nom, recursive descent per spec.md §4.2) ----

impl Filter {
    fn write_text(&self, out: &mut String) {
        match self {
            Filter::And(children) => {
                out.push_str("(&");
                for c in children {
                    c.write_text(out);
                }
                out.push(')');
            }
            Filter::Or(children) => {
                out.push_str("(|");
                for c in children {
                    c.write_text(out);
                }
                out.push(')');
            }
            Filter::Not(child) => {
                out.push_str("(!");
                child.write_text(out);
                out.push(')');
            }
            Filter::Equality { attr, value } => {
                out.push('(');
                out.push_str(attr);
                out.push('=');
                out.push_str(&escape_filter_value(value));
                out.push(')');
            }
            Filter::GreaterOrEqual { attr, value } => {
                out.push('(');
                out.push_str(attr);
                out.push_str(">=");
                out.push_str(&escape_filter_value(value));
                out.push(')');
            }
            Filter::LessOrEqual { attr, value } => {
                out.push('(');
                out.push_str(attr);
                out.push_str("<=");
                out.push_str(&escape_filter_value(value));
                out.push(')');
            }
            Filter::Approx { attr, value } => {
                out.push('(');
                out.push_str(attr);
                out.push_str("~=");
                out.push_str(&escape_filter_value(value));
                out.push(')');
            }
            Filter::Present { attr } => {
                out.push('(');
                out.push_str(attr);
                out.push_str("=*)");
            }
            Filter::Substring {
                attr,
                initial,
                any,
                r#final,
            } => {
                out.push('(');
                out.push_str(attr);
                out.push('=');
                if let Some(v) = initial {
                    out.push_str(&escape_filter_value(v));
                }
                out.push('*');
                for v in any {
                    out.push_str(&escape_filter_value(v));
                    out.push('*');
                }
                if let Some(v) = r#final {
                    out.push_str(&escape_filter_value(v));
                }
                out.push(')');
            }
            Filter::Extensible {
                match_type,
                rule,
                value,
                dn_attributes,
            } => {
                out.push('(');
                if let Some(t) = match_type {
                    out.push_str(t);
                }
                if *dn_attributes {
                    out.push_str(":dn");
                }
                if let Some(r) = rule {
                    out.push(':');
                    out.push_str(r);
                }
                out.push_str(":=");
                out.push_str(&escape_filter_value(value));
                out.push(')');
            }
        }
    }
}

fn escape_filter_value(value: &[u8]) -> String {
    let mut out = String::new();
    for &b in value {
        match b {
            b'(' | b')' | b'*' | b'\\' | 0 => out.push_str(&format!("\\{:02x}", b)),
            _ => out.push(b as char),
        }
    }
    out
}

fn unescape_filter_value(input: &str) -> Result<Vec<u8>, LdapError> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if i + 2 >= bytes.len() {
                return Err(LdapError::InvalidInput("truncated filter escape".into()));
            }
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .map_err(|_| LdapError::InvalidInput("bad filter escape".into()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| LdapError::InvalidInput("bad filter escape".into()))?;
            out.push(byte);
            i += 3;
        } else if bytes[i] == b'(' {
            return Err(LdapError::InvalidInput("unescaped '(' in filter value".into()));
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn attr_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '.')(input)
}

fn filter_value(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != ')' && c != '(')(input)
}

fn parse_filter(input: &str) -> IResult<&str, Filter> {
    delimited(char('('), parse_filter_body, char(')'))(input)
}

fn parse_filter_body(input: &str) -> IResult<&str, Filter> {
    alt((
        map(preceded(char('&'), many0(parse_filter)), Filter::And),
        map(preceded(char('|'), many0(parse_filter)), Filter::Or),
        map(preceded(char('!'), parse_filter), |f| {
            Filter::Not(Box::new(f))
        }),
        parse_rule_only_extensible,
        parse_attribute_expression,
    ))(input)
}

/// `:dn`? `:` matchingRule? `:=` value — no attribute description, used
/// when the caller wants to match purely by rule. `spec.md` §4.2 notes the
/// attribute token "may be empty when the expression starts with `:`". The
/// `dn` flag and the matching-rule name are independent: either, both, or
/// neither may be present.
fn parse_rule_only_extensible(input: &str) -> IResult<&str, Filter> {
    map(
        tuple((
            opt(tag(":dn")),
            opt(preceded(char(':'), attr_name)),
            tag(":="),
            filter_value,
        )),
        |(dn_tag, rule, _, value)| Filter::Extensible {
            match_type: None,
            rule: rule.map(|r| r.to_string()),
            value: unescape_or_empty(value),
            dn_attributes: dn_tag.is_some(),
        },
    )(input)
}

fn parse_attribute_expression(input: &str) -> IResult<&str, Filter> {
    let (input, attr) = attr_name(input)?;
    alt((
        map(terminated(tag("=*"), peek(char(')'))), |_| Filter::Present {
            attr: attr.to_string(),
        }),
        map(preceded(tag(">="), filter_value), |v| {
            Filter::GreaterOrEqual {
                attr: attr.to_string(),
                value: unescape_or_empty(v),
            }
        }),
        map(preceded(tag("<="), filter_value), |v| Filter::LessOrEqual {
            attr: attr.to_string(),
            value: unescape_or_empty(v),
        }),
        map(preceded(tag("~="), filter_value), |v| Filter::Approx {
            attr: attr.to_string(),
            value: unescape_or_empty(v),
        }),
        map(preceded(char('='), filter_value), move |v| {
            parse_equality_or_substring(&attr, v)
        }),
        map(
            tuple((
                opt(tag(":dn")),
                opt(preceded(char(':'), attr_name)),
                tag(":="),
                filter_value,
            )),
            move |(dn_tag, rule, _, v)| Filter::Extensible {
                match_type: Some(attr.to_string()),
                rule: rule.map(|r| r.to_string()),
                value: unescape_or_empty(v),
                dn_attributes: dn_tag.is_some(),
            },
        ),
    ))(input)
}

fn unescape_or_empty(v: &str) -> Vec<u8> {
    unescape_filter_value(v).unwrap_or_default()
}

fn parse_equality_or_substring(attr: &str, value: &str) -> Filter {
    if !value.contains('*') {
        return Filter::Equality {
            attr: attr.to_string(),
            value: unescape_or_empty(value),
        };
    }
    let mut parts: Vec<&str> = value.split('*').collect();
    let leading_star = value.starts_with('*');
    let trailing_star = value.ends_with('*');
    let initial = if !leading_star && !parts.is_empty() {
        let p = parts.remove(0);
        if p.is_empty() { None } else { Some(unescape_or_empty(p)) }
    } else {
        if !parts.is_empty() {
            parts.remove(0);
        }
        None
    };
    let r#final = if !trailing_star && !parts.is_empty() {
        let p = parts.pop().unwrap();
        if p.is_empty() { None } else { Some(unescape_or_empty(p)) }
    } else {
        if !parts.is_empty() {
            parts.pop();
        }
        None
    };
    let any = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(unescape_or_empty)
        .collect();
    Filter::Substring {
        attr: attr.to_string(),
        initial,
        any,
        r#final,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equality() {
        let filter = Filter::parse_text("(cn=Jim)").unwrap();
        assert_eq!(filter, Filter::equality("cn", "Jim".as_bytes()));
    }

    #[test]
    fn parses_and_or_not() {
        let filter = Filter::parse_text("(&(cn=Jim*)(!(uid=2)))").unwrap();
        match filter {
            Filter::And(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[0], Filter::Substring { .. }));
                assert!(matches!(children[1], Filter::Not(_)));
            }
            _ => panic!("expected And"),
        }
    }

    #[test]
    fn bare_expression_is_auto_wrapped() {
        let a = Filter::parse_text("cn=Jim").unwrap();
        let b = Filter::parse_text("(cn=Jim)").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn textual_round_trip_is_a_fixed_point() {
        let original = "(&(cn=Jim*)(!(uid=2)))";
        let filter = Filter::parse_text(original).unwrap();
        let serialized = filter.to_text();
        let reparsed = Filter::parse_text(&serialized).unwrap();
        assert_eq!(filter, reparsed);
    }

    #[test]
    fn ber_round_trip() {
        let filter = Filter::Or(vec![
            Filter::present("cn"),
            Filter::equality("cn", "name".as_bytes()),
        ]);
        let structure = filter.clone().into_tag().into_structure();
        let decoded = Filter::try_from_structure(structure).unwrap();
        assert_eq!(filter, decoded);
    }

    #[test]
    fn absolute_true_matches_every_entry() {
        let entry = vec![Attribute::with_text("cn", "x")];
        assert!(Filter::absolute_true().matches(&entry, true));
    }

    #[test]
    fn absolute_false_matches_no_entry() {
        let entry = vec![Attribute::with_text("cn", "x")];
        assert!(!Filter::absolute_false().matches(&entry, true));
    }

    #[test]
    fn substring_matches_initial_any_final() {
        let filter = Filter::parse_text("(cn=J*i*m)").unwrap();
        let matching = vec![Attribute::with_text("cn", "Jasmine Tim")];
        assert!(filter.matches(&matching, true));
        let non_matching = vec![Attribute::with_text("cn", "Tim")];
        assert!(!filter.matches(&non_matching, true));
    }

    #[test]
    fn case_insensitive_matching_lowercases_both_sides() {
        let filter = Filter::equality("cn", "JIM".as_bytes());
        let entry = vec![Attribute::with_text("cn", "jim")];
        assert!(filter.matches(&entry, false));
        assert!(!filter.matches(&entry, true));
    }

    #[test]
    fn extensible_and_approx_always_evaluate_false_locally() {
        let entry = vec![Attribute::with_text("cn", "jim")];
        let ext = Filter::Extensible {
            match_type: Some("cn".into()),
            rule: None,
            value: b"jim".to_vec(),
            dn_attributes: false,
        };
        assert!(!ext.matches(&entry, true));
    }

    #[test]
    fn leading_wildcard_substring_parses_as_substring_not_present() {
        let filter = Filter::parse_text("(cn=*Jim)").unwrap();
        assert_eq!(
            filter,
            Filter::Substring {
                attr: "cn".to_string(),
                initial: None,
                any: Vec::new(),
                r#final: Some(b"Jim".to_vec()),
            }
        );
    }

    #[test]
    fn bare_present_filter_still_parses() {
        let filter = Filter::parse_text("(cn=*)").unwrap();
        assert_eq!(filter, Filter::present("cn"));
    }

    #[test]
    fn extensible_dn_flag_is_independent_of_matching_rule() {
        assert_eq!(
            Filter::parse_text("(cn:dn:=value)").unwrap(),
            Filter::Extensible {
                match_type: Some("cn".to_string()),
                rule: None,
                value: b"value".to_vec(),
                dn_attributes: true,
            }
        );
        assert_eq!(
            Filter::parse_text("(cn:dn:2.4.8.10:=value)").unwrap(),
            Filter::Extensible {
                match_type: Some("cn".to_string()),
                rule: Some("2.4.8.10".to_string()),
                value: b"value".to_vec(),
                dn_attributes: true,
            }
        );
        assert_eq!(
            Filter::parse_text("(:dn:=value)").unwrap(),
            Filter::Extensible {
                match_type: None,
                rule: None,
                value: b"value".to_vec(),
                dn_attributes: true,
            }
        );
        assert_eq!(
            Filter::parse_text("(:dn:2.4.8.10:=value)").unwrap(),
            Filter::Extensible {
                match_type: None,
                rule: Some("2.4.8.10".to_string()),
                value: b"value".to_vec(),
                dn_attributes: true,
            }
        );
    }
}
