//! Request/response controls (RFC 4511 §4.1.11), plus the typed
//! Paged-Results control (RFC 2696).

use lber::common::TagClass;
use lber::parse::Parser;
use lber::structure::StructureTag;
use lber::structures::{ASNTag, Boolean, Integer, OctetString, Sequence, Tag};
use lber::universal::Types;
use lber::{Consumer, ConsumerState, Input, Move};

use crate::error::CodecError;

/// The OID of the Paged-Results control, RFC 2696.
pub const PAGED_RESULTS_OID: &str = "1.2.840.113556.1.4.319";

/// A generic request or response control: an OID, a criticality flag, and
/// an opaque value whose structure is defined by the OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub oid: String,
    pub criticality: bool,
    pub value: Option<Vec<u8>>,
}

impl Control {
    pub fn new(oid: impl Into<String>, criticality: bool, value: Option<Vec<u8>>) -> Self {
        Self {
            oid: oid.into(),
            criticality,
            value,
        }
    }

    pub(crate) fn into_tag(self) -> Tag {
        let mut inner = vec![Tag::OctetString(OctetString {
            inner: self.oid.into_bytes(),
            ..Default::default()
        })];
        if self.criticality {
            inner.push(Tag::Boolean(Boolean {
                inner: true,
                ..Default::default()
            }));
        }
        if let Some(value) = self.value {
            inner.push(Tag::OctetString(OctetString {
                inner: value,
                ..Default::default()
            }));
        }
        Tag::Sequence(Sequence {
            class: TagClass::Universal,
            id: 16,
            inner,
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let inner = tag
            .match_id(Types::Sequence as u64)
            .and_then(|t| t.expect_constructed())
            .ok_or_else(|| CodecError::UnexpectedStructure("Control".into()))?;

        let mut oid = None;
        let mut criticality = false;
        let mut value = None;
        for field in inner {
            match field.id {
                id if id == Types::OctetString as u64 && oid.is_none() => {
                    let bytes = field
                        .expect_primitive()
                        .ok_or_else(|| CodecError::UnexpectedStructure("Control oid".into()))?;
                    oid = Some(
                        String::from_utf8(bytes)
                            .map_err(|_| CodecError::UnexpectedStructure("Control oid".into()))?,
                    );
                }
                id if id == Types::Boolean as u64 => {
                    let bytes = field.expect_primitive().unwrap_or_default();
                    criticality = bytes.first().map(|b| *b != 0).unwrap_or(false);
                }
                id if id == Types::OctetString as u64 => {
                    value = field.expect_primitive();
                }
                _ => {}
            }
        }

        Ok(Control {
            oid: oid.ok_or_else(|| CodecError::UnexpectedStructure("Control oid".into()))?,
            criticality,
            value,
        })
    }
}

/// The typed value of a Paged-Results request or response control:
/// `realSearchControlValue ::= SEQUENCE { size INTEGER, cookie OCTET STRING }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedResultsValue {
    /// On a request, the page size the client wants. On a response, the
    /// number of entries the server estimates remain (commonly 0).
    pub size: u32,
    pub cookie: Vec<u8>,
}

impl PagedResultsValue {
    pub fn request(size: u32) -> Self {
        Self {
            size,
            cookie: Vec::new(),
        }
    }

    pub fn into_control(self, criticality: bool) -> Control {
        Control::new(PAGED_RESULTS_OID, criticality, Some(self.encode()))
    }

    fn encode(self) -> Vec<u8> {
        let tag = Tag::Sequence(Sequence {
            class: TagClass::Universal,
            id: 16,
            inner: vec![
                Tag::Integer(Integer {
                    inner: self.size as i64,
                    ..Default::default()
                }),
                Tag::OctetString(OctetString {
                    inner: self.cookie,
                    ..Default::default()
                }),
            ],
        });
        let mut buf = Vec::new();
        lber::write::encode_into(&mut buf, tag.into_structure()).expect("encoding in-memory buffer cannot fail");
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut parser = Parser::new();
        let (consumed, msg) = match *parser.handle(Input::Element(bytes)) {
            ConsumerState::Done(ref mv, ref msg) => (mv, msg.clone()),
            _ => return Err(CodecError::UnexpectedStructure("PagedResultsValue".into())),
        };
        if !matches!(consumed, Move::Consume(_)) {
            return Err(CodecError::UnexpectedStructure("PagedResultsValue".into()));
        }

        let mut inner = msg
            .match_id(Types::Sequence as u64)
            .and_then(|t| t.expect_constructed())
            .ok_or_else(|| CodecError::UnexpectedStructure("PagedResultsValue".into()))?;
        if inner.len() != 2 {
            return Err(CodecError::UnexpectedStructure("PagedResultsValue".into()));
        }
        let cookie_tag = inner.pop().unwrap();
        let size_tag = inner.pop().unwrap();

        let size = size_tag
            .match_id(Types::Integer as u64)
            .and_then(|t| t.expect_primitive())
            .and_then(|bytes| crate::message::ber_integer_to_i64(bytes))
            .ok_or_else(|| CodecError::UnexpectedStructure("PagedResultsValue size".into()))?
            as u32;
        let cookie = cookie_tag
            .match_id(Types::OctetString as u64)
            .and_then(|t| t.expect_primitive())
            .ok_or_else(|| CodecError::UnexpectedStructure("PagedResultsValue cookie".into()))?;

        Ok(PagedResultsValue { size, cookie })
    }

    /// A PagedResults response with an empty cookie signals the server has
    /// exhausted the result set. See `spec.md` §4.5.7.
    pub fn is_final_page(&self) -> bool {
        self.cookie.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_results_value_round_trips() {
        let value = PagedResultsValue {
            size: 100,
            cookie: b"abc".to_vec(),
        };
        let encoded = value.clone().encode();
        let decoded = PagedResultsValue::decode(&encoded).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn empty_cookie_is_final_page() {
        let value = PagedResultsValue::request(100);
        assert!(value.is_final_page());
    }

    #[test]
    fn control_without_value_round_trips() {
        let control = Control::new("1.2.3.4", true, None);
        let structure = control.clone().into_tag().into_structure();
        let decoded = Control::try_from_structure(structure).unwrap();
        assert_eq!(control, decoded);
    }
}
