//! Entry attributes: a type name paired with zero or more values.
//!
//! Values are stored as raw bytes on decode; textual access is a
//! best-effort UTF-8 conversion requested by the caller, never assumed.
//! On encode every value becomes a BER `OCTET STRING`, matching
//! `spec.md` §3's invariant that the textual/binary choice is a
//! per-value presentation concern, not a wire concern.

use lber::common::TagClass;
use lber::structures::{OctetString, Sequence, Tag};

/// A fully-valued attribute, as carried in `AddRequest` and
/// `SearchResultEntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub r#type: String,
    pub values: Vec<Vec<u8>>,
}

impl Attribute {
    pub fn new(r#type: impl Into<String>, values: Vec<Vec<u8>>) -> Self {
        Self {
            r#type: r#type.into(),
            values,
        }
    }

    /// Convenience constructor for a single textual value.
    pub fn with_text(r#type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(r#type, vec![value.into().into_bytes()])
    }

    /// Returns the attribute's values as UTF-8 text, lossily, for display
    /// purposes. Callers needing exact bytes should read `values` directly.
    pub fn values_as_text(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .collect()
    }

    pub(crate) fn into_tag(self) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Universal,
            id: 16,
            inner: vec![
                Tag::OctetString(OctetString {
                    inner: self.r#type.into_bytes(),
                    ..Default::default()
                }),
                Tag::Set(lber::structures::Set {
                    inner: self
                        .values
                        .into_iter()
                        .map(|v| {
                            Tag::OctetString(OctetString {
                                inner: v,
                                ..Default::default()
                            })
                        })
                        .collect(),
                    ..Default::default()
                }),
            ],
        })
    }
}

/// An attribute value specification without a required multiplicity, used
/// by `Modify` and search-entry decode where a bare type/value-set pair
/// recurs without the `Attribute` name's implications of completeness.
pub type PartialAttribute = Attribute;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_constructor_round_trips() {
        let attr = Attribute::with_text("cn", "Jim");
        assert_eq!(attr.values_as_text(), vec!["Jim".to_string()]);
    }

    #[test]
    fn multi_valued_attribute_keeps_all_values() {
        let attr = Attribute::new("objectClass", vec![b"top".to_vec(), b"person".to_vec()]);
        assert_eq!(attr.values.len(), 2);
    }
}
