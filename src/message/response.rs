//! Response-operation payloads. See `spec.md` §4.3.

use lber::common::TagClass;
use lber::structure::StructureTag;
use lber::structures::{ASNTag, OctetString, Sequence, Tag};

use crate::attribute::PartialAttribute;
use crate::error::CodecError;

use super::{expect_constructed, LdapResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindResponse {
    pub result: LdapResult,
    pub server_sasl_creds: Option<Vec<u8>>,
}

impl BindResponse {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let mut tag = self.result.into_tag(app_id);
        if let (Some(creds), Tag::Sequence(seq)) = (self.server_sasl_creds, &mut tag) {
            seq.inner.push(Tag::OctetString(OctetString {
                class: TagClass::Context,
                id: 7,
                inner: creds,
            }));
        }
        tag
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        let server_sasl_creds = if let Some(last) = children.last() {
            if last.class == TagClass::Context && last.id == 7 {
                children.pop().and_then(|t| t.expect_primitive())
            } else {
                None
            }
        } else {
            None
        };
        let result = LdapResult::try_from_children(children)?;
        Ok(BindResponse { result, server_sasl_creds })
    }
}

/// A single search-result entry: the object's DN plus its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub object_name: String,
    pub attributes: Vec<PartialAttribute>,
}

impl SearchResultEntry {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: vec![
                Tag::OctetString(OctetString {
                    inner: self.object_name.into_bytes(),
                    ..Default::default()
                }),
                Tag::Sequence(Sequence {
                    class: TagClass::Universal,
                    id: 16,
                    inner: self
                        .attributes
                        .into_iter()
                        .map(PartialAttribute::into_tag)
                        .collect(),
                }),
            ],
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        if children.len() != 2 {
            return Err(CodecError::UnexpectedStructure("SearchResultEntry".into()));
        }
        let attrs_tag = children.pop().unwrap();
        let name_tag = children.pop().unwrap();
        let object_name = name_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("SearchResultEntry objectName".into()))?;
        let attributes = expect_constructed(attrs_tag)?
            .into_iter()
            .map(attribute_from_structure)
            .collect::<Result<_, _>>()?;
        Ok(SearchResultEntry { object_name, attributes })
    }
}

fn attribute_from_structure(tag: StructureTag) -> Result<PartialAttribute, CodecError> {
    let mut children = expect_constructed(tag)?;
    if children.len() != 2 {
        return Err(CodecError::UnexpectedStructure("PartialAttribute".into()));
    }
    let values_tag = children.pop().unwrap();
    let type_tag = children.pop().unwrap();
    let r#type = type_tag
        .expect_primitive()
        .and_then(|b| String::from_utf8(b).ok())
        .ok_or_else(|| CodecError::UnexpectedStructure("PartialAttribute type".into()))?;
    let values = expect_constructed(values_tag)?
        .into_iter()
        .map(|t| {
            t.expect_primitive()
                .ok_or_else(|| CodecError::UnexpectedStructure("PartialAttribute value".into()))
        })
        .collect::<Result<_, _>>()?;
    Ok(PartialAttribute { r#type, values })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultReference {
    pub uris: Vec<String>,
}

impl SearchResultReference {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: self
                .uris
                .into_iter()
                .map(|uri| {
                    Tag::OctetString(OctetString {
                        inner: uri.into_bytes(),
                        ..Default::default()
                    })
                })
                .collect(),
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let children = expect_constructed(tag)?;
        let uris = children
            .into_iter()
            .map(|t| {
                t.expect_primitive()
                    .and_then(|b| String::from_utf8(b).ok())
                    .ok_or_else(|| CodecError::UnexpectedStructure("SearchResultReference uri".into()))
            })
            .collect::<Result<_, _>>()?;
        Ok(SearchResultReference { uris })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedResponse {
    pub result: LdapResult,
    pub response_name: Option<String>,
    pub response_value: Option<Vec<u8>>,
}

impl ExtendedResponse {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let mut tag = self.result.into_tag(app_id);
        if let Tag::Sequence(seq) = &mut tag {
            if let Some(name) = self.response_name {
                seq.inner.push(Tag::OctetString(OctetString {
                    class: TagClass::Context,
                    id: 10,
                    inner: name.into_bytes(),
                }));
            }
            if let Some(value) = self.response_value {
                seq.inner.push(Tag::OctetString(OctetString {
                    class: TagClass::Context,
                    id: 11,
                    inner: value,
                }));
            }
        }
        tag
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        let mut response_name = None;
        let mut response_value = None;
        while let Some(last) = children.last() {
            match (last.class, last.id) {
                (TagClass::Context, 10) => {
                    response_name = children
                        .pop()
                        .and_then(|t| t.expect_primitive())
                        .and_then(|b| String::from_utf8(b).ok());
                }
                (TagClass::Context, 11) => {
                    response_value = children.pop().and_then(|t| t.expect_primitive());
                }
                _ => break,
            }
        }
        let result = LdapResult::try_from_children(children)?;
        Ok(ExtendedResponse { result, response_name, response_value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateResponse {
    pub response_name: Option<String>,
    pub response_value: Option<Vec<u8>>,
}

impl IntermediateResponse {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let mut inner = Vec::new();
        if let Some(name) = self.response_name {
            inner.push(Tag::OctetString(OctetString {
                class: TagClass::Context,
                id: 0,
                inner: name.into_bytes(),
            }));
        }
        if let Some(value) = self.response_value {
            inner.push(Tag::OctetString(OctetString {
                class: TagClass::Context,
                id: 1,
                inner: value,
            }));
        }
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner,
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let children = expect_constructed(tag)?;
        let mut response_name = None;
        let mut response_value = None;
        for child in children {
            match (child.class, child.id) {
                (TagClass::Context, 0) => {
                    response_name = child
                        .expect_primitive()
                        .and_then(|b| String::from_utf8(b).ok());
                }
                (TagClass::Context, 1) => {
                    response_value = child.expect_primitive();
                }
                _ => {}
            }
        }
        Ok(IntermediateResponse { response_name, response_value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ResultCode;

    #[test]
    fn bind_response_without_sasl_creds_round_trips() {
        let response = BindResponse {
            result: LdapResult::success(),
            server_sasl_creds: None,
        };
        let structure = response.clone().into_tag(1).into_structure();
        let decoded = BindResponse::try_from_structure(structure).unwrap();
        assert_eq!(response, decoded);
    }

    #[test]
    fn bind_response_with_sasl_creds_round_trips() {
        let response = BindResponse {
            result: LdapResult::success(),
            server_sasl_creds: Some(b"creds".to_vec()),
        };
        let structure = response.clone().into_tag(1).into_structure();
        let decoded = BindResponse::try_from_structure(structure).unwrap();
        assert_eq!(response, decoded);
    }

    #[test]
    fn search_result_entry_round_trips() {
        let entry = SearchResultEntry {
            object_name: "cn=Jim,dc=example,dc=com".into(),
            attributes: vec![PartialAttribute::with_text("cn", "Jim")],
        };
        let structure = entry.clone().into_tag(4).into_structure();
        let decoded = SearchResultEntry::try_from_structure(structure).unwrap();
        assert_eq!(entry, decoded);
    }

    #[test]
    fn search_result_reference_round_trips() {
        let reference = SearchResultReference {
            uris: vec!["ldap://other.example.com/dc=example,dc=com".into()],
        };
        let structure = reference.clone().into_tag(19).into_structure();
        let decoded = SearchResultReference::try_from_structure(structure).unwrap();
        assert_eq!(reference, decoded);
    }

    #[test]
    fn extended_response_round_trips_with_name_and_value() {
        let response = ExtendedResponse {
            result: LdapResult {
                result_code: ResultCode::Success,
                matched_dn: String::new(),
                diagnostic_message: String::new(),
                referral: Vec::new(),
            },
            response_name: Some("1.3.6.1.4.1.1466.20037".into()),
            response_value: Some(b"ok".to_vec()),
        };
        let structure = response.clone().into_tag(24).into_structure();
        let decoded = ExtendedResponse::try_from_structure(structure).unwrap();
        assert_eq!(response, decoded);
    }

    #[test]
    fn intermediate_response_round_trips() {
        let response = IntermediateResponse {
            response_name: Some("1.2.3".into()),
            response_value: None,
        };
        let structure = response.clone().into_tag(25).into_structure();
        let decoded = IntermediateResponse::try_from_structure(structure).unwrap();
        assert_eq!(response, decoded);
    }
}
