//! Request-operation payloads. See `spec.md` §4.3.

use lber::common::TagClass;
use lber::structure::{StructureTag, PL};
use lber::structures::{ASNTag, Boolean, Enumerated, Integer, OctetString, Sequence, Tag};
use lber::universal::Types;

use crate::attribute::Attribute;
use crate::change::Change;
use crate::error::CodecError;
use crate::filter::Filter;

use super::expect_constructed;

/// `AuthenticationChoice`: simple bind carries a password; SASL bind
/// carries a mechanism name and optional credentials. `spec.md` §4.3
/// requires the password be redacted from any log output — `Debug` is
/// intentionally not derived verbatim for the `Simple` variant's payload;
/// callers that need to inspect it do so explicitly.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Simple(String),
    Sasl { mechanism: String, credentials: Option<Vec<u8>> },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Simple(_) => write!(f, "Simple(<redacted>)"),
            Credentials::Sasl { mechanism, .. } => {
                write!(f, "Sasl {{ mechanism: {mechanism:?}, credentials: <redacted> }}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub version: u8,
    pub name: String,
    pub credentials: Credentials,
}

impl BindRequest {
    pub fn simple(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            version: 3,
            name: name.into(),
            credentials: Credentials::Simple(password.into()),
        }
    }

    pub fn sasl(name: impl Into<String>, mechanism: impl Into<String>, credentials: Option<Vec<u8>>) -> Self {
        Self {
            version: 3,
            name: name.into(),
            credentials: Credentials::Sasl {
                mechanism: mechanism.into(),
                credentials,
            },
        }
    }

    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let auth = match self.credentials {
            Credentials::Simple(password) => Tag::OctetString(OctetString {
                class: TagClass::Context,
                id: 0,
                inner: password.into_bytes(),
            }),
            Credentials::Sasl { mechanism, credentials } => {
                let mut inner = vec![Tag::OctetString(OctetString {
                    inner: mechanism.into_bytes(),
                    ..Default::default()
                })];
                if let Some(creds) = credentials {
                    inner.push(Tag::OctetString(OctetString {
                        inner: creds,
                        ..Default::default()
                    }));
                }
                Tag::Sequence(Sequence {
                    class: TagClass::Context,
                    id: 3,
                    inner,
                })
            }
        };
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: vec![
                Tag::Integer(Integer {
                    inner: self.version as i64,
                    ..Default::default()
                }),
                Tag::OctetString(OctetString {
                    inner: self.name.into_bytes(),
                    ..Default::default()
                }),
                auth,
            ],
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        if children.len() != 3 {
            return Err(CodecError::UnexpectedStructure("BindRequest".into()));
        }
        let auth_tag = children.pop().unwrap();
        let name_tag = children.pop().unwrap();
        let version_tag = children.pop().unwrap();

        let version = version_tag
            .match_id(Types::Integer as u64)
            .and_then(|t| t.expect_primitive())
            .and_then(super::ber_integer_to_i64)
            .map(|v| v as u8)
            .ok_or_else(|| CodecError::UnexpectedStructure("BindRequest version".into()))?;
        let name = name_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("BindRequest name".into()))?;

        let credentials = match (auth_tag.class, auth_tag.id, auth_tag.payload) {
            (TagClass::Context, 0, PL::P(bytes)) => {
                Credentials::Simple(String::from_utf8(bytes).unwrap_or_default())
            }
            (TagClass::Context, 3, PL::C(mut inner)) => {
                let credentials = if inner.len() == 2 {
                    inner.pop().and_then(|t| t.expect_primitive())
                } else {
                    None
                };
                let mechanism = inner
                    .pop()
                    .and_then(|t| t.expect_primitive())
                    .and_then(|b| String::from_utf8(b).ok())
                    .ok_or_else(|| CodecError::UnexpectedStructure("SaslCredentials mechanism".into()))?;
                Credentials::Sasl { mechanism, credentials }
            }
            _ => return Err(CodecError::UnexpectedStructure("BindRequest auth choice".into())),
        };

        Ok(BindRequest { version, name, credentials })
    }
}

/// Search scope, RFC 4511 §4.5.1. `Children` is the Microsoft extension
/// noted in `spec.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Base = 0,
    OneLevel = 1,
    Subtree = 2,
    Children = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerefAliases {
    Never = 0,
    Search = 1,
    Find = 2,
    Always = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_object: String,
    pub scope: SearchScope,
    pub deref_aliases: DerefAliases,
    pub size_limit: u32,
    pub time_limit: u32,
    pub types_only: bool,
    pub filter: Filter,
    pub attributes: Vec<String>,
}

impl SearchRequest {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: vec![
                Tag::OctetString(OctetString {
                    inner: self.base_object.into_bytes(),
                    ..Default::default()
                }),
                Tag::Enumerated(Enumerated {
                    inner: self.scope as i64,
                    ..Default::default()
                }),
                Tag::Enumerated(Enumerated {
                    inner: self.deref_aliases as i64,
                    ..Default::default()
                }),
                Tag::Integer(Integer {
                    inner: self.size_limit as i64,
                    ..Default::default()
                }),
                Tag::Integer(Integer {
                    inner: self.time_limit as i64,
                    ..Default::default()
                }),
                Tag::Boolean(Boolean {
                    inner: self.types_only,
                    ..Default::default()
                }),
                self.filter.into_tag(),
                Tag::Sequence(Sequence {
                    class: TagClass::Universal,
                    id: 16,
                    inner: self
                        .attributes
                        .into_iter()
                        .map(|a| {
                            Tag::OctetString(OctetString {
                                inner: a.into_bytes(),
                                ..Default::default()
                            })
                        })
                        .collect(),
                }),
            ],
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        if children.len() != 8 {
            return Err(CodecError::UnexpectedStructure("SearchRequest".into()));
        }
        let attrs_tag = children.pop().unwrap();
        let filter_tag = children.pop().unwrap();
        let types_only_tag = children.pop().unwrap();
        let time_limit_tag = children.pop().unwrap();
        let size_limit_tag = children.pop().unwrap();
        let deref_tag = children.pop().unwrap();
        let scope_tag = children.pop().unwrap();
        let base_tag = children.pop().unwrap();

        let base_object = base_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("SearchRequest base".into()))?;
        let scope = match int_from(scope_tag)? {
            0 => SearchScope::Base,
            1 => SearchScope::OneLevel,
            2 => SearchScope::Subtree,
            3 => SearchScope::Children,
            other => return Err(CodecError::UnknownTag(format!("search scope {other}"))),
        };
        let deref_aliases = match int_from(deref_tag)? {
            0 => DerefAliases::Never,
            1 => DerefAliases::Search,
            2 => DerefAliases::Find,
            3 => DerefAliases::Always,
            other => return Err(CodecError::UnknownTag(format!("deref aliases {other}"))),
        };
        let size_limit = int_from(size_limit_tag)? as u32;
        let time_limit = int_from(time_limit_tag)? as u32;
        let types_only = types_only_tag
            .expect_primitive()
            .and_then(|b| b.first().copied())
            .map(|b| b != 0)
            .ok_or_else(|| CodecError::UnexpectedStructure("SearchRequest typesOnly".into()))?;
        let filter = Filter::try_from_structure(filter_tag)?;
        let attributes = expect_constructed(attrs_tag)?
            .into_iter()
            .map(|t| {
                t.expect_primitive()
                    .and_then(|b| String::from_utf8(b).ok())
                    .ok_or_else(|| CodecError::UnexpectedStructure("SearchRequest attribute".into()))
            })
            .collect::<Result<_, _>>()?;

        Ok(SearchRequest {
            base_object,
            scope,
            deref_aliases,
            size_limit,
            time_limit,
            types_only,
            filter,
            attributes,
        })
    }
}

fn int_from(tag: StructureTag) -> Result<i64, CodecError> {
    tag.expect_primitive()
        .and_then(super::ber_integer_to_i64)
        .ok_or_else(|| CodecError::UnexpectedStructure("expected integer/enumerated".into()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    pub object: String,
    pub changes: Vec<Change>,
}

impl ModifyRequest {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: vec![
                Tag::OctetString(OctetString {
                    inner: self.object.into_bytes(),
                    ..Default::default()
                }),
                Tag::Sequence(Sequence {
                    class: TagClass::Universal,
                    id: 16,
                    inner: self.changes.into_iter().map(Change::into_tag).collect(),
                }),
            ],
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        if children.len() != 2 {
            return Err(CodecError::UnexpectedStructure("ModifyRequest".into()));
        }
        let changes_tag = children.pop().unwrap();
        let object_tag = children.pop().unwrap();
        let object = object_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("ModifyRequest object".into()))?;
        let changes = expect_constructed(changes_tag)?
            .into_iter()
            .map(change_from_structure)
            .collect::<Result<_, _>>()?;
        Ok(ModifyRequest { object, changes })
    }
}

fn change_from_structure(tag: StructureTag) -> Result<Change, CodecError> {
    let mut children = expect_constructed(tag)?;
    if children.len() != 2 {
        return Err(CodecError::UnexpectedStructure("Change".into()));
    }
    let attr_tag = children.pop().unwrap();
    let op_tag = children.pop().unwrap();
    let operation = int_from(op_tag)?;
    let operation = crate::change::ModifyOperation::from_ber(operation)
        .ok_or_else(|| CodecError::UnknownTag(format!("modify operation {operation}")))?;
    let modification = attribute_from_structure(attr_tag)?;
    Ok(Change { operation, modification })
}

fn attribute_from_structure(tag: StructureTag) -> Result<Attribute, CodecError> {
    let mut children = expect_constructed(tag)?;
    if children.len() != 2 {
        return Err(CodecError::UnexpectedStructure("Attribute".into()));
    }
    let values_tag = children.pop().unwrap();
    let type_tag = children.pop().unwrap();
    let r#type = type_tag
        .expect_primitive()
        .and_then(|b| String::from_utf8(b).ok())
        .ok_or_else(|| CodecError::UnexpectedStructure("Attribute type".into()))?;
    let values = expect_constructed(values_tag)?
        .into_iter()
        .map(|t| t.expect_primitive().ok_or_else(|| CodecError::UnexpectedStructure("Attribute value".into())))
        .collect::<Result<_, _>>()?;
    Ok(Attribute { r#type, values })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub entry: String,
    pub attributes: Vec<Attribute>,
}

impl AddRequest {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: vec![
                Tag::OctetString(OctetString {
                    inner: self.entry.into_bytes(),
                    ..Default::default()
                }),
                Tag::Sequence(Sequence {
                    class: TagClass::Universal,
                    id: 16,
                    inner: self.attributes.into_iter().map(Attribute::into_tag).collect(),
                }),
            ],
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        if children.len() != 2 {
            return Err(CodecError::UnexpectedStructure("AddRequest".into()));
        }
        let attrs_tag = children.pop().unwrap();
        let entry_tag = children.pop().unwrap();
        let entry = entry_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("AddRequest entry".into()))?;
        let attributes = expect_constructed(attrs_tag)?
            .into_iter()
            .map(attribute_from_structure)
            .collect::<Result<_, _>>()?;
        Ok(AddRequest { entry, attributes })
    }
}

/// `ModifyDNRequest`. `new_superior`, when `Some`, is sent verbatim as
/// the `[0] newSuperior` field. When `None` and `newDN`-style construction
/// is used by a caller (see `crate::client`), the first-unescaped-comma
/// heuristic documented in `spec.md` §9 derives it instead — that
/// derivation happens before this struct is built, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyDnRequest {
    pub entry: String,
    pub new_rdn: String,
    pub delete_old_rdn: bool,
    pub new_superior: Option<String>,
}

impl ModifyDnRequest {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let mut inner = vec![
            Tag::OctetString(OctetString {
                inner: self.entry.into_bytes(),
                ..Default::default()
            }),
            Tag::OctetString(OctetString {
                inner: self.new_rdn.into_bytes(),
                ..Default::default()
            }),
            Tag::Boolean(Boolean {
                inner: self.delete_old_rdn,
                ..Default::default()
            }),
        ];
        if let Some(new_superior) = self.new_superior {
            inner.push(Tag::OctetString(OctetString {
                class: TagClass::Context,
                id: 0,
                inner: new_superior.into_bytes(),
            }));
        }
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner,
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        let new_superior = if children.len() == 4 {
            let tag = children.pop().unwrap();
            Some(
                tag.expect_primitive()
                    .and_then(|b| String::from_utf8(b).ok())
                    .ok_or_else(|| CodecError::UnexpectedStructure("ModifyDNRequest newSuperior".into()))?,
            )
        } else {
            None
        };
        if children.len() != 3 {
            return Err(CodecError::UnexpectedStructure("ModifyDNRequest".into()));
        }
        let delete_old_rdn_tag = children.pop().unwrap();
        let new_rdn_tag = children.pop().unwrap();
        let entry_tag = children.pop().unwrap();

        let entry = entry_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("ModifyDNRequest entry".into()))?;
        let new_rdn = new_rdn_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("ModifyDNRequest newRdn".into()))?;
        let delete_old_rdn = delete_old_rdn_tag
            .expect_primitive()
            .and_then(|b| b.first().copied())
            .map(|b| b != 0)
            .ok_or_else(|| CodecError::UnexpectedStructure("ModifyDNRequest deleteOldRdn".into()))?;

        Ok(ModifyDnRequest { entry, new_rdn, delete_old_rdn, new_superior })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub entry: String,
    pub attribute_description: String,
    pub assertion_value: Vec<u8>,
}

impl CompareRequest {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner: vec![
                Tag::OctetString(OctetString {
                    inner: self.entry.into_bytes(),
                    ..Default::default()
                }),
                Tag::Sequence(Sequence {
                    class: TagClass::Universal,
                    id: 16,
                    inner: vec![
                        Tag::OctetString(OctetString {
                            inner: self.attribute_description.into_bytes(),
                            ..Default::default()
                        }),
                        Tag::OctetString(OctetString {
                            inner: self.assertion_value,
                            ..Default::default()
                        }),
                    ],
                }),
            ],
        })
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut children = expect_constructed(tag)?;
        if children.len() != 2 {
            return Err(CodecError::UnexpectedStructure("CompareRequest".into()));
        }
        let ava_tag = children.pop().unwrap();
        let entry_tag = children.pop().unwrap();
        let entry = entry_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("CompareRequest entry".into()))?;
        let mut ava = expect_constructed(ava_tag)?;
        if ava.len() != 2 {
            return Err(CodecError::UnexpectedStructure("CompareRequest ava".into()));
        }
        let value_tag = ava.pop().unwrap();
        let attr_tag = ava.pop().unwrap();
        let assertion_value = value_tag
            .expect_primitive()
            .ok_or_else(|| CodecError::UnexpectedStructure("CompareRequest value".into()))?;
        let attribute_description = attr_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("CompareRequest attr".into()))?;
        Ok(CompareRequest { entry, attribute_description, assertion_value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRequest {
    pub request_name: String,
    pub request_value: Option<Vec<u8>>,
}

impl ExtendedRequest {
    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let mut inner = vec![Tag::OctetString(OctetString {
            class: TagClass::Context,
            id: 0,
            inner: self.request_name.into_bytes(),
        })];
        if let Some(value) = self.request_value {
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
        let mut request_name = None;
        let mut request_value = None;
        for child in children {
            match (child.class, child.id) {
                (TagClass::Context, 0) => {
                    request_name = child
                        .expect_primitive()
                        .and_then(|b| String::from_utf8(b).ok());
                }
                (TagClass::Context, 1) => {
                    request_value = child.expect_primitive();
                }
                _ => {}
            }
        }
        Ok(ExtendedRequest {
            request_name: request_name
                .ok_or_else(|| CodecError::UnexpectedStructure("ExtendedRequest name".into()))?,
            request_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_bind_request_round_trips() {
        let request = BindRequest::simple("cn=admin,dc=example,dc=com", "secret");
        let structure = request.clone().into_tag(0).into_structure();
        let decoded = BindRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn sasl_bind_request_round_trips() {
        let request = BindRequest::sasl("", "PLAIN", Some(b"\0admin\0secret".to_vec()));
        let structure = request.clone().into_tag(0).into_structure();
        let decoded = BindRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn search_request_round_trips() {
        let request = SearchRequest {
            base_object: "dc=example,dc=com".into(),
            scope: SearchScope::Subtree,
            deref_aliases: DerefAliases::Never,
            size_limit: 0,
            time_limit: 0,
            types_only: false,
            filter: Filter::equality("cn", "Jim".as_bytes()),
            attributes: vec!["cn".into(), "mail".into()],
        };
        let structure = request.clone().into_tag(3).into_structure();
        let decoded = SearchRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn modify_request_round_trips() {
        let request = ModifyRequest {
            object: "cn=Jim,dc=example,dc=com".into(),
            changes: vec![Change::replace(Attribute::with_text("mail", "jim@example.com"))],
        };
        let structure = request.clone().into_tag(6).into_structure();
        let decoded = ModifyRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn add_request_round_trips() {
        let request = AddRequest {
            entry: "cn=Jim,dc=example,dc=com".into(),
            attributes: vec![
                Attribute::new("objectClass", vec![b"top".to_vec(), b"person".to_vec()]),
                Attribute::with_text("cn", "Jim"),
            ],
        };
        let structure = request.clone().into_tag(8).into_structure();
        let decoded = AddRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn modify_dn_request_round_trips_without_new_superior() {
        let request = ModifyDnRequest {
            entry: "cn=Jim,dc=example,dc=com".into(),
            new_rdn: "cn=James".into(),
            delete_old_rdn: true,
            new_superior: None,
        };
        let structure = request.clone().into_tag(12).into_structure();
        let decoded = ModifyDnRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn modify_dn_request_round_trips_with_new_superior() {
        let request = ModifyDnRequest {
            entry: "cn=Jim,ou=people,dc=example,dc=com".into(),
            new_rdn: "cn=James".into(),
            delete_old_rdn: false,
            new_superior: Some("ou=staff,dc=example,dc=com".into()),
        };
        let structure = request.clone().into_tag(12).into_structure();
        let decoded = ModifyDnRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn compare_request_round_trips() {
        let request = CompareRequest {
            entry: "cn=Jim,dc=example,dc=com".into(),
            attribute_description: "mail".into(),
            assertion_value: b"jim@example.com".to_vec(),
        };
        let structure = request.clone().into_tag(14).into_structure();
        let decoded = CompareRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn extended_request_round_trips_with_value() {
        let request = ExtendedRequest {
            request_name: "1.3.6.1.4.1.1466.20037".into(),
            request_value: Some(b"payload".to_vec()),
        };
        let structure = request.clone().into_tag(23).into_structure();
        let decoded = ExtendedRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn extended_request_round_trips_without_value() {
        let request = ExtendedRequest {
            request_name: "1.3.6.1.4.1.1466.20037".into(),
            request_value: None,
        };
        let structure = request.clone().into_tag(23).into_structure();
        let decoded = ExtendedRequest::try_from_structure(structure).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn bind_request_debug_redacts_password() {
        let request = BindRequest::simple("cn=admin,dc=example,dc=com", "hunter2");
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter2"));
    }
}

