//! The LDAP message envelope, every protocol operation, and the BER
//! encode/decode glue that ties them to `lber`.
//!
//! One `ProtocolOp` sum type, each variant carrying its own payload,
//! decoded and encoded by free functions keyed on the BER application tag
//! — no per-operation class hierarchy.

mod request;
mod response;

pub use request::*;
pub use response::*;

use lber::common::TagClass;
use lber::structure::{StructureTag, PL};
use lber::structures::{ASNTag, Integer, Sequence, Tag};
use lber::universal::Types;

use crate::control::Control;
use crate::error::CodecError;

/// Converts a BER `INTEGER`'s raw big-endian two's-complement bytes into
/// an `i64`. `lber` hands back the primitive payload as bytes; this
/// mirrors the helper of the same name used throughout the `ldap3`
/// ecosystem (`other_examples/0b437986_kanidm-ldap3_server__src-proto.rs.rs`).
pub(crate) fn ber_integer_to_i64(bytes: Vec<u8>) -> Option<i64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = [if negative { 0xffu8 } else { 0 }; 8];
    let start = 8 - bytes.len();
    buf[start..].copy_from_slice(&bytes);
    Some(i64::from_be_bytes(buf))
}

fn integer_tag(value: i64) -> Tag {
    Tag::Integer(Integer {
        inner: value,
        ..Default::default()
    })
}

/// Every RFC 4511 §4.1.9 result code this crate distinguishes. Codes the
/// server sends that aren't named here decode into `Other(code)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    OperationsError,
    ProtocolError,
    TimeLimitExceeded,
    SizeLimitExceeded,
    CompareFalse,
    CompareTrue,
    AuthMethodNotSupported,
    StrongerAuthRequired,
    Referral,
    AdminLimitExceeded,
    UnavailableCriticalExtension,
    ConfidentialityRequired,
    SaslBindInProgress,
    NoSuchAttribute,
    UndefinedAttributeType,
    InappropriateMatching,
    ConstraintViolation,
    AttributeOrValueExists,
    InvalidAttributeSyntax,
    NoSuchObject,
    AliasProblem,
    InvalidDnSyntax,
    AliasDereferencingProblem,
    InappropriateAuthentication,
    InvalidCredentials,
    InsufficientAccessRights,
    Busy,
    Unavailable,
    UnwillingToPerform,
    LoopDetect,
    NamingViolation,
    ObjectClassViolation,
    NotAllowedOnNonLeaf,
    NotAllowedOnRdn,
    EntryAlreadyExists,
    ObjectClassModsProhibited,
    AffectsMultipleDsas,
    Other(i64),
}

impl ResultCode {
    pub fn is_success(self) -> bool {
        matches!(self, ResultCode::Success | ResultCode::CompareTrue)
    }

    pub(crate) fn to_ber(self) -> i64 {
        use ResultCode::*;
        match self {
            Success => 0,
            OperationsError => 1,
            ProtocolError => 2,
            TimeLimitExceeded => 3,
            SizeLimitExceeded => 4,
            CompareFalse => 5,
            CompareTrue => 6,
            AuthMethodNotSupported => 7,
            StrongerAuthRequired => 8,
            Referral => 10,
            AdminLimitExceeded => 11,
            UnavailableCriticalExtension => 12,
            ConfidentialityRequired => 13,
            SaslBindInProgress => 14,
            NoSuchAttribute => 16,
            UndefinedAttributeType => 17,
            InappropriateMatching => 18,
            ConstraintViolation => 19,
            AttributeOrValueExists => 20,
            InvalidAttributeSyntax => 21,
            NoSuchObject => 32,
            AliasProblem => 33,
            InvalidDnSyntax => 34,
            AliasDereferencingProblem => 36,
            InappropriateAuthentication => 48,
            InvalidCredentials => 49,
            InsufficientAccessRights => 50,
            Busy => 51,
            Unavailable => 52,
            UnwillingToPerform => 53,
            LoopDetect => 54,
            NamingViolation => 64,
            ObjectClassViolation => 65,
            NotAllowedOnNonLeaf => 66,
            NotAllowedOnRdn => 67,
            EntryAlreadyExists => 68,
            ObjectClassModsProhibited => 69,
            AffectsMultipleDsas => 71,
            Other(code) => code,
        }
    }

    pub(crate) fn from_ber(code: i64) -> Self {
        use ResultCode::*;
        match code {
            0 => Success,
            1 => OperationsError,
            2 => ProtocolError,
            3 => TimeLimitExceeded,
            4 => SizeLimitExceeded,
            5 => CompareFalse,
            6 => CompareTrue,
            7 => AuthMethodNotSupported,
            8 => StrongerAuthRequired,
            10 => Referral,
            11 => AdminLimitExceeded,
            12 => UnavailableCriticalExtension,
            13 => ConfidentialityRequired,
            14 => SaslBindInProgress,
            16 => NoSuchAttribute,
            17 => UndefinedAttributeType,
            18 => InappropriateMatching,
            19 => ConstraintViolation,
            20 => AttributeOrValueExists,
            21 => InvalidAttributeSyntax,
            32 => NoSuchObject,
            33 => AliasProblem,
            34 => InvalidDnSyntax,
            36 => AliasDereferencingProblem,
            48 => InappropriateAuthentication,
            49 => InvalidCredentials,
            50 => InsufficientAccessRights,
            51 => Busy,
            52 => Unavailable,
            53 => UnwillingToPerform,
            54 => LoopDetect,
            64 => NamingViolation,
            65 => ObjectClassViolation,
            66 => NotAllowedOnNonLeaf,
            67 => NotAllowedOnRdn,
            68 => EntryAlreadyExists,
            69 => ObjectClassModsProhibited,
            71 => AffectsMultipleDsas,
            other => Other(other),
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, self.to_ber())
    }
}

/// The common result structure carried by every response operation
/// (`BindResponse`, `AddResponse`, `SearchResultDone`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapResult {
    pub result_code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
    pub referral: Vec<String>,
}

impl LdapResult {
    pub fn success() -> Self {
        Self {
            result_code: ResultCode::Success,
            matched_dn: String::new(),
            diagnostic_message: String::new(),
            referral: Vec::new(),
        }
    }

    pub(crate) fn into_tag(self, app_id: u64) -> Tag {
        let mut inner = vec![
            integer_tag(self.result_code.to_ber()),
            Tag::OctetString(lber::structures::OctetString {
                inner: self.matched_dn.into_bytes(),
                ..Default::default()
            }),
            Tag::OctetString(lber::structures::OctetString {
                inner: self.diagnostic_message.into_bytes(),
                ..Default::default()
            }),
        ];
        if !self.referral.is_empty() {
            inner.push(Tag::Sequence(Sequence {
                class: TagClass::Context,
                id: 3,
                inner: self
                    .referral
                    .into_iter()
                    .map(|uri| {
                        Tag::OctetString(lber::structures::OctetString {
                            inner: uri.into_bytes(),
                            ..Default::default()
                        })
                    })
                    .collect(),
            }));
        }
        Tag::Sequence(Sequence {
            class: TagClass::Application,
            id: app_id,
            inner,
        })
    }

    pub(crate) fn try_from_children(mut children: Vec<StructureTag>) -> Result<Self, CodecError> {
        if children.len() < 3 {
            return Err(CodecError::UnexpectedStructure("LdapResult".into()));
        }
        let mut referral = Vec::new();
        if children.len() > 3 {
            if let Some(last) = children.last() {
                if last.class == TagClass::Context && last.id == 3 {
                    let tag = children.pop().unwrap();
                    if let Some(uris) = tag.expect_constructed() {
                        for uri in uris {
                            if let Some(bytes) = uri.expect_primitive() {
                                referral.push(String::from_utf8(bytes).unwrap_or_default());
                            }
                        }
                    }
                }
            }
        }
        if children.len() != 3 {
            return Err(CodecError::UnexpectedStructure("LdapResult".into()));
        }
        let diagnostic_tag = children.pop().unwrap();
        let matched_dn_tag = children.pop().unwrap();
        let code_tag = children.pop().unwrap();

        let result_code = code_tag
            .match_id(Types::Integer as u64)
            .and_then(|t| t.expect_primitive())
            .and_then(ber_integer_to_i64)
            .map(ResultCode::from_ber)
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapResult code".into()))?;
        let matched_dn = matched_dn_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapResult matchedDN".into()))?;
        let diagnostic_message = diagnostic_tag
            .expect_primitive()
            .and_then(|b| String::from_utf8(b).ok())
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapResult message".into()))?;

        Ok(LdapResult {
            result_code,
            matched_dn,
            diagnostic_message,
            referral,
        })
    }
}

// Application-class BER tag numbers for each protocolOp choice, RFC 4511 §4.2-4.12.
const OP_BIND_REQUEST: u64 = 0;
const OP_BIND_RESPONSE: u64 = 1;
const OP_UNBIND_REQUEST: u64 = 2;
const OP_SEARCH_REQUEST: u64 = 3;
const OP_SEARCH_RESULT_ENTRY: u64 = 4;
const OP_SEARCH_RESULT_DONE: u64 = 5;
const OP_MODIFY_REQUEST: u64 = 6;
const OP_MODIFY_RESPONSE: u64 = 7;
const OP_ADD_REQUEST: u64 = 8;
const OP_ADD_RESPONSE: u64 = 9;
const OP_DEL_REQUEST: u64 = 10;
const OP_DEL_RESPONSE: u64 = 11;
const OP_MODIFY_DN_REQUEST: u64 = 12;
const OP_MODIFY_DN_RESPONSE: u64 = 13;
const OP_COMPARE_REQUEST: u64 = 14;
const OP_COMPARE_RESPONSE: u64 = 15;
const OP_ABANDON_REQUEST: u64 = 16;
const OP_SEARCH_RESULT_REFERENCE: u64 = 19;
const OP_EXTENDED_REQUEST: u64 = 23;
const OP_EXTENDED_RESPONSE: u64 = 24;
const OP_INTERMEDIATE_RESPONSE: u64 = 25;

/// Every LDAPv3 protocol operation, request and response alike. A single
/// tagged sum type replaces the original's per-operation class hierarchy
/// (`spec.md` §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolOp {
    BindRequest(BindRequest),
    BindResponse(BindResponse),
    UnbindRequest,
    SearchRequest(SearchRequest),
    SearchResultEntry(SearchResultEntry),
    SearchResultReference(SearchResultReference),
    SearchResultDone(LdapResult),
    ModifyRequest(ModifyRequest),
    ModifyResponse(LdapResult),
    AddRequest(AddRequest),
    AddResponse(LdapResult),
    DelRequest(String),
    DelResponse(LdapResult),
    ModifyDnRequest(ModifyDnRequest),
    ModifyDnResponse(LdapResult),
    CompareRequest(CompareRequest),
    CompareResponse(LdapResult),
    AbandonRequest(i32),
    ExtendedRequest(ExtendedRequest),
    ExtendedResponse(ExtendedResponse),
    IntermediateResponse(IntermediateResponse),
}

impl ProtocolOp {
    pub(crate) fn into_tag(self) -> Tag {
        match self {
            ProtocolOp::BindRequest(r) => r.into_tag(OP_BIND_REQUEST),
            ProtocolOp::BindResponse(r) => r.into_tag(OP_BIND_RESPONSE),
            ProtocolOp::UnbindRequest => Tag::Null(lber::structures::Null {
                class: TagClass::Application,
                id: OP_UNBIND_REQUEST,
                inner: (),
            }),
            ProtocolOp::SearchRequest(r) => r.into_tag(OP_SEARCH_REQUEST),
            ProtocolOp::SearchResultEntry(r) => r.into_tag(OP_SEARCH_RESULT_ENTRY),
            ProtocolOp::SearchResultReference(r) => r.into_tag(OP_SEARCH_RESULT_REFERENCE),
            ProtocolOp::SearchResultDone(r) => r.into_tag(OP_SEARCH_RESULT_DONE),
            ProtocolOp::ModifyRequest(r) => r.into_tag(OP_MODIFY_REQUEST),
            ProtocolOp::ModifyResponse(r) => r.into_tag(OP_MODIFY_RESPONSE),
            ProtocolOp::AddRequest(r) => r.into_tag(OP_ADD_REQUEST),
            ProtocolOp::AddResponse(r) => r.into_tag(OP_ADD_RESPONSE),
            ProtocolOp::DelRequest(dn) => Tag::OctetString(lber::structures::OctetString {
                class: TagClass::Application,
                id: OP_DEL_REQUEST,
                inner: dn.into_bytes(),
            }),
            ProtocolOp::DelResponse(r) => r.into_tag(OP_DEL_RESPONSE),
            ProtocolOp::ModifyDnRequest(r) => r.into_tag(OP_MODIFY_DN_REQUEST),
            ProtocolOp::ModifyDnResponse(r) => r.into_tag(OP_MODIFY_DN_RESPONSE),
            ProtocolOp::CompareRequest(r) => r.into_tag(OP_COMPARE_REQUEST),
            ProtocolOp::CompareResponse(r) => r.into_tag(OP_COMPARE_RESPONSE),
            ProtocolOp::AbandonRequest(id) => Tag::Integer(Integer {
                class: TagClass::Application,
                id: OP_ABANDON_REQUEST,
                inner: id as i64,
            }),
            ProtocolOp::ExtendedRequest(r) => r.into_tag(OP_EXTENDED_REQUEST),
            ProtocolOp::ExtendedResponse(r) => r.into_tag(OP_EXTENDED_RESPONSE),
            ProtocolOp::IntermediateResponse(r) => r.into_tag(OP_INTERMEDIATE_RESPONSE),
        }
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        if tag.class != TagClass::Application {
            return Err(CodecError::UnexpectedStructure("protocolOp class".into()));
        }
        let id = tag.id;
        match id {
            OP_BIND_REQUEST => Ok(ProtocolOp::BindRequest(BindRequest::try_from_structure(tag)?)),
            OP_BIND_RESPONSE => Ok(ProtocolOp::BindResponse(BindResponse::try_from_structure(tag)?)),
            OP_UNBIND_REQUEST => Ok(ProtocolOp::UnbindRequest),
            OP_SEARCH_REQUEST => Ok(ProtocolOp::SearchRequest(SearchRequest::try_from_structure(tag)?)),
            OP_SEARCH_RESULT_ENTRY => Ok(ProtocolOp::SearchResultEntry(
                SearchResultEntry::try_from_structure(tag)?,
            )),
            OP_SEARCH_RESULT_REFERENCE => Ok(ProtocolOp::SearchResultReference(
                SearchResultReference::try_from_structure(tag)?,
            )),
            OP_SEARCH_RESULT_DONE => {
                let children = expect_constructed(tag)?;
                Ok(ProtocolOp::SearchResultDone(LdapResult::try_from_children(children)?))
            }
            OP_MODIFY_REQUEST => Ok(ProtocolOp::ModifyRequest(ModifyRequest::try_from_structure(tag)?)),
            OP_MODIFY_RESPONSE => {
                let children = expect_constructed(tag)?;
                Ok(ProtocolOp::ModifyResponse(LdapResult::try_from_children(children)?))
            }
            OP_ADD_REQUEST => Ok(ProtocolOp::AddRequest(AddRequest::try_from_structure(tag)?)),
            OP_ADD_RESPONSE => {
                let children = expect_constructed(tag)?;
                Ok(ProtocolOp::AddResponse(LdapResult::try_from_children(children)?))
            }
            OP_DEL_REQUEST => {
                let bytes = tag
                    .expect_primitive()
                    .ok_or_else(|| CodecError::UnexpectedStructure("DelRequest".into()))?;
                Ok(ProtocolOp::DelRequest(
                    String::from_utf8(bytes)
                        .map_err(|_| CodecError::UnexpectedStructure("DelRequest dn".into()))?,
                ))
            }
            OP_DEL_RESPONSE => {
                let children = expect_constructed(tag)?;
                Ok(ProtocolOp::DelResponse(LdapResult::try_from_children(children)?))
            }
            OP_MODIFY_DN_REQUEST => Ok(ProtocolOp::ModifyDnRequest(
                ModifyDnRequest::try_from_structure(tag)?,
            )),
            OP_MODIFY_DN_RESPONSE => {
                let children = expect_constructed(tag)?;
                Ok(ProtocolOp::ModifyDnResponse(LdapResult::try_from_children(children)?))
            }
            OP_COMPARE_REQUEST => Ok(ProtocolOp::CompareRequest(CompareRequest::try_from_structure(tag)?)),
            OP_COMPARE_RESPONSE => {
                let children = expect_constructed(tag)?;
                Ok(ProtocolOp::CompareResponse(LdapResult::try_from_children(children)?))
            }
            OP_ABANDON_REQUEST => {
                let bytes = tag
                    .expect_primitive()
                    .ok_or_else(|| CodecError::UnexpectedStructure("AbandonRequest".into()))?;
                let id = ber_integer_to_i64(bytes)
                    .ok_or_else(|| CodecError::UnexpectedStructure("AbandonRequest id".into()))?;
                Ok(ProtocolOp::AbandonRequest(id as i32))
            }
            OP_EXTENDED_REQUEST => Ok(ProtocolOp::ExtendedRequest(ExtendedRequest::try_from_structure(tag)?)),
            OP_EXTENDED_RESPONSE => Ok(ProtocolOp::ExtendedResponse(ExtendedResponse::try_from_structure(tag)?)),
            OP_INTERMEDIATE_RESPONSE => Ok(ProtocolOp::IntermediateResponse(
                IntermediateResponse::try_from_structure(tag)?,
            )),
            other => Err(CodecError::UnknownTag(format!("protocolOp {other}"))),
        }
    }
}

pub(crate) fn expect_constructed(tag: StructureTag) -> Result<Vec<StructureTag>, CodecError> {
    tag.expect_constructed()
        .ok_or_else(|| CodecError::UnexpectedStructure("expected constructed BER value".into()))
}

/// The full LDAP message envelope: `SEQUENCE { messageId, protocolOp, [0] controls? }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdapMessage {
    pub message_id: i32,
    pub op: ProtocolOp,
    pub controls: Vec<Control>,
}

impl LdapMessage {
    pub fn new(message_id: i32, op: ProtocolOp) -> Self {
        Self {
            message_id,
            op,
            controls: Vec::new(),
        }
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }

    pub(crate) fn into_structure(self) -> StructureTag {
        let mut inner = vec![integer_tag(self.message_id as i64), self.op.into_tag()];
        if !self.controls.is_empty() {
            inner.push(Tag::Sequence(Sequence {
                class: TagClass::Context,
                id: 0,
                inner: self.controls.into_iter().map(Control::into_tag).collect(),
            }));
        }
        Tag::Sequence(Sequence {
            class: TagClass::Universal,
            id: 16,
            inner,
        })
        .into_structure()
    }

    pub(crate) fn try_from_structure(tag: StructureTag) -> Result<Self, CodecError> {
        let mut seq = tag
            .match_id(Types::Sequence as u64)
            .and_then(|t| t.expect_constructed())
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapMessage".into()))?;

        let controls_tag = if seq.len() == 3 {
            seq.pop()
        } else if seq.len() == 2 {
            None
        } else {
            return Err(CodecError::UnexpectedStructure("LdapMessage arity".into()));
        };
        let op_tag = seq
            .pop()
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapMessage op".into()))?;
        let id_tag = seq
            .pop()
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapMessage id".into()))?;

        let message_id = id_tag
            .match_class(TagClass::Universal)
            .and_then(|t| t.match_id(Types::Integer as u64))
            .and_then(|t| t.expect_primitive())
            .and_then(ber_integer_to_i64)
            .map(|i| i as i32)
            .ok_or_else(|| CodecError::UnexpectedStructure("LdapMessage messageId".into()))?;

        let op = ProtocolOp::try_from_structure(op_tag)?;

        let controls = match controls_tag {
            Some(tag) if tag.class == TagClass::Context && tag.id == 0 => match tag.payload {
                PL::C(items) => items
                    .into_iter()
                    .map(Control::try_from_structure)
                    .collect::<Result<_, _>>()?,
                PL::P(_) => Vec::new(),
            },
            _ => Vec::new(),
        };

        Ok(LdapMessage {
            message_id,
            op,
            controls,
        })
    }
}
