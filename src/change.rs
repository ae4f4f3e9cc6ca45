//! Modification primitives used by `ModifyRequest`, per RFC 4511 §4.6.

use lber::common::TagClass;
use lber::structures::{Enumerated, Sequence, Tag};

use crate::attribute::PartialAttribute;

/// The kind of modification a [`Change`] applies to its attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOperation {
    Add = 0,
    Delete = 1,
    Replace = 2,
    Increment = 3,
}

impl ModifyOperation {
    pub(crate) fn to_ber(self) -> i64 {
        self as i64
    }

    pub(crate) fn from_ber(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Add),
            1 => Some(Self::Delete),
            2 => Some(Self::Replace),
            3 => Some(Self::Increment),
            _ => None,
        }
    }
}

/// One entry in a `ModifyRequest`'s `changes` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub operation: ModifyOperation,
    pub modification: PartialAttribute,
}

impl Change {
    pub fn add(attribute: PartialAttribute) -> Self {
        Self {
            operation: ModifyOperation::Add,
            modification: attribute,
        }
    }

    pub fn delete(attribute: PartialAttribute) -> Self {
        Self {
            operation: ModifyOperation::Delete,
            modification: attribute,
        }
    }

    pub fn replace(attribute: PartialAttribute) -> Self {
        Self {
            operation: ModifyOperation::Replace,
            modification: attribute,
        }
    }

    pub fn increment(attribute: PartialAttribute) -> Self {
        Self {
            operation: ModifyOperation::Increment,
            modification: attribute,
        }
    }

    pub(crate) fn into_tag(self) -> Tag {
        Tag::Sequence(Sequence {
            class: TagClass::Universal,
            id: 16,
            inner: vec![
                Tag::Enumerated(Enumerated {
                    inner: self.operation.to_ber(),
                    ..Default::default()
                }),
                self.modification.into_tag(),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_operation_round_trips_through_ber_value() {
        for op in [
            ModifyOperation::Add,
            ModifyOperation::Delete,
            ModifyOperation::Replace,
            ModifyOperation::Increment,
        ] {
            assert_eq!(ModifyOperation::from_ber(op.to_ber()), Some(op));
        }
    }
}
