//! `tokio_util::codec::{Decoder, Encoder}` framing for [`LdapMessage`] over a
//! byte stream. `spec.md` §1 treats the BER primitive itself as external
//! (filled here by `lber`); this module is the frame-boundary glue on top
//! of it, grounded on `LdapCodec` in
//! `other_examples/202b39b6_wadahiro-ldap3__proto-src-lib.rs.rs`.

use bytes::{Buf, BytesMut};
use lber::parse::Parser;
use lber::write::encode_into;
use lber::{Consumer, ConsumerState, Input, Move};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CodecError;
use crate::message::LdapMessage;

/// Stateless framer: one BER `SEQUENCE` in, one [`LdapMessage`] out.
#[derive(Debug, Default)]
pub struct LdapCodec;

impl Decoder for LdapCodec {
    type Item = LdapMessage;
    type Error = CodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut parser = Parser::new();
        let (consumed, tag) = match *parser.handle(Input::Element(buf)) {
            ConsumerState::Continue(_) => {
                log::trace!("frame incomplete, {} byte(s) buffered", buf.len());
                return Ok(None);
            }
            ConsumerState::Error(_) => {
                return Err(CodecError::UnexpectedStructure("lber parser error".into()))
            }
            ConsumerState::Done(size, ref tag) => (size, tag.clone()),
        };
        let size = match consumed {
            Move::Await(_) => return Ok(None),
            Move::Seek(_) => return Err(CodecError::Incomplete),
            Move::Consume(size) => size,
        };
        log::trace!("frame boundary at byte {size}");
        if size == buf.len() {
            buf.clear();
        } else {
            buf.advance(size);
        }
        LdapMessage::try_from_structure(tag).map(Some)
    }
}

impl Encoder<LdapMessage> for LdapCodec {
    type Error = CodecError;

    fn encode(&mut self, message: LdapMessage, buf: &mut BytesMut) -> Result<(), Self::Error> {
        encode_into(buf, message.into_structure())
            .map_err(|e| CodecError::UnexpectedStructure(format!("ber encode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{LdapResult, ProtocolOp};

    #[test]
    fn round_trips_a_single_frame() {
        let mut codec = LdapCodec;
        let mut buf = BytesMut::new();
        let message = LdapMessage::new(1, ProtocolOp::UnbindRequest);
        codec.encode(message.clone(), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(message, decoded);
        assert!(buf.is_empty());
    }

    #[test]
    fn returns_none_on_partial_frame() {
        let mut codec = LdapCodec;
        let mut full = BytesMut::new();
        codec
            .encode(
                LdapMessage::new(2, ProtocolOp::DelResponse(LdapResult::success())),
                &mut full,
            )
            .unwrap();
        let mut partial = BytesMut::from(&full[..full.len() - 1]);
        assert!(codec.decode(&mut partial).unwrap().is_none());
    }

    #[test]
    fn decodes_two_messages_from_one_buffer() {
        let mut codec = LdapCodec;
        let mut buf = BytesMut::new();
        codec
            .encode(LdapMessage::new(1, ProtocolOp::UnbindRequest), &mut buf)
            .unwrap();
        codec
            .encode(LdapMessage::new(2, ProtocolOp::UnbindRequest), &mut buf)
            .unwrap();
        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.message_id, 1);
        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second.message_id, 2);
        assert!(buf.is_empty());
    }
}
