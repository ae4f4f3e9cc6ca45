//! Crate-wide error types.
//!
//! Mirrors the taxonomy in the protocol design: invalid input is rejected
//! before any byte touches the wire, transport and codec failures tear the
//! connection down, and non-success LDAP results are carried as typed
//! values rather than opaque strings.

use std::io;

use thiserror::Error;

use crate::message::LdapResult;

/// Crate-local `Result` alias.
pub type Result<T> = std::result::Result<T, LdapError>;

/// Top-level error returned by every public [`crate::client::Client`] operation.
#[derive(Debug, Error)]
pub enum LdapError {
    /// A caller-supplied DN, filter, or attribute value was malformed and
    /// never reached the wire.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A transport-level I/O failure.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// A BER framing or structural decode failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A request was issued, or was still pending, when the transport was
    /// torn down.
    #[error("connection closed")]
    Disconnected,

    /// A request's deadline elapsed before a response arrived.
    #[error("operation timed out")]
    Timeout,

    /// The server returned a non-success `resultCode`.
    #[error("server error: {} ({})", .0.diagnostic_message, .0.result_code)]
    Server(LdapResult),

    /// TLS handshake failure during direct `ldaps://` connect or StartTLS.
    #[cfg(feature = "tls-native")]
    #[error("tls error: {0}")]
    TlsNative(#[from] native_tls::Error),

    #[cfg(feature = "tls-rustls")]
    #[error("tls error: {0}")]
    TlsRustls(#[from] rustls::Error),
}

/// Errors that can arise while reassembling or decoding a BER-framed
/// [`crate::message::LdapMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Not enough bytes have arrived yet to complete a frame. Never
    /// surfaced to a caller; internal to the framer's retry loop.
    #[error("incomplete frame")]
    Incomplete,

    /// A complete BER sequence was read, but its structure did not match
    /// any known `LDAPMessage` shape.
    #[error("unexpected BER structure: {0}")]
    UnexpectedStructure(String),

    /// A tag was recognized as structurally valid but names an operation,
    /// filter choice, or control OID this crate does not implement.
    #[error("unknown tag: {0}")]
    UnknownTag(String),
}
