#![deny(missing_debug_implementations)]

//! An asynchronous LDAPv3 client protocol engine: DN and filter parsing,
//! BER message encoding/decoding, and a connection actor implementing bind,
//! search (with RFC 2696 paging), add/modify/delete/modifyDN/compare,
//! extended operations, and RFC 4513 StartTLS.

pub mod attribute;
pub mod change;
pub mod client;
pub mod codec;
pub mod config;
pub mod control;
pub mod dn;
pub mod error;
pub mod filter;
pub mod message;

pub use attribute::{Attribute, PartialAttribute};
pub use change::{Change, ModifyOperation};
pub use client::{Client, SearchOptions, SearchOutcome};
pub use codec::LdapCodec;
pub use config::{ClientConfig, TlsMode};
pub use control::{Control, PagedResultsValue};
pub use dn::DistinguishedName;
pub use error::{CodecError, LdapError, Result};
pub use filter::Filter;
pub use message::{LdapMessage, LdapResult, ResultCode, SearchResultEntry, SearchResultReference};
