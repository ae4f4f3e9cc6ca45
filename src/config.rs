//! Connection configuration. `spec.md` §4.5.1's option bag, built as a
//! fluent builder in the shape of `LdapConnBuilder<T>` in
//! `other_examples/86670ca9_yvf-rust-ldap3__src-conn.rs.rs`.

use std::time::Duration;

use url::Url;

use crate::error::LdapError;

/// Which TLS posture a connection should take, per `spec.md` §4.5.3/§4.5.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Plain `ldap://`, no TLS.
    #[default]
    None,
    /// `ldaps://`, TLS from the first byte.
    Implicit,
    /// `ldap://` followed by an explicit StartTLS upgrade, RFC 4513.
    StartTls,
}

/// Connection and protocol options, built fluently and handed to
/// `crate::client::Client::connect`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) url: Url,
    pub(crate) connect_timeout: Duration,
    pub(crate) operation_timeout: Duration,
    pub(crate) tls: TlsMode,
    pub(crate) strict_dn: bool,
    pub(crate) initial_message_id: i32,
    pub(crate) default_page_size: u32,
}

impl ClientConfig {
    /// Parses `url` (`ldap://host[:port]` or `ldaps://host[:port]`) and
    /// seeds TLS mode from its scheme. Defaults: 10s connect timeout, 30s
    /// operation timeout, strict DN parsing, messageId counter starting at
    /// `1` (the first id used is therefore `2`, see `crate::client`), and a
    /// 100-entry default page size for paged search.
    pub fn new(url: &str) -> Result<Self, LdapError> {
        let parsed = Url::parse(url).map_err(|e| LdapError::InvalidInput(e.to_string()))?;
        let tls = match parsed.scheme() {
            "ldap" => TlsMode::None,
            "ldaps" => TlsMode::Implicit,
            other => {
                return Err(LdapError::InvalidInput(format!(
                    "unsupported LDAP URL scheme: {other}"
                )))
            }
        };
        Ok(Self {
            url: parsed,
            connect_timeout: Duration::from_secs(10),
            operation_timeout: Duration::from_secs(30),
            tls,
            strict_dn: true,
            initial_message_id: 1,
            default_page_size: 100,
        })
    }

    /// Overrides the messageId counter's starting value. The first id
    /// actually used on the wire is always one past this value, since
    /// allocation pre-increments.
    pub fn with_initial_message_id(mut self, initial_message_id: i32) -> Self {
        self.initial_message_id = initial_message_id;
        self
    }

    /// Default page size the paged-search convenience wrapper requests
    /// when the caller does not set one explicitly via `SearchOptions`.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Requests StartTLS be negotiated immediately after connecting. Has no
    /// effect on an `ldaps://` URL, which is already implicitly secured.
    pub fn with_starttls(mut self) -> Self {
        if self.tls == TlsMode::None {
            self.tls = TlsMode::StartTls;
        }
        self
    }

    /// Controls whether malformed trailing DN input is rejected (`true`,
    /// the default) or tolerated (`false`). See `crate::dn::parse`.
    pub fn with_strict_dn(mut self, strict: bool) -> Self {
        self.strict_dn = strict;
        self
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("localhost")
    }

    pub fn port(&self) -> u16 {
        self.url.port().unwrap_or(match self.tls {
            TlsMode::Implicit => 636,
            TlsMode::None | TlsMode::StartTls => 389,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ldap_scheme_defaults_to_no_tls() {
        let config = ClientConfig::new("ldap://directory.example.com").unwrap();
        assert_eq!(config.tls, TlsMode::None);
        assert_eq!(config.port(), 389);
    }

    #[test]
    fn ldaps_scheme_is_implicit_tls() {
        let config = ClientConfig::new("ldaps://directory.example.com").unwrap();
        assert_eq!(config.tls, TlsMode::Implicit);
        assert_eq!(config.port(), 636);
    }

    #[test]
    fn starttls_upgrades_plain_ldap_but_not_ldaps() {
        let plain = ClientConfig::new("ldap://directory.example.com")
            .unwrap()
            .with_starttls();
        assert_eq!(plain.tls, TlsMode::StartTls);

        let secured = ClientConfig::new("ldaps://directory.example.com")
            .unwrap()
            .with_starttls();
        assert_eq!(secured.tls, TlsMode::Implicit);
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        assert!(ClientConfig::new("http://directory.example.com").is_err());
    }

    #[test]
    fn explicit_port_overrides_default() {
        let config = ClientConfig::new("ldap://directory.example.com:1389").unwrap();
        assert_eq!(config.port(), 1389);
    }
}
