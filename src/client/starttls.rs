//! The StartTLS socket splice, `spec.md` §4.5.8: negotiate TLS on an
//! already-connected plaintext stream, in place, without losing anything
//! already buffered by the framer. Grounded structurally on the
//! TLS-acceptor wiring in `duesee-imap-codec`'s tokio client/server demos,
//! generalized from a fixed client/server role to an upgrade performed
//! mid-connection.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{LdapError, Result};

/// The OID that requests the StartTLS upgrade, RFC 4513.
pub(crate) const STARTTLS_OID: &str = "1.3.6.1.4.1.1466.20037";

#[cfg(all(feature = "tls-native", not(feature = "tls-rustls")))]
pub(crate) async fn connect_tls<S>(stream: S, host: &str) -> Result<impl AsyncRead + AsyncWrite + Unpin + Send>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let connector = tokio_native_tls::TlsConnector::from(native_tls::TlsConnector::new()?);
    connector.connect(host, stream).await.map_err(LdapError::TlsNative)
}

#[cfg(all(feature = "tls-rustls", not(feature = "tls-native")))]
pub(crate) async fn connect_tls<S>(stream: S, host: &str) -> Result<impl AsyncRead + AsyncWrite + Unpin + Send>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_native_certs::load_native_certs().map_err(LdapError::Io)? {
        let _ = roots.add(cert);
    }
    let config = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = tokio_rustls::TlsConnector::from(std::sync::Arc::new(config));
    let server_name = rustls::pki_types::ServerName::try_from(host.to_string())
        .map_err(|_| LdapError::InvalidInput(format!("invalid TLS server name: {host}")))?;
    connector
        .connect(server_name, stream)
        .await
        .map_err(LdapError::Io)
}

#[cfg(not(any(feature = "tls-native", feature = "tls-rustls")))]
pub(crate) async fn connect_tls<S>(_stream: S, _host: &str) -> Result<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    Err(LdapError::InvalidInput(
        "no TLS backend enabled: build with the \"tls-native\" or \"tls-rustls\" feature".into(),
    ))
}
