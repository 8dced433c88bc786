//! TLS session setup for secure fetches.

use crate::locator::NetworkAddress;
use crate::transport::BoxedIoStream;
use nb_core::NimbusError;
use nb_core::NimbusResult;
use std::net::TcpStream;

#[cfg(feature = "tls-rustls")]
use rustls::ClientConfig;
#[cfg(feature = "tls-rustls")]
use rustls::ClientConnection;
#[cfg(feature = "tls-rustls")]
use rustls::RootCertStore;
#[cfg(feature = "tls-rustls")]
use rustls::StreamOwned;
#[cfg(feature = "tls-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "tls-rustls")]
use std::sync::Arc;

/// Parameters for one TLS client handshake. The server name doubles as the
/// SNI value and the certificate verification target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsHandshakeConfig {
    pub server_name: String,
    pub alpn_protocols: Vec<String>,
}

/// Handshake requirements for an address: `https` negotiates TLS against the
/// host name, plain `http` does not.
pub fn handshake_config_for(address: &NetworkAddress) -> Option<TlsHandshakeConfig> {
    if !address.scheme.is_secure() {
        return None;
    }

    Some(TlsHandshakeConfig {
        server_name: address.host.clone(),
        alpn_protocols: vec!["http/1.1".to_owned()],
    })
}

/// Adapter contract for upgrading a TCP stream to TLS.
pub trait TlsConnector {
    fn connect_tls(
        &self,
        stream: TcpStream,
        handshake: &TlsHandshakeConfig,
    ) -> NimbusResult<BoxedIoStream>;
}

/// rustls-backed connector with the WebPKI trust anchors and standard
/// certificate-chain plus hostname verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustlsTlsConnector;

#[cfg(feature = "tls-rustls")]
impl TlsConnector for RustlsTlsConnector {
    fn connect_tls(
        &self,
        mut stream: TcpStream,
        handshake: &TlsHandshakeConfig,
    ) -> NimbusResult<BoxedIoStream> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let mut config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        config.alpn_protocols = handshake
            .alpn_protocols
            .iter()
            .map(|protocol| protocol.as_bytes().to_vec())
            .collect();

        let server_name = ServerName::try_from(handshake.server_name.clone()).map_err(|error| {
            NimbusError::new(
                "net.tls.server_name_invalid",
                format!(
                    "invalid TLS server name `{}`: {error}",
                    handshake.server_name
                ),
            )
        })?;

        let mut connection =
            ClientConnection::new(Arc::new(config), server_name).map_err(|error| {
                NimbusError::new(
                    "net.tls.connection_init_failed",
                    format!(
                        "failed to initialize TLS connection for `{}`: {error}",
                        handshake.server_name
                    ),
                )
            })?;

        connection.complete_io(&mut stream).map_err(|error| {
            NimbusError::new(
                "net.tls.handshake_failed",
                format!(
                    "TLS handshake failed for `{}`: {error}",
                    handshake.server_name
                ),
            )
        })?;

        Ok(Box::new(StreamOwned::new(connection, stream)))
    }
}

#[cfg(not(feature = "tls-rustls"))]
impl TlsConnector for RustlsTlsConnector {
    fn connect_tls(
        &self,
        _stream: TcpStream,
        _handshake: &TlsHandshakeConfig,
    ) -> NimbusResult<BoxedIoStream> {
        Err(NimbusError::new(
            "net.tls.backend_unavailable",
            "rustls backend is disabled for this build; enable `nb-net/tls-rustls`",
        ))
    }
}
