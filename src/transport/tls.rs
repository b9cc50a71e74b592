//! # TLS Transport Layer
//!
//! Produces already-encrypted, already-authenticated bidirectional byte
//! streams for the framing layer above.
//!
//! ## Responsibilities
//! - Establish secure TLS connections from a host/port pair
//! - Load certificates and private keys from PEM files
//! - Accept connections and hand each secured stream to a handler

use std::fs::File;
use std::future::Future;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use rustls::ServerName;
use rustls::{Certificate, ClientConfig, PrivateKey, RootCertStore, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::client::TlsStream as ClientTlsStream;
use tokio_rustls::server::TlsStream as ServerTlsStream;
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::{error, info, instrument, warn};

use crate::error::{CommsError, Result};
use crate::transport::conn::Connection;
use crate::transport::worker::Worker;

/// Stream type handed to packet-server handlers
pub type ServerStream = ServerTlsStream<TcpStream>;

/// Stream type produced by [`connect`]
pub type ClientStream = ClientTlsStream<TcpStream>;

/// TLS server configuration
pub struct TlsServerConfig {
    cert_path: String,
    key_path: String,
}

impl TlsServerConfig {
    /// Create a new TLS server configuration
    pub fn new<P: AsRef<Path>>(cert_path: P, key_path: P) -> Self {
        Self {
            cert_path: cert_path.as_ref().to_string_lossy().to_string(),
            key_path: key_path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Generate a self-signed certificate for development/testing purposes
    pub fn generate_self_signed<P: AsRef<Path>>(cert_path: P, key_path: P) -> io::Result<Self> {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".into()])
            .map_err(|e| io::Error::other(format!("Certificate generation error: {e}")))?;

        let mut cert_file = File::create(&cert_path)?;
        cert_file.write_all(cert.cert.pem().as_bytes())?;

        let mut key_file = File::create(&key_path)?;
        key_file.write_all(cert.signing_key.serialize_pem().as_bytes())?;

        Ok(Self::new(cert_path, key_path))
    }

    /// Load the TLS configuration from files
    pub fn load_server_config(&self) -> Result<ServerConfig> {
        let cert_file = File::open(&self.cert_path)
            .map_err(|e| CommsError::TlsError(format!("Failed to open cert file: {e}")))?;
        let mut cert_reader = BufReader::new(cert_file);
        let cert_chain: Vec<Certificate> = certs(&mut cert_reader)
            .map_err(|_| CommsError::TlsError("Failed to parse certificate".into()))?
            .into_iter()
            .map(Certificate)
            .collect();

        let key_file = File::open(&self.key_path)
            .map_err(|e| CommsError::TlsError(format!("Failed to open key file: {e}")))?;
        let mut key_reader = BufReader::new(key_file);
        let keys = pkcs8_private_keys(&mut key_reader)
            .map_err(|_| CommsError::TlsError("Failed to parse private key".into()))?;

        if keys.is_empty() {
            return Err(CommsError::TlsError("No private keys found".into()));
        }

        let private_key = PrivateKey(keys[0].clone());

        ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(cert_chain, private_key)
            .map_err(|e| CommsError::TlsError(format!("TLS error: {e}")))
    }
}

/// TLS client configuration
pub struct TlsClientConfig {
    server_name: String,
    insecure: bool,
    /// Optional certificate hash to pin (SHA-256 fingerprint)
    pinned_cert_hash: Option<Vec<u8>>,
}

impl TlsClientConfig {
    /// Create a new TLS client configuration
    pub fn new<S: Into<String>>(server_name: S) -> Self {
        Self {
            server_name: server_name.into(),
            insecure: false,
            pinned_cert_hash: None,
        }
    }

    /// Allow insecure connections (skip certificate verification)
    ///
    /// # WARNING: Security Risk
    /// This disables certificate verification entirely and should ONLY be
    /// used for development and testing, or together with
    /// `with_pinned_cert_hash()` on internal networks.
    pub fn insecure(mut self) -> Self {
        warn!("INSECURE MODE ENABLED: Certificate verification is disabled. This should only be used for development/testing.");
        self.insecure = true;
        self
    }

    /// Pin a certificate by its SHA-256 fingerprint.
    ///
    /// Only servers presenting the exact certificate matching this hash are
    /// accepted. Implies insecure mode: standard CA verification is skipped.
    pub fn with_pinned_cert_hash(mut self, hash: Vec<u8>) -> Self {
        if hash.len() != 32 {
            warn!(
                "Certificate hash has unexpected length: {} (expected 32 bytes for SHA-256)",
                hash.len()
            );
        }
        self.pinned_cert_hash = Some(hash);
        self.insecure = true;
        self
    }

    /// Calculate the SHA-256 fingerprint of a certificate, for pinning
    pub fn calculate_cert_hash(cert: &Certificate) -> Vec<u8> {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&cert.0);
        hasher.finalize().to_vec()
    }

    /// Load the TLS client configuration
    pub fn load_client_config(&self) -> Result<ClientConfig> {
        let builder = ClientConfig::builder().with_safe_defaults();

        if !self.insecure {
            let mut root_store = RootCertStore::empty();
            let native_certs = rustls_native_certs::load_native_certs()
                .map_err(|e| CommsError::TlsError(format!("Failed to load native certs: {e}")))?;

            for cert in native_certs {
                root_store.add(&Certificate(cert.0)).map_err(|e| {
                    CommsError::TlsError(format!("Failed to add cert to root store: {e}"))
                })?;
            }

            return Ok(builder
                .with_root_certificates(root_store)
                .with_no_client_auth());
        }

        let verifier: Arc<dyn rustls::client::ServerCertVerifier> =
            match &self.pinned_cert_hash {
                Some(hash) => Arc::new(CertificateFingerprint {
                    fingerprint: hash.clone(),
                }),
                None => Arc::new(AcceptAnyServerCert),
            };

        Ok(builder
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth())
    }

    /// Get the server name as a rustls::ServerName
    pub fn server_name(&self) -> Result<ServerName> {
        ServerName::try_from(self.server_name.as_str())
            .map_err(|_| CommsError::TlsError("Invalid server name".into()))
    }
}

/// Verifier that accepts only a certificate matching a pinned fingerprint
struct CertificateFingerprint {
    fingerprint: Vec<u8>,
}

impl rustls::client::ServerCertVerifier for CertificateFingerprint {
    fn verify_server_cert(
        &self,
        end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: std::time::SystemTime,
    ) -> std::result::Result<rustls::client::ServerCertVerified, rustls::Error> {
        let hash = TlsClientConfig::calculate_cert_hash(end_entity);
        if hash == self.fingerprint {
            Ok(rustls::client::ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::General(
                "Pinned certificate hash mismatch".into(),
            ))
        }
    }
}

/// Verifier that accepts any server certificate
struct AcceptAnyServerCert;

impl rustls::client::ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: std::time::SystemTime,
    ) -> std::result::Result<rustls::client::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::ServerCertVerified::assertion())
    }
}

/// Connect to a TLS server, producing an encrypted byte stream
#[instrument(skip(config), fields(address = %addr))]
pub async fn connect(addr: &str, config: &TlsClientConfig) -> Result<ClientStream> {
    let tls_config = Arc::new(config.load_client_config()?);
    let connector = TlsConnector::from(tls_config);

    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| CommsError::TransportError(format!("Failed to connect to {addr}: {e}")))?;
    let domain = config.server_name()?;

    connector
        .connect(domain, stream)
        .await
        .map_err(|e| CommsError::TlsError(format!("TLS connection failed: {e}")))
}

/// Accept TLS connections on `addr` and hand each one to `handler` as a
/// packet [`Worker`].
///
/// Handler failures are logged per connection; the loop keeps serving.
#[instrument(skip(config, handler))]
pub async fn serve<H, Fut>(addr: &str, config: TlsServerConfig, handler: H) -> Result<()>
where
    H: Fn(Worker<ServerStream>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let tls_config = config.load_server_config()?;
    let acceptor = TlsAcceptor::from(Arc::new(tls_config));
    let listener = TcpListener::bind(addr).await?;

    info!(address = %addr, "TLS server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let acceptor = acceptor.clone();
        let handler = handler.clone();

        tokio::spawn(async move {
            match acceptor.accept(stream).await {
                Ok(tls_stream) => {
                    let worker = Worker::new(Connection::new(tls_stream, peer.to_string()));
                    if let Err(e) = handler(worker).await {
                        error!(%peer, error = %e, "Connection handler failed");
                    }
                }
                Err(e) => {
                    error!(%peer, error = %e, "TLS handshake failed");
                }
            }
        });
    }
}
