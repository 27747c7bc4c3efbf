//! TLS settings and certificate verification.
//!
//! Verification policy:
//! - no CA bundle: the server certificate is not verified (handshake
//!   signatures still are)
//! - a validation callback that accepts the certificate skips further checks
//! - otherwise the chain and name are verified against the CA bundle

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::error::{Result, XcliError};

/// Caller-supplied certificate check: receives the DER-encoded server
/// certificate and the host name; returning `true` accepts it.
pub type ValidateFn = Arc<dyn Fn(&[u8], &str) -> bool + Send + Sync>;

/// TLS options for [`Channel::connect_tls`](super::Channel::connect_tls).
#[derive(Clone, Default)]
pub struct TlsSettings {
    /// PEM bundle of trusted certificate authorities.
    pub ca_certs: Option<PathBuf>,
    pub validate: Option<ValidateFn>,
}

impl fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSettings")
            .field("ca_certs", &self.ca_certs)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

impl TlsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ca_certs(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_certs = Some(path.into());
        self
    }

    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&[u8], &str) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Build the rustls client configuration.
    pub fn client_config(&self) -> Result<Arc<ClientConfig>> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let webpki = match &self.ca_certs {
            Some(path) => Some(
                WebPkiServerVerifier::builder_with_provider(
                    Arc::new(load_roots(path)?),
                    provider.clone(),
                )
                .build()
                .map_err(|e| XcliError::Tls(format!("verifier error: {}", e)))?,
            ),
            None => None,
        };
        let verifier = ArrayCertVerifier {
            webpki,
            validate: self.validate.clone(),
            provider: provider.clone(),
        };

        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| XcliError::Tls(format!("client config error: {}", e)))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();
        Ok(Arc::new(config))
    }
}

fn load_roots(path: &Path) -> Result<RootCertStore> {
    let pem = std::fs::read(path)
        .map_err(|e| XcliError::Tls(format!("cannot read CA bundle {}: {}", path.display(), e)))?;
    let certs = CertificateDer::pem_slice_iter(&pem)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| XcliError::Tls(format!("failed to parse certificates: {}", e)))?;
    if certs.is_empty() {
        return Err(XcliError::Tls(format!(
            "no CA certificates found in {}",
            path.display()
        )));
    }

    let mut roots = RootCertStore::empty();
    for cert in certs {
        roots
            .add(cert)
            .map_err(|e| XcliError::Tls(format!("failed to add CA certificate: {}", e)))?;
    }
    Ok(roots)
}

struct ArrayCertVerifier {
    webpki: Option<Arc<WebPkiServerVerifier>>,
    validate: Option<ValidateFn>,
    provider: Arc<CryptoProvider>,
}

impl fmt::Debug for ArrayCertVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayCertVerifier")
            .field("ca", &self.webpki.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

impl ServerCertVerifier for ArrayCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let Some(webpki) = &self.webpki else {
            return Ok(ServerCertVerified::assertion());
        };
        if let Some(validate) = &self.validate {
            let host = server_name.to_str();
            if validate(&end_entity[..], &*host) {
                tracing::debug!("server certificate accepted by validation callback");
                return Ok(ServerCertVerified::assertion());
            }
        }
        webpki.verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
