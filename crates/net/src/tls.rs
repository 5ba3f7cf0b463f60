//! TLS configuration loading
//!
//! Builds `tokio-rustls` acceptors and connectors from PEM files, plus a
//! self-signed configuration for tests and local development. Missing or
//! invalid certificate files are fatal at startup.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::warn;

use crate::error::{Error, Result};

/// Build a server-side acceptor from PEM certificate and key files.
pub fn server_config(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor> {
    let cert_pem = fs::read(cert_path).map_err(|e| {
        Error::Config(format!("failed to read cert '{}': {e}", cert_path.display()))
    })?;
    let key_pem = fs::read(key_path)
        .map_err(|e| Error::Config(format!("failed to read key '{}': {e}", key_path.display())))?;

    let certs = rustls_pemfile::certs(&mut &cert_pem[..])
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Config(format!("failed to parse certificates: {e}")))?;

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|e| Error::Config(format!("failed to parse private key: {e}")))?
        .ok_or_else(|| Error::Config("no private key found".to_string()))?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}

/// Build a client-side connector trusting the CA certificates in the
/// given PEM file.
pub fn client_config(ca_path: &Path) -> Result<TlsConnector> {
    let ca_pem = fs::read(ca_path)
        .map_err(|e| Error::Config(format!("failed to read CA '{}': {e}", ca_path.display())))?;

    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut &ca_pem[..]) {
        let cert = cert.map_err(|e| Error::Config(format!("failed to parse CA cert: {e}")))?;
        roots.add(cert)?;
    }

    if roots.is_empty() {
        return Err(Error::Config(format!(
            "no certificates found in '{}'",
            ca_path.display()
        )));
    }

    Ok(connector_from_roots(roots))
}

/// Generate a self-signed certificate for testing or local use.
///
/// Returns the acceptor and the DER certificate so the peer side can
/// trust it via [`connector_for_cert`].
pub fn self_signed() -> Result<(TlsAcceptor, CertificateDer<'static>)> {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .map_err(|e| Error::Config(format!("failed to generate self-signed cert: {e}")))?;

    let cert_der = cert.cert.der().clone();
    let key = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der.clone()], key.into())?;

    warn!("Using self-signed certificate - not for production use");

    Ok((TlsAcceptor::from(Arc::new(config)), cert_der))
}

/// Build a connector trusting exactly one DER certificate.
pub fn connector_for_cert(cert: &CertificateDer<'static>) -> Result<TlsConnector> {
    let mut roots = RootCertStore::empty();
    roots.add(cert.clone())?;
    Ok(connector_from_roots(roots))
}

fn connector_from_roots(roots: RootCertStore) -> TlsConnector {
    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_signed_config() {
        let result = self_signed();
        assert!(result.is_ok(), "Self-signed config should build");
    }

    #[test]
    fn test_missing_cert_is_fatal() {
        let result = server_config(
            Path::new("/nonexistent/cert.pem"),
            Path::new("/nonexistent/key.pem"),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_connector_trusts_generated_cert() {
        let (_, cert) = self_signed().unwrap();
        assert!(connector_for_cert(&cert).is_ok());
    }
}
