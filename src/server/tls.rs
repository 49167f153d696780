//! TLS setup
//!
//! Loads a PEM certificate chain and private key into a rustls server config backed by the
//! ring crypto provider.

use crate::config::TlsConfig;
use crate::utils::error::LifecycleError;
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Build a rustls server config from the configured certificate and key files
pub fn load_server_config(tls: &TlsConfig) -> Result<ServerConfig, LifecycleError> {
    let certs = load_certs(&tls.cert_file)?;
    let key = load_private_key(&tls.key_file)?;
    debug!(
        "loaded {} certificate(s) from {}",
        certs.len(),
        tls.cert_file.display()
    );

    ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| LifecycleError::tls(format!("unsupported protocol versions: {}", e)))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| LifecycleError::tls(format!("invalid certificate or key: {}", e)))
}

fn open(path: &Path) -> Result<BufReader<File>, LifecycleError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| LifecycleError::tls(format!("unable to open {}: {}", path.display(), e)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, LifecycleError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LifecycleError::tls(format!("unable to read {}: {}", path.display(), e)))?;

    if certs.is_empty() {
        return Err(LifecycleError::tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, LifecycleError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| LifecycleError::tls(format!("unable to read {}: {}", path.display(), e)))?
        .ok_or_else(|| LifecycleError::tls(format!("no private key found in {}", path.display())))
}
