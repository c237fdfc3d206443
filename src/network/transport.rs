//! Transport
//!
//! Opens the byte stream a session runs over: plain TCP, TLS, or TLS with a
//! client certificate.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rustls::{Certificate, ClientConfig, ClientConnection, PrivateKey, RootCertStore, ServerName, StreamOwned};
use rustls_pemfile::Item;

use crate::config::Config;
use crate::error::{RespError, Result};

/// A connected stream to the server
pub enum Transport {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Transport {
    /// Address of the server end
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Transport::Plain(tcp) => tcp.peer_addr(),
            Transport::Tls(tls) => tls.sock.peer_addr(),
        }
    }

    /// Whether the stream is encrypted
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.read(buf),
            Transport::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.write(buf),
            Transport::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(tcp) => tcp.flush(),
            Transport::Tls(tls) => tls.flush(),
        }
    }
}

/// Connect to the server described by `config`.
///
/// For TLS the handshake is completed here, so a bad certificate or an
/// untrusted server fails with `HandshakeFailure` before any session
/// starts.
pub fn connect(config: &Config) -> Result<Transport> {
    config.validate()?;

    let mut tcp = open_tcp(config)?;

    if !config.uses_tls() {
        tracing::info!("TCP connection established to {}", config.server_addr());
        return Ok(Transport::Plain(tcp));
    }

    let tls_config = client_config(config)?;
    let server_name = ServerName::try_from(config.addr.as_str()).map_err(|e| {
        RespError::HandshakeFailure(format!("invalid server name {}: {}", config.addr, e))
    })?;
    let mut conn = ClientConnection::new(Arc::new(tls_config), server_name)
        .map_err(|e| RespError::HandshakeFailure(e.to_string()))?;

    // Drive the handshake now so certificate errors surface before the session
    while conn.is_handshaking() {
        conn.complete_io(&mut tcp)
            .map_err(|e| RespError::HandshakeFailure(e.to_string()))?;
    }

    tracing::info!(
        "TLS connection established to {} (client auth: {})",
        config.server_addr(),
        config.mtls
    );
    Ok(Transport::Tls(Box::new(StreamOwned::new(conn, tcp))))
}

/// Open the TCP socket, trying each resolved address in turn
fn open_tcp(config: &Config) -> Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (config.addr.as_str(), config.port).to_socket_addrs()?.collect();

    let mut last_err = None;
    for addr in &addrs {
        let attempt = if config.connect_timeout_ms > 0 {
            TcpStream::connect_timeout(addr, Duration::from_millis(config.connect_timeout_ms))
        } else {
            TcpStream::connect(addr)
        };

        match attempt {
            Ok(stream) => {
                configure_stream(&stream, config)?;
                return Ok(stream);
            }
            // Try the next resolved address
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(RespError::TransportFailure(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{} did not resolve to any address", config.server_addr()),
        )
    })))
}

/// Disable Nagle and apply timeouts
fn configure_stream(stream: &TcpStream, config: &Config) -> Result<()> {
    stream.set_nodelay(true)?;

    if config.read_timeout_ms > 0 {
        stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
    }
    if config.write_timeout_ms > 0 {
        stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
    }

    Ok(())
}

/// Build the rustls client config from the configured PEM files
fn client_config(config: &Config) -> Result<ClientConfig> {
    let mut roots = RootCertStore::empty();
    for path in &config.server_cas {
        for cert in load_certs(path)? {
            roots.add(&cert).map_err(|e| {
                RespError::HandshakeFailure(format!("bad CA certificate in {}: {}", path.display(), e))
            })?;
        }
    }
    // No built-in root store; the server CA must be configured
    if roots.is_empty() {
        return Err(RespError::HandshakeFailure(
            "TLS requires at least one server CA".to_string(),
        ));
    }

    let builder = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots);

    if !config.mtls {
        return Ok(builder.with_no_client_auth());
    }

    let pair = config.cert_key_pairs.first().ok_or_else(|| {
        RespError::HandshakeFailure("mTLS requires a cert/key pair".to_string())
    })?;
    if config.cert_key_pairs.len() > 1 {
        tracing::warn!(
            "{} cert/key pairs configured, presenting only {}",
            config.cert_key_pairs.len(),
            pair.cert.display()
        );
    }

    let certs = load_certs(&pair.cert)?;
    let key = load_private_key(&pair.key)?;
    builder
        .with_client_auth_cert(certs, key)
        .map_err(|e| RespError::HandshakeFailure(e.to_string()))
}

fn open_pem(path: &Path) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|e| {
        RespError::HandshakeFailure(format!("cannot open {}: {}", path.display(), e))
    })
}

fn load_certs(path: &Path) -> Result<Vec<Certificate>> {
    let certs = rustls_pemfile::certs(&mut open_pem(path)?).map_err(|e| {
        RespError::HandshakeFailure(format!("cannot parse {}: {}", path.display(), e))
    })?;

    if certs.is_empty() {
        return Err(RespError::HandshakeFailure(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certs.into_iter().map(Certificate).collect())
}

fn load_private_key(path: &Path) -> Result<PrivateKey> {
    let items = rustls_pemfile::read_all(&mut open_pem(path)?).map_err(|e| {
        RespError::HandshakeFailure(format!("cannot parse {}: {}", path.display(), e))
    })?;

    items
        .into_iter()
        .find_map(|item| match item {
            Item::PKCS8Key(der) | Item::RSAKey(der) | Item::ECKey(der) => Some(PrivateKey(der)),
            // Certificates, CRLs
            _ => None,
        })
        .ok_or_else(|| {
            RespError::HandshakeFailure(format!("no private key found in {}", path.display()))
        })
}
