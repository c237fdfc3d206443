//! Configuration for respcli
//!
//! Centralized configuration with sensible defaults. Values come either from
//! command-line flags (see the `respcli` binary) or from a JSON/YAML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RespError, Result};

/// A client certificate and its private key, both PEM files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertKeyPair {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl CertKeyPair {
    /// Parse a `cert,key` flag value
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split(',').collect();
        Self::from_parts(&parts)
    }

    fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self> {
        let parts: Vec<&str> = parts.iter().map(|p| AsRef::<str>::as_ref(p).trim()).collect();
        match parts.as_slice() {
            [cert, key] if !cert.is_empty() && !key.is_empty() => Ok(Self {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            _ => Err(RespError::Config(
                "certKeyPair must be 2 comma separated file paths".to_string(),
            )),
        }
    }
}

/// Main configuration for a client instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    /// Server host to connect to
    pub addr: String,

    /// Server port
    pub port: u16,

    /// Wrap the connection in TLS
    pub tls: bool,

    /// Present a client certificate (implies TLS)
    pub mtls: bool,

    /// Client cert/key pairs; the first one is presented for mTLS
    pub cert_key_pairs: Vec<CertKeyPair>,

    /// Root CAs used to verify the server
    pub server_cas: Vec<PathBuf>,

    /// Connect timeout (milliseconds, 0 = none)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Terminator of one message on the transport
    pub response_delimiter: Vec<u8>,

    /// Terminator of one interactive input line
    pub input_delimiter: Vec<u8>,

    /// Frames larger than this are rejected (bytes)
    pub max_frame_size: usize,

    // -------------------------------------------------------------------------
    // Session Configuration
    // -------------------------------------------------------------------------
    /// Line (case-insensitive) that ends the session
    pub quit_sentinel: String,

    /// SimpleString reply that switches the session into subscription mode
    pub subscribe_sentinel: String,

    /// Frame written back after every pushed message
    pub ack_frame: Vec<u8>,

    /// Render the subscribe sentinel itself
    pub show_subscribe_ack: bool,

    /// Written before every input line
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1".to_string(),
            port: 7480,
            tls: false,
            mtls: false,
            cert_key_pairs: Vec::new(),
            server_cas: Vec::new(),
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            response_delimiter: b"\r\n\r\n".to_vec(),
            input_delimiter: b"\n".to_vec(),
            max_frame_size: 16 * 1024 * 1024, // 16 MB
            quit_sentinel: "quit".to_string(),
            subscribe_sentinel: "SUBSCRIBE_OK".to_string(),
            ack_frame: b"+ACK\r\n\r\n".to_vec(),
            show_subscribe_ack: true,
            prompt: "\n> ".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` of the server
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    /// Whether the transport is wrapped in TLS
    pub fn uses_tls(&self) -> bool {
        self.tls || self.mtls
    }

    /// Load a config from a `.json`, `.yaml` or `.yml` file.
    ///
    /// Keys missing from the file keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            RespError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let file: FileConfig = match ext.as_deref() {
            Some("json") => serde_json::from_str(&raw)
                .map_err(|e| RespError::Config(format!("{}: {}", path.display(), e)))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .map_err(|e| RespError::Config(format!("{}: {}", path.display(), e)))?,
            _ => {
                return Err(RespError::Config(format!(
                    "unsupported config file extension: {}",
                    path.display()
                )))
            }
        };

        tracing::debug!("Loaded config from {}", path.display());
        file.into_config()
    }

    /// Reject combinations the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.response_delimiter.is_empty() {
            return Err(RespError::Config("response delimiter is empty".to_string()));
        }
        if self.input_delimiter.is_empty() {
            return Err(RespError::Config("input delimiter is empty".to_string()));
        }
        if self.ack_frame.is_empty() {
            return Err(RespError::Config("ack frame is empty".to_string()));
        }
        if self.max_frame_size == 0 {
            return Err(RespError::Config("max frame size must be positive".to_string()));
        }
        if self.mtls && self.cert_key_pairs.is_empty() {
            return Err(RespError::Config(
                "mTLS requires at least one cert/key pair".to_string(),
            ));
        }
        Ok(())
    }
}

/// On-disk representation, accepting both the historical PascalCase keys
/// and snake_case.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    #[serde(rename = "TLS", alias = "tls")]
    tls: Option<bool>,

    #[serde(rename = "MTLS", alias = "mtls")]
    mtls: Option<bool>,

    #[serde(rename = "CertKeyPairs", alias = "cert_key_pairs")]
    cert_key_pairs: Option<Vec<Vec<String>>>,

    #[serde(rename = "ServerCAs", alias = "server_cas")]
    server_cas: Option<Vec<String>>,

    #[serde(rename = "Port", alias = "port")]
    port: Option<u16>,

    #[serde(rename = "Addr", alias = "addr")]
    addr: Option<String>,

    #[serde(alias = "ResponseDelimiter")]
    response_delimiter: Option<String>,

    #[serde(alias = "InputDelimiter")]
    input_delimiter: Option<String>,

    #[serde(alias = "MaxFrameSize")]
    max_frame_size: Option<usize>,

    #[serde(alias = "QuitSentinel")]
    quit_sentinel: Option<String>,

    #[serde(alias = "SubscribeSentinel")]
    subscribe_sentinel: Option<String>,

    #[serde(alias = "AckFrame")]
    ack_frame: Option<String>,

    #[serde(alias = "ShowSubscribeAck")]
    show_subscribe_ack: Option<bool>,

    #[serde(alias = "Prompt")]
    prompt: Option<String>,

    #[serde(alias = "ConnectTimeoutMs")]
    connect_timeout_ms: Option<u64>,

    #[serde(alias = "ReadTimeoutMs")]
    read_timeout_ms: Option<u64>,

    #[serde(alias = "WriteTimeoutMs")]
    write_timeout_ms: Option<u64>,
}

impl FileConfig {
    fn into_config(self) -> Result<Config> {
        let mut builder = Config::builder();

        if let Some(tls) = self.tls {
            builder = builder.tls(tls);
        }
        if let Some(mtls) = self.mtls {
            builder = builder.mtls(mtls);
        }
        for pair in self.cert_key_pairs.unwrap_or_default() {
            builder = builder.cert_key_pair(CertKeyPair::from_parts(&pair)?);
        }
        for ca in self.server_cas.unwrap_or_default() {
            builder = builder.server_ca(ca);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(addr) = self.addr {
            builder = builder.addr(addr);
        }
        if let Some(delim) = self.response_delimiter {
            builder = builder.response_delimiter(delim);
        }
        if let Some(delim) = self.input_delimiter {
            builder = builder.input_delimiter(delim);
        }
        if let Some(size) = self.max_frame_size {
            builder = builder.max_frame_size(size);
        }
        if let Some(sentinel) = self.quit_sentinel {
            builder = builder.quit_sentinel(sentinel);
        }
        if let Some(sentinel) = self.subscribe_sentinel {
            builder = builder.subscribe_sentinel(sentinel);
        }
        if let Some(ack) = self.ack_frame {
            builder = builder.ack_frame(ack);
        }
        if let Some(show) = self.show_subscribe_ack {
            builder = builder.show_subscribe_ack(show);
        }
        if let Some(prompt) = self.prompt {
            builder = builder.prompt(prompt);
        }
        if let Some(ms) = self.connect_timeout_ms {
            builder = builder.connect_timeout_ms(ms);
        }
        if let Some(ms) = self.read_timeout_ms {
            builder = builder.read_timeout_ms(ms);
        }
        if let Some(ms) = self.write_timeout_ms {
            builder = builder.write_timeout_ms(ms);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.config.addr = addr.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable or disable TLS
    pub fn tls(mut self, enabled: bool) -> Self {
        self.config.tls = enabled;
        self
    }

    /// Enable or disable mutual TLS
    pub fn mtls(mut self, enabled: bool) -> Self {
        self.config.mtls = enabled;
        self
    }

    /// Add a client cert/key pair
    pub fn cert_key_pair(mut self, pair: CertKeyPair) -> Self {
        self.config.cert_key_pairs.push(pair);
        self
    }

    /// Add a root CA for verifying the server
    pub fn server_ca(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.server_cas.push(path.into());
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the message terminator on the transport
    pub fn response_delimiter(mut self, delimiter: impl Into<Vec<u8>>) -> Self {
        self.config.response_delimiter = delimiter.into();
        self
    }

    /// Set the interactive input line terminator
    pub fn input_delimiter(mut self, delimiter: impl Into<Vec<u8>>) -> Self {
        self.config.input_delimiter = delimiter.into();
        self
    }

    /// Set the largest accepted frame (in bytes)
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Set the line that ends the session
    pub fn quit_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.config.quit_sentinel = sentinel.into();
        self
    }

    /// Set the SimpleString that enters subscription mode
    pub fn subscribe_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.config.subscribe_sentinel = sentinel.into();
        self
    }

    /// Set the acknowledgment frame written per pushed message
    pub fn ack_frame(mut self, frame: impl Into<Vec<u8>>) -> Self {
        self.config.ack_frame = frame.into();
        self
    }

    /// Render the subscribe sentinel or keep quiet about it
    pub fn show_subscribe_ack(mut self, show: bool) -> Self {
        self.config.show_subscribe_ack = show;
        self
    }

    /// Set the input prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
