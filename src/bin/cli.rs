//! respcli
//!
//! Interactive command-line client for RESP servers.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use respcli::network;
use respcli::{CertKeyPair, Config, RespError, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// respcli
#[derive(Parser, Debug)]
#[command(name = "respcli")]
#[command(about = "Interactive client for RESP servers over TCP, TLS and mTLS")]
#[command(version)]
struct Args {
    /// Address of the server node to connect to
    #[arg(short, long, default_value = "127.0.0.1")]
    addr: String,

    /// Port to use
    #[arg(short, long, default_value = "7480")]
    port: u16,

    /// Connect using TLS
    #[arg(long)]
    tls: bool,

    /// Use mTLS to verify the client with the server
    #[arg(long)]
    mtls: bool,

    /// A cert/key pair presented to the server, as 2 comma separated file paths
    #[arg(long = "cert-key-pair", value_name = "CERT,KEY", value_parser = parse_cert_key_pair)]
    cert_key_pairs: Vec<CertKeyPair>,

    /// A root CA file used to verify the server
    #[arg(long = "server-ca", value_name = "PATH")]
    server_cas: Vec<PathBuf>,

    /// JSON or YAML config file; when given, it replaces the flag values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_cert_key_pair(raw: &str) -> Result<CertKeyPair, String> {
    CertKeyPair::parse(raw).map_err(|e| e.to_string())
}

impl Args {
    fn into_config(self) -> respcli::Result<Config> {
        if let Some(path) = &self.config {
            return Config::from_file(path);
        }

        let mut builder = Config::builder()
            .addr(self.addr)
            .port(self.port)
            .tls(self.tls)
            .mtls(self.mtls);
        for pair in self.cert_key_pairs {
            builder = builder.cert_key_pair(pair);
        }
        for ca in self.server_cas {
            builder = builder.server_ca(ca);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so rendered replies on stdout stay clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,respcli=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout();
    let banner = if config.uses_tls() {
        "Establishing TLS connection...\n"
    } else {
        "Establishing TCP connection...\n"
    };
    if let Err(e) = stdout.write_all(banner.as_bytes()).and_then(|_| stdout.flush()) {
        tracing::warn!("Failed to write to stdout: {}", e);
    }

    let transport = match network::connect(&config) {
        Ok(transport) => transport,
        Err(e @ RespError::HandshakeFailure(_)) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.server_addr(), e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut session = Session::new(transport, stdin.lock(), stdout.lock(), &config);

    match session.run() {
        Ok(()) => {
            tracing::debug!("Session ended");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Session terminated: {}", e);
            ExitCode::FAILURE
        }
    }
}
