use paket::Buffer;
use paket_net::{Config, Connection, Listener, TransportError, DEFAULT_MAX_PAYLOAD};
use std::io::{self, Read};
use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Print paket buffers and ship them over TCP
#[derive(StructOpt)]
#[structopt(name = "pq", author = "Liv Fischer")]
struct Opt {
    /// stdin holds base64 text instead of raw bytes
    #[structopt(short, long)]
    base64: bool,
    /// send the buffer read from stdin to <host:port> instead of printing it
    #[structopt(short, long, conflicts_with = "listen")]
    send: Option<String>,
    /// accept connections on this port and print every buffer received
    #[structopt(short, long)]
    listen: Option<u16>,
    /// largest payload accepted from the network, in bytes
    #[structopt(long, default_value = "67108864")]
    max_payload: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let opt = Opt::from_args();
    if opt.max_payload != DEFAULT_MAX_PAYLOAD {
        info!(max_payload = opt.max_payload, "custom payload limit");
    }
    let config = Config::default().with_max_payload(opt.max_payload);
    match (opt.listen, &opt.send) {
        (Some(port), _) => listen(port, config),
        (None, Some(addr)) => send(addr, read_stdin(opt.base64)?, config),
        (None, None) => {
            println!("{}", read_stdin(opt.base64)?);
            Ok(())
        },
    }
}

fn read_stdin(base64: bool) -> Result<Buffer> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes).context("Failed to read stdin")?;
    if base64 {
        let text: Vec<u8> = bytes.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
        bytes = base64::decode(&text).context("input is not base64")?;
    }
    Buffer::from_owned(bytes).context("Decoding error")
}

fn send(addr: &str, buffer: Buffer, config: Config) -> Result<()> {
    let mut connection = Connection::connect_addr(addr, config).with_context(|| format!("Failed to connect to {}", addr))?;
    connection.send(&buffer).context("Failed to send")?;
    connection.close().context("Failed to close connection")
}

fn listen(port: u16, config: Config) -> Result<()> {
    let listener = Listener::bind(port, config).with_context(|| format!("Failed to bind port {}", port))?;
    loop {
        let mut connection = match listener.accept() {
            Ok(connection) => connection,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            },
        };
        loop {
            match connection.receive() {
                Ok(buffer) => println!("{}", buffer),
                Err(TransportError::Closed) => break,
                Err(e) => {
                    warn!(peer = %connection.peer(), error = %e, "dropping connection");
                    break;
                },
            }
        }
    }
}
