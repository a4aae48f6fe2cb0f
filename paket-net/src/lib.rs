//! Moves `paket` buffers over TCP streams. A buffer is its own frame: the receiving side reads
//! the fixed size header, learns the payload length from it and then reads exactly that many
//! bytes. No further envelope is added.
//!
//! Every [`Connection`] and [`Listener`] owns its socket, there is no process wide setup.
//!
//! # Examples
//!
//! ```no_run
//! use paket_net::{Config, Connection, Listener};
//!
//! let listener = Listener::bind(4711, Config::default()).unwrap();
//! let mut client = Connection::connect("localhost", 4711, Config::default()).unwrap();
//! client.send(&paket::encode("hello").unwrap()).unwrap();
//!
//! let mut server = listener.accept().unwrap();
//! let greeting: String = paket::decode(&server.receive().unwrap()).unwrap();
//! assert_eq!("hello", greeting);
//! ```

mod config;
mod error;
mod frame;

pub use config::{Config, DEFAULT_MAX_PAYLOAD};
pub use error::{Result, TransportError};
pub use frame::{read_buffer, write_buffer};

use paket::Buffer;
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, info};

/// A stream carrying buffers in both directions.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    config: Config,
}

impl Connection {

    /// Connects to the first address `host` resolves to which accepts the connection.
    pub fn connect(host: &str, port: u16, config: Config) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        let connection = Connection::from_stream(stream, config)?;
        info!(peer = %connection.peer, "connected");
        Ok(connection)
    }

    /// Like [`Connection::connect`] for anything that resolves to socket addresses.
    pub fn connect_addr<A: ToSocketAddrs>(addr: A, config: Config) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let connection = Connection::from_stream(stream, config)?;
        info!(peer = %connection.peer, "connected");
        Ok(connection)
    }

    fn from_stream(stream: TcpStream, config: Config) -> Result<Self> {
        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        let peer = stream.peer_addr()?;
        Ok(Connection { stream, peer, config })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn send(&mut self, buffer: &Buffer) -> Result<()> {
        write_buffer(&mut self.stream, buffer)
    }

    /// Blocks until a complete buffer has arrived. A peer which hung up between two buffers
    /// yields [`TransportError::Closed`].
    pub fn receive(&mut self) -> Result<Buffer> {
        read_buffer(&mut self.stream, &self.config)
    }

    pub fn close(self) -> Result<()> {
        debug!(peer = %self.peer, "closing");
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != std::io::ErrorKind::NotConnected => Err(e.into()),
            _ => Ok(()),
        }
    }

}

/// Accepts incoming connections on a port of all local interfaces.
pub struct Listener {
    listener: TcpListener,
    config: Config,
}

impl Listener {

    /// Port 0 picks a free port, see [`Listener::local_addr`].
    pub fn bind(port: u16, config: Config) -> Result<Self> {
        Listener::bind_addr((Ipv4Addr::UNSPECIFIED, port), config)
    }

    pub fn bind_addr<A: ToSocketAddrs>(addr: A, config: Config) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!(addr = %listener.local_addr()?, "listening");
        Ok(Listener { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn accept(&self) -> Result<Connection> {
        let (stream, peer) = self.listener.accept()?;
        info!(peer = %peer, "accepted");
        Connection::from_stream(stream, self.config)
    }

}
