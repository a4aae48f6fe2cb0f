use std::time::Duration;

/// Largest payload accepted by default: 64 MiB.
pub const DEFAULT_MAX_PAYLOAD: u64 = 64 * 1024 * 1024;

/// Per connection settings. Listeners hand their config to every accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Frames whose header announces a longer payload are rejected before anything is allocated.
    pub max_payload: u64,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    /// Disables Nagle's algorithm on the socket.
    pub nodelay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_payload: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
            nodelay: true,
        }
    }
}

impl Config {
    pub fn with_max_payload(self, max_payload: u64) -> Self {
        Config { max_payload, ..self }
    }
}
