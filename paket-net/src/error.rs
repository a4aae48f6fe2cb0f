use paket::DecodeError;
use std::fmt;
use std::io;

/// Errors that occur while moving buffers over a stream.
#[derive(Debug)]
pub enum TransportError {
    /// The underlying stream failed, including a peer hanging up in the middle of a frame.
    Io(io::Error),
    /// A header announced more payload than the connection accepts.
    TooLarge { len: usize, max: u64 },
    /// The frame arrived completely but is not a valid buffer.
    Decode(DecodeError),
    /// The peer closed the stream between two frames.
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::TooLarge { len, max } => write!(f, "Frame announces {} payload bytes, limit is {}", len, max),
            Self::Decode(e) => write!(f, "Invalid frame: {}", e),
            Self::Closed => f.write_str("Connection closed by peer"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecodeError> for TransportError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}
