use std::fmt::{self, Display};
use serde::{de, ser};
use paket::{DecodeError, EncodeError, WireTag};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    // Decode
    Decode(DecodeError),
    UnexpectedTag(&'static [WireTag], WireTag),
    Int,
    Variant(usize),
    Depth(usize),
    // Encode
    Encode(EncodeError),
    // Both
    Unsupported(&'static str),
    Message(String),
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => fmt.write_str(msg),
            Error::Encode(e) => write!(fmt, "Encoding error: {}", e),
            Error::Decode(e) => write!(fmt, "Decoding error: {}", e),
            Error::UnexpectedTag(expected, actual) => write!(fmt, "Unexpected tag: expected one of ({}), found {}",
                expected.iter().map(WireTag::name).collect::<Vec<_>>().join(", "), actual),
            Error::Int => fmt.write_str("Integer didn't fit into target type"),
            Error::Variant(n) => write!(fmt, "Enum record must hold exactly one field, found {}", n),
            Error::Depth(max) => write!(fmt, "Composites nested deeper than {} levels", max),
            Error::Unsupported(what) => write!(fmt, "paket has no encoding for {}", what),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Error {
        Error::Encode(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Error {
        Error::Decode(e)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(_e: std::num::TryFromIntError) -> Error {
        Error::Int
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            Error::Encode(e) => Some(e),
            _ => None,
        }
    }
}
