use crate::header::WireTag;
use std::fmt::{Display, Formatter, self};

#[derive(Debug, PartialEq)]
pub enum DecodeError {
    /// The input ended before a complete buffer could be read.
    Eof,
    /// The input contained this many bytes after the end of a complete buffer.
    Trailing(usize),
    UnknownTag(u32),
    Length(u64),
    TagMismatch { expected: WireTag, found: WireTag },
    PayloadSize { tag: WireTag, expected: usize, found: usize },
    InvalidBool(u8),
    InvalidChar(u32),
    /// A text payload lacked its terminating null unit.
    Unterminated(WireTag),
    Utf8(std::str::Utf8Error),
    MalformedComposite(&'static str),
    DuplicateKey(String),
    MissingField(String),
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(e: std::str::Utf8Error) -> DecodeError {
        DecodeError::Utf8(e)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::Eof => f.write_str("Unexpected end of buffer while decoding"),
            DecodeError::Trailing(n) => write!(f, "{} trailing bytes after buffer", n),
            DecodeError::UnknownTag(tag) => write!(f, "Unknown tag {}", tag),
            DecodeError::Length(value) => write!(f, "Length {} exceeds maximum {}", value, usize::MAX),
            DecodeError::TagMismatch { expected, found } => write!(f, "Expected tag {}, found {}", expected, found),
            DecodeError::PayloadSize { tag, expected, found } => write!(f, "{} payload of {} bytes, expected {}", tag, found, expected),
            DecodeError::InvalidBool(v) => write!(f, "Byte {:#04x} is not a boolean", v),
            DecodeError::InvalidChar(v) => write!(f, "Value {:#x} is not a unicode scalar value", v),
            DecodeError::Unterminated(tag) => write!(f, "{} payload is not null terminated", tag),
            DecodeError::Utf8(e) => write!(f, "String slice was not valid Utf-8: {}", e),
            DecodeError::MalformedComposite(reason) => write!(f, "Malformed composite: {}", reason),
            DecodeError::DuplicateKey(key) => write!(f, "Field {} occurs more than once", key),
            DecodeError::MissingField(key) => write!(f, "Required field {} is missing", key),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum EncodeError {
    Length(usize),
    DuplicateField(String),
    /// An empty buffer has no header and cannot become the child of a composite.
    EmptyChild,
}

impl std::error::Error for EncodeError {}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EncodeError::Length(value) => write!(f, "Length {} exceeds maximum {}", value, u64::MAX),
            EncodeError::DuplicateField(name) => write!(f, "Field {} already present in record", name),
            EncodeError::EmptyChild => f.write_str("Empty buffer cannot be packed into a composite"),
        }
    }
}
