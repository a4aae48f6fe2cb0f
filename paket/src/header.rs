//! Every `paket` buffer starts with a fixed size header: a four byte tag followed by an eight byte
//! payload length, both in the byte order of the host. The tag names the shape of the payload,
//! the length counts the payload bytes which directly follow the header. The header itself is not
//! included in the length, so the full size of a buffer on wire is always `HEADER_SIZE + len`.

use crate::error::{DecodeError, EncodeError};
use std::fmt::{self, Display, Formatter};
use std::mem::size_of;

/// Shape of an encoded payload.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireTag {
    Bool = 0,
    Int = 1,
    Size = 2,
    Float = 3,
    Double = 4,
    Char = 5,
    WideChar = 6,
    String = 7,
    WideString = 8,
    /// A size child followed by the element children.
    Sequence = 9,
    /// Exactly two children.
    Pair = 10,
    /// Reserved. No type encodes to this tag.
    Map = 11,
    /// Any number of children; records use alternating name and value children.
    Opaque = 12,
}

impl WireTag {

    /// Returns the mnemonic of the tag. This is useful for error messages.
    pub fn name(&self) -> &'static str {
        match *self {
            WireTag::Bool       => "Bool",
            WireTag::Int        => "Int",
            WireTag::Size       => "Size",
            WireTag::Float      => "Float",
            WireTag::Double     => "Double",
            WireTag::Char       => "Char",
            WireTag::WideChar   => "WideChar",
            WireTag::String     => "String",
            WireTag::WideString => "WideString",
            WireTag::Sequence   => "Sequence",
            WireTag::Pair       => "Pair",
            WireTag::Map        => "Map",
            WireTag::Opaque     => "Opaque",
        }
    }

    /// Whether the payload of this tag is a concatenation of complete child buffers.
    pub fn is_composite(&self) -> bool {
        matches!(*self, WireTag::Sequence | WireTag::Pair | WireTag::Opaque)
    }

}

impl TryFrom<u32> for WireTag {
    type Error = DecodeError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            x if x == WireTag::Bool as u32       => Ok(WireTag::Bool),
            x if x == WireTag::Int as u32        => Ok(WireTag::Int),
            x if x == WireTag::Size as u32       => Ok(WireTag::Size),
            x if x == WireTag::Float as u32      => Ok(WireTag::Float),
            x if x == WireTag::Double as u32     => Ok(WireTag::Double),
            x if x == WireTag::Char as u32       => Ok(WireTag::Char),
            x if x == WireTag::WideChar as u32   => Ok(WireTag::WideChar),
            x if x == WireTag::String as u32     => Ok(WireTag::String),
            x if x == WireTag::WideString as u32 => Ok(WireTag::WideString),
            x if x == WireTag::Sequence as u32   => Ok(WireTag::Sequence),
            x if x == WireTag::Pair as u32       => Ok(WireTag::Pair),
            x if x == WireTag::Map as u32        => Ok(WireTag::Map),
            x if x == WireTag::Opaque as u32     => Ok(WireTag::Opaque),
            x => Err(DecodeError::UnknownTag(x)),
        }
    }
}

impl Display for WireTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const TAG_SIZE: usize = size_of::<u32>();
const LEN_SIZE: usize = size_of::<u64>();

/// Size in bytes of an encoded header.
pub const HEADER_SIZE: usize = TAG_SIZE + LEN_SIZE;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    pub tag: WireTag,
    /// Number of payload bytes following the header.
    pub len: usize,
}

impl Header {

    pub fn new(tag: WireTag, len: usize) -> Self {
        Header { tag, len }
    }

    /// Full size of the buffer this header introduces.
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.len
    }

    /// Appends the header to `buf` and returns the number of written bytes
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let len = Self::to_u64(self.len)?;
        buf.extend_from_slice(&(self.tag as u32).to_ne_bytes());
        buf.extend_from_slice(&len.to_ne_bytes());
        Ok(HEADER_SIZE)
    }

    /// Returns the decoded header and the number of consumed bytes
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(Self, usize), DecodeError> {
        let buf = buf.as_ref();
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::Eof);
        }
        let mut tag = [0u8; TAG_SIZE];
        let mut len = [0u8; LEN_SIZE];
        tag.copy_from_slice(&buf[..TAG_SIZE]);
        len.copy_from_slice(&buf[TAG_SIZE..HEADER_SIZE]);
        let tag = WireTag::try_from(u32::from_ne_bytes(tag))?;
        let len = Self::to_usize(u64::from_ne_bytes(len))?;
        if len > usize::MAX - HEADER_SIZE {
            return Err(DecodeError::Length(len as u64));
        }
        Ok((Header { tag, len }, HEADER_SIZE))
    }

    #[inline]
    fn to_usize(value: u64) -> Result<usize, DecodeError> {
        usize::try_from(value).map_err(|_| DecodeError::Length(value))
    }

    #[inline]
    fn to_u64(value: usize) -> Result<u64, EncodeError> {
        u64::try_from(value).map_err(|_| EncodeError::Length(value))
    }

}
