//! A `Buffer` is the atom of the `paket` format: a header followed by exactly as many payload
//! bytes as the header announces. The buffer owns one contiguous allocation holding both, so it can
//! be handed to a transport or copied into a parent without re-encoding. Composite buffers carry
//! complete child buffers back to back as their payload, which makes every buffer self-describing:
//! its extent never depends on outside context.

use crate::error::{DecodeError, EncodeError};
use crate::header::{Header, WireTag, HEADER_SIZE};
use std::borrow::Borrow;
use std::fmt;
use std::io::{self, Read};

/// The only place where payload memory is requested. Allocation failure aborts the process.
#[inline]
fn allocate(size: usize) -> Vec<u8> {
    Vec::with_capacity(size)
}

/// An encoded value. Moving a buffer transfers its memory, cloning copies it; two live buffers
/// never share bytes. `Buffer::default()` is the empty buffer of size zero, which is also what
/// `std::mem::take` leaves behind.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Buffer {
    tag: WireTag,
    bytes: Vec<u8>,
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer { tag: WireTag::Opaque, bytes: Vec::new() }
    }
}

impl Buffer {

    /// Creates a buffer whose payload is the concatenation of `parts`.
    pub fn from_parts(tag: WireTag, parts: &[&[u8]]) -> Result<Self, EncodeError> {
        let len = parts.iter().try_fold(0usize, |acc, p| acc.checked_add(p.len()))
            .ok_or(EncodeError::Length(usize::MAX))?;
        let header = Header::new(tag, len);
        let mut bytes = allocate(header.size());
        header.encode(&mut bytes)?;
        for part in parts {
            bytes.extend_from_slice(part);
        }
        Ok(Buffer { tag, bytes })
    }

    /// Creates a buffer from a single payload slice.
    pub fn with_payload(tag: WireTag, payload: &[u8]) -> Result<Self, EncodeError> {
        Self::from_parts(tag, &[payload])
    }

    /// Takes ownership of received bytes. The header at their start must announce exactly the
    /// number of bytes that follow it.
    pub fn from_owned(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let (header, _) = Header::decode(&bytes)?;
        let size = header.size();
        if bytes.len() < size {
            Err(DecodeError::Eof)
        } else if bytes.len() > size {
            Err(DecodeError::Trailing(bytes.len() - size))
        } else {
            Ok(Buffer { tag: header.tag, bytes })
        }
    }

    /// Copies the buffer found at the start of `bytes` into fresh memory. Any bytes after the end
    /// of that buffer are ignored, which is how children are cut out of a composite.
    pub fn from_borrowed(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (header, _) = Header::decode(bytes)?;
        let size = header.size();
        if bytes.len() < size {
            return Err(DecodeError::Eof);
        }
        let mut owned = allocate(size);
        owned.extend_from_slice(&bytes[..size]);
        Ok(Buffer { tag: header.tag, bytes: owned })
    }

    /// Total size on wire: header plus payload, zero for the empty buffer.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn tag(&self) -> WireTag {
        self.tag
    }

    /// The payload, without header.
    pub fn data(&self) -> &[u8] {
        self.bytes.get(HEADER_SIZE..).unwrap_or(&[])
    }

    /// The complete wire representation, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Fails with `TagMismatch` unless this buffer carries `expected`.
    pub fn expect_tag(&self, expected: WireTag) -> Result<(), DecodeError> {
        if self.tag == expected {
            Ok(())
        } else {
            Err(DecodeError::TagMismatch { expected, found: self.tag })
        }
    }

    /// Concatenates complete copies of `buffers`, headers included, into the payload of a new
    /// buffer tagged `tag`. The inputs are left untouched.
    /// Fails with `EmptyChild` if any of `buffers` is the empty buffer, which would vanish from
    /// the payload.
    pub fn pack<B: Borrow<Buffer>>(buffers: &[B], tag: WireTag) -> Result<Buffer, EncodeError> {
        if buffers.iter().any(|b| b.borrow().is_empty()) {
            return Err(EncodeError::EmptyChild);
        }
        let parts = buffers.iter().map(|b| b.borrow().as_bytes()).collect::<Vec<_>>();
        Self::from_parts(tag, &parts)
    }

    /// Cuts the payload back into the children `pack` put there, in order.
    pub fn split(&self) -> Result<Vec<Buffer>, DecodeError> {
        let mut children = Vec::new();
        let mut offset = HEADER_SIZE.min(self.bytes.len());
        while offset < self.bytes.len() {
            let child = Self::from_borrowed(&self.bytes[offset..]).map_err(|e| match e {
                DecodeError::Eof => DecodeError::MalformedComposite("child overruns the payload of its parent"),
                DecodeError::UnknownTag(_) => DecodeError::MalformedComposite("child header carries an unknown tag"),
                DecodeError::Length(_) => DecodeError::MalformedComposite("child header announces an impossible length"),
                e => e,
            })?;
            offset += child.size();
            children.push(child);
        }
        Ok(children)
    }

}

impl Buffer {

    /// Reads the payload announced by an already decoded `header` from `reader` and assembles the
    /// complete buffer. A stream ending early yields `UnexpectedEof`.
    pub fn read_payload<R: Read + ?Sized>(header: &Header, reader: &mut R) -> io::Result<Buffer> {
        let mut bytes = allocate(header.size());
        header.encode(&mut bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let read = reader.take(header.len as u64).read_to_end(&mut bytes)?;
        if read != header.len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended inside buffer payload"));
        }
        Ok(Buffer { tag: header.tag, bytes })
    }

}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("tag", &self.tag)
            .field("len", &self.data().len())
            .finish()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
