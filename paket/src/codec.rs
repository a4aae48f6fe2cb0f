//! Built-in encoders and decoders. Fundamental values are stored as their native byte
//! representation, text as its code units followed by a null unit, sequences as a size child
//! followed by one child per element and pairs as exactly two children. Decoding always checks the
//! tag of the buffer against the tag of the requested type before looking at the payload.

use crate::buffer::Buffer;
use crate::class::Classify;
use crate::error::{DecodeError, EncodeError};
use crate::header::WireTag;
use std::fmt;
use std::mem::size_of;
use std::str::from_utf8;

pub trait Encode: Classify {
    fn encode(&self) -> Result<Buffer, EncodeError>;
}

pub trait Decode: Classify + Sized {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError>;
}

/// Encode any supported value into a fresh buffer.
///
/// ```
/// use paket::{encode, decode, WireTag};
///
/// let buf = encode(&vec![(1, "one".to_string()), (2, "two".to_string())]).unwrap();
/// assert_eq!(WireTag::Sequence, buf.tag());
/// let back: Vec<(i32, String)> = decode(&buf).unwrap();
/// assert_eq!(back[1], (2, "two".to_string()));
/// ```
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Buffer, EncodeError> {
    value.encode()
}

pub fn decode<T: Decode>(buffer: &Buffer) -> Result<T, DecodeError> {
    T::decode(buffer)
}

/// Checks tag and width of a fundamental payload.
fn fixed<const N: usize>(buffer: &Buffer, tag: WireTag) -> Result<[u8; N], DecodeError> {
    buffer.expect_tag(tag)?;
    buffer.data().try_into().map_err(|_| DecodeError::PayloadSize { tag, expected: N, found: buffer.data().len() })
}

macro_rules! native {
    ($($t:ty),+) => {
        $(
            impl Encode for $t {
                fn encode(&self) -> Result<Buffer, EncodeError> {
                    Buffer::with_payload(Self::TAG, &self.to_ne_bytes())
                }
            }

            impl Decode for $t {
                fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
                    Ok(<$t>::from_ne_bytes(fixed(buffer, Self::TAG)?))
                }
            }
        )+
    };
}

native!(i32, u64, f32, f64, u8);

impl Encode for bool {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        Buffer::with_payload(Self::TAG, &[*self as u8])
    }
}

impl Decode for bool {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        match fixed::<1>(buffer, Self::TAG)? {
            [0] => Ok(false),
            [1] => Ok(true),
            [b] => Err(DecodeError::InvalidBool(b)),
        }
    }
}

// The size word is always eight bytes on wire, whatever the width of usize.
impl Encode for usize {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        u64::try_from(*self).map_err(|_| EncodeError::Length(*self))?.encode()
    }
}

impl Decode for usize {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        let v = u64::decode(buffer)?;
        usize::try_from(v).map_err(|_| DecodeError::Length(v))
    }
}

impl Encode for char {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        Buffer::with_payload(Self::TAG, &u32::from(*self).to_ne_bytes())
    }
}

impl Decode for char {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        let v = u32::from_ne_bytes(fixed(buffer, Self::TAG)?);
        char::from_u32(v).ok_or(DecodeError::InvalidChar(v))
    }
}

impl Encode for str {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        Buffer::from_parts(Self::TAG, &[self.as_bytes(), &[0]])
    }
}

impl Encode for String {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        self.as_str().encode()
    }
}

impl Decode for String {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        buffer.expect_tag(Self::TAG)?;
        match buffer.data().split_last() {
            Some((&0, text)) => Ok(from_utf8(text)?.to_owned()),
            _ => Err(DecodeError::Unterminated(Self::TAG)),
        }
    }
}

/// Text stored as 32 bit code units, one per unicode scalar value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WideString(pub String);

impl WideString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for WideString {
    fn from(s: String) -> Self {
        WideString(s)
    }
}

impl From<&str> for WideString {
    fn from(s: &str) -> Self {
        WideString(s.to_owned())
    }
}

impl fmt::Display for WideString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Encode for WideString {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        let mut units = Vec::with_capacity((self.0.len() + 1) * size_of::<u32>());
        for c in self.0.chars().chain(std::iter::once('\0')) {
            units.extend_from_slice(&u32::from(c).to_ne_bytes());
        }
        Buffer::with_payload(Self::TAG, &units)
    }
}

impl Decode for WideString {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        buffer.expect_tag(Self::TAG)?;
        let chunks = buffer.data().chunks_exact(size_of::<u32>());
        if !chunks.remainder().is_empty() {
            return Err(DecodeError::Unterminated(Self::TAG));
        }
        let mut units = chunks.map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]])).collect::<Vec<_>>();
        match units.pop() {
            Some(0) => units.into_iter()
                .map(|u| char::from_u32(u).ok_or(DecodeError::InvalidChar(u)))
                .collect::<Result<String, _>>()
                .map(WideString),
            _ => Err(DecodeError::Unterminated(Self::TAG)),
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        let mut children = Vec::with_capacity(self.len() + 1);
        children.push(self.len().encode()?);
        for element in self {
            children.push(element.encode()?);
        }
        Buffer::pack(&children, Self::TAG)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        self.as_slice().encode()
    }
}

/// Splits a `Sequence` buffer and returns its elements, checking them against the leading size
/// child.
pub fn split_sequence(buffer: &Buffer) -> Result<Vec<Buffer>, DecodeError> {
    buffer.expect_tag(WireTag::Sequence)?;
    let mut children = buffer.split()?;
    let count = match children.first() {
        Some(count) if count.tag() == WireTag::Size => usize::decode(count)?,
        _ => return Err(DecodeError::MalformedComposite("sequence does not start with its size")),
    };
    if count != children.len() - 1 {
        return Err(DecodeError::MalformedComposite("sequence size does not match its elements"));
    }
    children.remove(0);
    Ok(children)
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        split_sequence(buffer)?.iter().map(T::decode).collect()
    }
}

impl<A: Encode, B: Encode> Encode for (A, B) {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        Buffer::pack(&[self.0.encode()?, self.1.encode()?], Self::TAG)
    }
}

impl<A: Decode, B: Decode> Decode for (A, B) {
    fn decode(buffer: &Buffer) -> Result<Self, DecodeError> {
        buffer.expect_tag(Self::TAG)?;
        match buffer.split()?.as_slice() {
            [a, b] => Ok((A::decode(a)?, B::decode(b)?)),
            _ => Err(DecodeError::MalformedComposite("pair does not have exactly two children")),
        }
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Result<Buffer, EncodeError> {
        (**self).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, Decode, Encode, WideString};
    use crate::buffer::Buffer;
    use crate::error::DecodeError;
    use crate::header::{WireTag, HEADER_SIZE};
    use std::fmt::Debug;

    fn assert_roundtrip<T: Encode + Decode + PartialEq + Debug>(value: T) {
        let buf = encode(&value).unwrap();
        assert_eq!(T::TAG, buf.tag());
        assert_eq!(HEADER_SIZE + buf.data().len(), buf.size());
        assert_eq!(value, decode::<T>(&buf).unwrap());
    }

    #[test]
    fn scalars() {
        assert_roundtrip(true);
        assert_roundtrip(false);
        for i in [0, 1, -1, i32::MIN, i32::MAX] {
            assert_roundtrip(i);
        }
        assert_roundtrip(0usize);
        assert_roundtrip(usize::MAX);
        assert_roundtrip(u64::MAX);
        assert_roundtrip(std::f32::consts::PI);
        assert_roundtrip(f64::MIN);
        assert_roundtrip(b'x');
        assert_roundtrip('ß');
        assert_roundtrip('\u{1f408}');
    }

    #[test]
    fn scalar_payloads() {
        assert_eq!(&7i32.to_ne_bytes(), encode(&7).unwrap().data());
        assert_eq!(&[1], encode(&true).unwrap().data());
        assert_eq!(&3u64.to_ne_bytes(), encode(&3usize).unwrap().data());
        assert_eq!(&0x41u32.to_ne_bytes(), encode(&'A').unwrap().data());
    }

    #[test]
    fn strings() {
        assert_roundtrip(String::new());
        assert_roundtrip("Üben von Xylophon und Querflöte ist ja zweckmäßig.".to_string());
        assert_eq!(b"Ana\0", encode("Ana").unwrap().data());
        assert_eq!(&[0], encode("").unwrap().data());
    }

    #[test]
    fn wide_strings() {
        assert_roundtrip(WideString::default());
        assert_roundtrip(WideString::from("Prionailurus viverrinus 🐈"));
        let buf = encode(&WideString::from("ab")).unwrap();
        assert_eq!(12, buf.data().len());
        assert_eq!(&0u32.to_ne_bytes(), &buf.data()[8..]);
    }

    #[test]
    fn sequences() {
        assert_roundtrip(Vec::<i32>::new());
        assert_roundtrip(vec![1, 2, 3]);
        assert_roundtrip(vec!["Elen".to_string(), "síla".to_string(), "lúmenn'".to_string()]);
        assert_roundtrip(vec![vec![1.5f64], vec![], vec![2.5, 3.5]]);
    }

    #[test]
    fn sequence_layout() {
        let buf = encode(&vec![1, 2, 3]).unwrap();
        assert_eq!(WireTag::Sequence, buf.tag());
        let children = buf.split().unwrap();
        assert_eq!(4, children.len());
        assert_eq!(encode(&3usize).unwrap(), children[0]);
        assert_eq!(encode(&1).unwrap(), children[1]);
        assert_eq!(encode(&2).unwrap(), children[2]);
        assert_eq!(encode(&3).unwrap(), children[3]);
        assert_eq!(vec![1, 2, 3], decode::<Vec<i32>>(&buf).unwrap());
    }

    #[test]
    fn pairs() {
        assert_roundtrip((1, 'x'));
        assert_roundtrip((vec![1, 2], "two".to_string()));
        let buf = encode(&(true, 2.0f32)).unwrap();
        assert_eq!(WireTag::Pair, buf.tag());
        assert_eq!(2, buf.split().unwrap().len());
    }

    #[test]
    fn deep_nesting() {
        assert_roundtrip(vec![(1, vec![("a".to_string(), vec![true, false])])]);
        assert_roundtrip((vec![(1u8, 2.0f64)], (vec![vec![7usize]], WideString::from("x"))));
    }

    #[test]
    fn references_encode_pointee() {
        let v = 5;
        assert_eq!(encode(&v).unwrap(), encode(&&v).unwrap());
        assert_eq!(encode(&vec!["a".to_string()]).unwrap(), encode(&vec!["a"]).unwrap());
    }

    #[test]
    fn tag_mismatch() {
        let buf = encode("Ana").unwrap();
        assert_eq!(Err(DecodeError::TagMismatch { expected: WireTag::Int, found: WireTag::String }), decode::<i32>(&buf));
        let buf = encode(&1usize).unwrap();
        assert!(matches!(decode::<Vec<i32>>(&buf), Err(DecodeError::TagMismatch { .. })));
        let buf = encode(&vec![1]).unwrap();
        assert!(matches!(decode::<Vec<f32>>(&buf), Err(DecodeError::TagMismatch { expected: WireTag::Float, .. })));
        let buf = encode(&(1, 2)).unwrap();
        assert!(matches!(decode::<(i32, String)>(&buf), Err(DecodeError::TagMismatch { expected: WireTag::String, .. })));
    }

    #[test]
    fn wrong_width() {
        let buf = Buffer::with_payload(WireTag::Int, &[1, 2]).unwrap();
        assert_eq!(Err(DecodeError::PayloadSize { tag: WireTag::Int, expected: 4, found: 2 }), decode::<i32>(&buf));
    }

    #[test]
    fn invalid_fundamentals() {
        let buf = Buffer::with_payload(WireTag::Bool, &[2]).unwrap();
        assert_eq!(Err(DecodeError::InvalidBool(2)), decode::<bool>(&buf));
        let buf = Buffer::with_payload(WireTag::WideChar, &0xd800u32.to_ne_bytes()).unwrap();
        assert_eq!(Err(DecodeError::InvalidChar(0xd800)), decode::<char>(&buf));
    }

    #[test]
    fn invalid_text() {
        let buf = Buffer::with_payload(WireTag::String, b"abc").unwrap();
        assert_eq!(Err(DecodeError::Unterminated(WireTag::String)), decode::<String>(&buf));
        let buf = Buffer::with_payload(WireTag::String, &[]).unwrap();
        assert_eq!(Err(DecodeError::Unterminated(WireTag::String)), decode::<String>(&buf));
        let buf = Buffer::with_payload(WireTag::String, &[0xc3, 0x28, 0]).unwrap();
        assert!(matches!(decode::<String>(&buf), Err(DecodeError::Utf8(_))));
        let buf = Buffer::with_payload(WireTag::WideString, &[0x61, 0, 0]).unwrap();
        assert_eq!(Err(DecodeError::Unterminated(WireTag::WideString)), decode::<WideString>(&buf));
    }

    #[test]
    fn malformed_sequences() {
        let no_size = Buffer::pack(&[encode(&1).unwrap()], WireTag::Sequence).unwrap();
        assert!(matches!(decode::<Vec<i32>>(&no_size), Err(DecodeError::MalformedComposite(_))));
        let empty = Buffer::pack::<Buffer>(&[], WireTag::Sequence).unwrap();
        assert!(matches!(decode::<Vec<i32>>(&empty), Err(DecodeError::MalformedComposite(_))));
        let short = Buffer::pack(&[encode(&2usize).unwrap(), encode(&1).unwrap()], WireTag::Sequence).unwrap();
        assert!(matches!(decode::<Vec<i32>>(&short), Err(DecodeError::MalformedComposite(_))));
        let triple = Buffer::pack(&[encode(&1).unwrap(), encode(&2).unwrap(), encode(&3).unwrap()], WireTag::Pair).unwrap();
        assert!(matches!(decode::<(i32, i32)>(&triple), Err(DecodeError::MalformedComposite(_))));
    }

}
