//! `paket` encodes values into self-describing byte buffers and back. Every value becomes a
//! [`Buffer`]: a header made of a [`WireTag`] and a payload length, followed by the payload.
//! Sequences, pairs and records carry complete child buffers as their payload, so a buffer can be
//! taken apart without knowing its type in advance, while decoding into a concrete type checks the
//! tag at every level.
//!
//! Which encoding a type gets is decided statically by [`Classify`]: fundamental values, text,
//! composites of other encodable types, and opaque types which describe themselves through a
//! [`Record`] of named fields.
//!
//! # A note on byte order
//!
//! Headers and fundamental values are written in the byte order of the host. Buffers are meant to
//! travel between processes of the same architecture; there is no normalisation.
//!
//! # A note on Maps
//!
//! `WireTag::Map` is reserved but no type encodes to it. Records cover keyed data.
//!
//! # Examples
//!
//! ```
//! use paket::*;
//!
//! let buf = encode(&vec![1, 2, 3]).unwrap();
//! assert_eq!(WireTag::Sequence, buf.tag());
//! assert_eq!(buf.size(), HEADER_SIZE + buf.data().len());
//!
//! // A size child followed by one child per element
//! let children = buf.split().unwrap();
//! assert_eq!(4, children.len());
//! assert_eq!(WireTag::Size, children[0].tag());
//! assert_eq!(&2i32.to_ne_bytes(), children[2].data());
//!
//! // Received bytes are reassembled into a buffer and decoded
//! let received = Buffer::from_owned(buf.into_bytes()).unwrap();
//! assert_eq!(vec![1, 2, 3], decode::<Vec<i32>>(&received).unwrap());
//! assert!(matches!(decode::<String>(&received), Err(DecodeError::TagMismatch { .. })));
//! ```
//!
//! Raw pointers have no encoding, so their address can never end up on wire by accident:
//!
//! ```compile_fail
//! let value = 5;
//! let ptr: *const i32 = &value;
//! paket::encode(&ptr);
//! ```

mod buffer;
mod class;
mod codec;
mod display;
mod error;
mod header;
mod record;

pub use buffer::*;
pub use class::*;
pub use codec::*;
pub use error::*;
pub use header::*;
pub use record::*;
