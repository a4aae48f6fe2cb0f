//! Conveniently serialize and deserialize your Rust data structures into `paket` buffers.
//!
//! # Mapping
//!
//! Structs become records, so a derived `Serialize` produces exactly the bytes a hand-written
//! [`paket::Record`] with the same fields would. Sequences carry their element count in a leading
//! `Size` child, two-element tuples become pairs. Enum variants without content are written as
//! their name, all others as a record with a single field named after the variant.
//!
//! The wire format knows only 32 bit signed integers, so `i64` values outside that range fail to
//! serialize. Unsigned integers wider than `u8` are widened to `Size`, `u8` itself is a `Char`.
//! Maps have no encoding yet and are rejected in both directions.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub enum Species {
//!     PrionailurusViverrinus,
//!     LynxLynx,
//!     FelisCatus,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub struct Cat {
//!     name: String,
//!     species: Species,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Message {
//!     version: u32,
//!     cats: Vec<Cat>,
//! }
//!
//! let msg = Message {
//!     version: 1,
//!     cats: vec![
//!         Cat { name: "Jessica".to_string(), species: Species::PrionailurusViverrinus },
//!         Cat { name: "Wantan".to_string(), species: Species::LynxLynx },
//!     ],
//! };
//!
//! let buffer = paket_serde::to_buffer(&msg).unwrap();
//! assert_eq!(paket::WireTag::Opaque, buffer.tag());
//!
//! // The buffer is an ordinary record and can be inspected without serde
//! let mut record = paket::Record::from_buffer(&buffer).unwrap();
//! assert_eq!(Some(1u64), record.extract("version").unwrap());
//!
//! let deserialized: Message = paket_serde::from_bytes(buffer.as_bytes()).unwrap();
//! assert_eq!(msg, deserialized);
//! ```

mod de;
mod error;
mod ser;

pub use de::{from_buffer, from_bytes, Deserializer, MAX_DEPTH};
pub use error::{Error, Result};
pub use ser::{to_buffer, to_bytes, Serializer};
