//! A `Record` collects named, already encoded fields. It is how types without a built-in encoding
//! take part in the format: they implement `Opaque` and move their fields in and out of a record
//! by name. On wire a record is an `Opaque` buffer whose children alternate between a text
//! child holding a field name and the buffer of that field. Fields are written in name order.

use crate::buffer::Buffer;
use crate::codec::{Decode, Encode, WideString};
use crate::error::{DecodeError, EncodeError};
use crate::header::WireTag;
use std::collections::btree_map::{BTreeMap, Entry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Buffer>,
}

impl Record {

    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value` and stores it under `name`. Names are unique: adding a name twice fails
    /// and keeps the first value.
    pub fn add<T: Encode + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), EncodeError> {
        if self.fields.contains_key(name) {
            return Err(EncodeError::DuplicateField(name.to_owned()));
        }
        let buffer = value.encode()?;
        self.fields.insert(name.to_owned(), buffer);
        Ok(())
    }

    /// Decodes and removes the field `name`. Returns `Ok(None)` and leaves the record untouched
    /// if there is no such field. A field which fails to decode stays in the record.
    pub fn extract<T: Decode>(&mut self, name: &str) -> Result<Option<T>, DecodeError> {
        match self.peek(name)? {
            Some(value) => {
                self.fields.remove(name);
                Ok(Some(value))
            },
            None => Ok(None),
        }
    }

    /// Decodes the field `name` without removing it.
    pub fn peek<T: Decode>(&self, name: &str) -> Result<Option<T>, DecodeError> {
        self.fields.get(name).map(T::decode).transpose()
    }

    /// Like `extract`, but a missing field is an error.
    pub fn require<T: Decode>(&mut self, name: &str) -> Result<T, DecodeError> {
        self.extract(name)?.ok_or_else(|| DecodeError::MissingField(name.to_owned()))
    }

    /// Stores an already encoded buffer under `name`. The empty buffer is refused with
    /// `EmptyChild`, it would not survive `to_buffer`.
    pub fn insert_buffer(&mut self, name: &str, buffer: Buffer) -> Result<(), EncodeError> {
        if buffer.is_empty() {
            return Err(EncodeError::EmptyChild);
        }
        match self.fields.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(EncodeError::DuplicateField(name.to_owned())),
            Entry::Vacant(v) => {
                v.insert(buffer);
                Ok(())
            },
        }
    }

    /// Takes the undecoded buffer of field `name` out of the record.
    pub fn remove_buffer(&mut self, name: &str) -> Option<Buffer> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Buffer)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_buffer(&self) -> Result<Buffer, EncodeError> {
        let mut children = Vec::with_capacity(self.fields.len() * 2);
        for (name, value) in self.fields.iter() {
            children.push(name.encode()?);
            children.push(value.clone());
        }
        Buffer::pack(&children, WireTag::Opaque)
    }

    pub fn from_buffer(buffer: &Buffer) -> Result<Self, DecodeError> {
        buffer.expect_tag(WireTag::Opaque)?;
        let children = buffer.split()?;
        if children.len() % 2 != 0 {
            return Err(DecodeError::MalformedComposite("record has an odd number of children"));
        }
        let mut fields = BTreeMap::new();
        let mut children = children.into_iter();
        while let (Some(name), Some(value)) = (children.next(), children.next()) {
            let name = match name.tag() {
                WireTag::String => String::decode(&name)?,
                WireTag::WideString => WideString::decode(&name)?.into_string(),
                _ => return Err(DecodeError::MalformedComposite("record field name is not a string")),
            };
            match fields.entry(name) {
                Entry::Occupied(o) => return Err(DecodeError::DuplicateKey(o.key().clone())),
                Entry::Vacant(v) => { v.insert(value); },
            }
        }
        Ok(Record { fields })
    }

}

impl IntoIterator for Record {
    type Item = (String, Buffer);
    type IntoIter = std::collections::btree_map::IntoIter<String, Buffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// The capability of a custom type to describe itself as a set of named fields. Wire the type into
/// `encode`/`decode` with the [`opaque!`](crate::opaque) macro. Implementations must look fields
/// up by name only; field order on wire is not theirs to choose.
pub trait Opaque: Sized {
    fn populate(&self, record: &mut Record) -> Result<(), EncodeError>;
    fn extract_into(record: &mut Record) -> Result<Self, DecodeError>;
}

pub fn encode_opaque<T: Opaque>(value: &T) -> Result<Buffer, EncodeError> {
    let mut record = Record::new();
    value.populate(&mut record)?;
    record.to_buffer()
}

pub fn decode_opaque<T: Opaque>(buffer: &Buffer) -> Result<T, DecodeError> {
    let mut record = Record::from_buffer(buffer)?;
    T::extract_into(&mut record)
}

/// Implements `Classify`, `Encode` and `Decode` for types implementing `Opaque`.
///
/// ```
/// use paket::{opaque, Opaque, Record, EncodeError, DecodeError};
///
/// #[derive(Debug, PartialEq)]
/// struct Cat { name: String, lives: i32 }
///
/// impl Opaque for Cat {
///     fn populate(&self, record: &mut Record) -> Result<(), EncodeError> {
///         record.add("name", &self.name)?;
///         record.add("lives", &self.lives)
///     }
///
///     fn extract_into(record: &mut Record) -> Result<Self, DecodeError> {
///         Ok(Cat { name: record.require("name")?, lives: record.require("lives")? })
///     }
/// }
///
/// opaque!(Cat);
///
/// let cats = vec![Cat { name: "Jessica".into(), lives: 9 }, Cat { name: "Wantan".into(), lives: 7 }];
/// let buf = paket::encode(&cats).unwrap();
/// assert_eq!(cats, paket::decode::<Vec<Cat>>(&buf).unwrap());
/// ```
#[macro_export]
macro_rules! opaque {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::Classify for $t {
                const CATEGORY: $crate::Category = $crate::Category::Opaque;
                const TAG: $crate::WireTag = $crate::WireTag::Opaque;
            }

            impl $crate::Encode for $t {
                fn encode(&self) -> ::std::result::Result<$crate::Buffer, $crate::EncodeError> {
                    $crate::encode_opaque(self)
                }
            }

            impl $crate::Decode for $t {
                fn decode(buffer: &$crate::Buffer) -> ::std::result::Result<Self, $crate::DecodeError> {
                    $crate::decode_opaque(buffer)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::{Opaque, Record};
    use crate::buffer::Buffer;
    use crate::codec::{decode, encode};
    use crate::error::{DecodeError, EncodeError};
    use crate::header::WireTag;

    #[derive(Debug, PartialEq, Clone)]
    struct Person {
        name: String,
        age: i32,
        pets: Vec<Pet>,
    }

    #[derive(Debug, PartialEq, Clone)]
    struct Pet {
        species: String,
        legs: (u8, u8),
    }

    impl Opaque for Person {
        fn populate(&self, record: &mut Record) -> Result<(), EncodeError> {
            record.add("name", &self.name)?;
            record.add("age", &self.age)?;
            record.add("pets", &self.pets)
        }

        fn extract_into(record: &mut Record) -> Result<Self, DecodeError> {
            Ok(Person {
                name: record.require("name")?,
                age: record.require("age")?,
                pets: record.require("pets")?,
            })
        }
    }

    impl Opaque for Pet {
        fn populate(&self, record: &mut Record) -> Result<(), EncodeError> {
            record.add("species", &self.species)?;
            record.add("legs", &self.legs)
        }

        fn extract_into(record: &mut Record) -> Result<Self, DecodeError> {
            Ok(Pet { species: record.require("species")?, legs: record.require("legs")? })
        }
    }

    crate::opaque!(Person, Pet);

    #[test]
    fn duplicate_field() {
        let mut record = Record::new();
        record.add("x", &1).unwrap();
        assert_eq!(Err(EncodeError::DuplicateField("x".to_string())), record.add("x", &2));
        assert_eq!(Some(1), record.peek::<i32>("x").unwrap());
        assert!(record.insert_buffer("x", encode(&3).unwrap()).is_err());
        assert_eq!(Some(1), record.peek::<i32>("x").unwrap());
    }

    #[test]
    fn missing_field() {
        let mut record = Record::new();
        record.add("present", &true).unwrap();
        let before = record.clone();
        assert_eq!(None, record.extract::<i32>("absent").unwrap());
        assert_eq!(None, record.peek::<i32>("absent").unwrap());
        assert_eq!(before, record);
        assert_eq!(Err(DecodeError::MissingField("absent".to_string())), record.require::<i32>("absent"));
    }

    #[test]
    fn peek_then_extract() {
        let mut record = Record::new();
        record.add("name", "Ana").unwrap();
        assert_eq!(Some("Ana".to_string()), record.peek("name").unwrap());
        assert_eq!(Some("Ana".to_string()), record.peek("name").unwrap());
        assert_eq!(Some("Ana".to_string()), record.extract("name").unwrap());
        assert!(!record.contains("name"));
        assert_eq!(None, record.extract::<String>("name").unwrap());
    }

    #[test]
    fn failed_extract_keeps_field() {
        let mut record = Record::new();
        record.add("age", &30).unwrap();
        assert!(matches!(record.extract::<String>("age"), Err(DecodeError::TagMismatch { .. })));
        assert_eq!(Some(30), record.extract::<i32>("age").unwrap());
    }

    #[test]
    fn wire_layout() {
        let mut record = Record::new();
        record.add("name", "Ana").unwrap();
        record.add("age", &30).unwrap();
        let buf = record.to_buffer().unwrap();
        assert_eq!(WireTag::Opaque, buf.tag());
        let children = buf.split().unwrap();
        assert_eq!(4, children.len());
        assert_eq!(encode("age").unwrap(), children[0]);
        assert_eq!(encode(&30).unwrap(), children[1]);
        assert_eq!(encode("name").unwrap(), children[2]);
        assert_eq!(encode("Ana").unwrap(), children[3]);

        let mut back = Record::from_buffer(&buf).unwrap();
        assert_eq!(Some(30), back.extract::<i32>("age").unwrap());
        assert_eq!(None, back.extract::<i32>("age").unwrap());
        assert_eq!(vec!["name"], back.names().collect::<Vec<_>>());
    }

    #[test]
    fn empty_record() {
        let buf = Record::new().to_buffer().unwrap();
        assert!(buf.data().is_empty());
        assert!(Record::from_buffer(&buf).unwrap().is_empty());
    }

    #[test]
    fn buffers_move_unchanged() {
        let inner = encode(&vec![1.0f64, 2.0]).unwrap();
        let mut record = Record::new();
        record.insert_buffer("raw", inner.clone()).unwrap();
        let mut back = Record::from_buffer(&record.to_buffer().unwrap()).unwrap();
        assert_eq!(Some(inner), back.remove_buffer("raw"));
        assert_eq!(None, back.remove_buffer("raw"));
    }

    #[test]
    fn opaque_roundtrip() {
        let person = Person {
            name: "Chandra".to_string(),
            age: 4,
            pets: vec![
                Pet { species: "Prionailurus viverrinus".to_string(), legs: (2, 2) },
                Pet { species: "Lynx lynx".to_string(), legs: (2, 2) },
            ],
        };
        let buf = encode(&person).unwrap();
        assert_eq!(WireTag::Opaque, buf.tag());
        assert_eq!(person, decode::<Person>(&buf).unwrap());
        assert_eq!(vec![person.clone()], decode::<Vec<Person>>(&encode(&vec![person]).unwrap()).unwrap());
    }

    #[test]
    fn opaque_missing_field() {
        let mut record = Record::new();
        record.add("species", "Felis catus").unwrap();
        let buf = record.to_buffer().unwrap();
        assert_eq!(Err(DecodeError::MissingField("legs".to_string())), decode::<Pet>(&buf));
    }

    #[test]
    fn malformed_records() {
        let odd = Buffer::pack(&[encode("a").unwrap()], WireTag::Opaque).unwrap();
        assert!(matches!(Record::from_buffer(&odd), Err(DecodeError::MalformedComposite(_))));

        let bad_name = Buffer::pack(&[encode(&1).unwrap(), encode(&2).unwrap()], WireTag::Opaque).unwrap();
        assert!(matches!(Record::from_buffer(&bad_name), Err(DecodeError::MalformedComposite(_))));

        let dup = Buffer::pack(&[encode("a").unwrap(), encode(&1).unwrap(), encode("a").unwrap(), encode(&2).unwrap()], WireTag::Opaque).unwrap();
        assert_eq!(Err(DecodeError::DuplicateKey("a".to_string())), Record::from_buffer(&dup));

        let seq = encode(&vec![1]).unwrap();
        assert!(matches!(Record::from_buffer(&seq), Err(DecodeError::TagMismatch { expected: WireTag::Opaque, .. })));
    }

    #[test]
    fn empty_buffers_are_refused() {
        let mut value = encode(&1).unwrap();
        let mut record = Record::new();
        record.insert_buffer("x", std::mem::take(&mut value)).unwrap();
        assert_eq!(Err(EncodeError::EmptyChild), record.insert_buffer("y", value));
        assert!(!record.contains("y"));
        let restored = Record::from_buffer(&record.to_buffer().unwrap()).unwrap();
        assert_eq!(record, restored);
    }

    #[test]
    fn wide_names() {
        let wide = Buffer::pack(&[encode(&crate::codec::WideString::from("age")).unwrap(), encode(&30).unwrap()], WireTag::Opaque).unwrap();
        let mut record = Record::from_buffer(&wide).unwrap();
        assert_eq!(Some(30), record.extract::<i32>("age").unwrap());
    }

}
