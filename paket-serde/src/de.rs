use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::de::value::StringDeserializer;
use serde::Deserialize;
use paket::{split_sequence, Buffer, Decode, Record, WideString, WireTag};
use std::convert::TryInto;

use crate::error::{Error, Result};

/// Composites nested deeper than this fail with `Error::Depth`.
pub const MAX_DEPTH: usize = 128;

/// Deserializes from a single `Buffer`. Children are split off their parent eagerly and handed to
/// a fresh deserializer each, so every level owns exactly the bytes it describes.
pub struct Deserializer {
    buffer: Buffer,
    depth: usize,
}

impl Deserializer {
    pub fn new(buffer: Buffer) -> Self {
        Deserializer { buffer, depth: 0 }
    }
}

pub fn from_buffer<T: DeserializeOwned>(buffer: &Buffer) -> Result<T> {
    T::deserialize(Deserializer::new(buffer.clone()))
}

/// Expects `bytes` to hold exactly one buffer, trailing bytes are an error.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    T::deserialize(Deserializer::new(Buffer::from_owned(bytes.to_vec())?))
}

impl Deserializer {

    #[inline]
    fn decode<T: Decode>(&self) -> Result<T> {
        Ok(T::decode(&self.buffer)?)
    }

    fn decode_string(&self) -> Result<String> {
        match self.buffer.tag() {
            WireTag::String => self.decode::<String>(),
            WireTag::WideString => Ok(self.decode::<WideString>()?.into_string()),
            o => Err(Error::UnexpectedTag(&[WireTag::String, WireTag::WideString], o)),
        }
    }

    fn decode_record(&self) -> Result<Record> {
        Ok(Record::from_buffer(&self.buffer)?)
    }

    /// Depth of the children of the current buffer.
    fn nest(&self) -> Result<usize> {
        if self.depth >= MAX_DEPTH {
            Err(Error::Depth(MAX_DEPTH))
        } else {
            Ok(self.depth + 1)
        }
    }

    fn elements(&self) -> Result<Vec<Buffer>> {
        match self.buffer.tag() {
            WireTag::Sequence => Ok(split_sequence(&self.buffer)?),
            WireTag::Pair => Ok(self.buffer.split()?),
            o => Err(Error::UnexpectedTag(&[WireTag::Sequence, WireTag::Pair], o)),
        }
    }

}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.buffer.tag() {
            WireTag::Bool => visitor.visit_bool(self.decode()?),
            WireTag::Int => visitor.visit_i32(self.decode()?),
            WireTag::Size => visitor.visit_u64(self.decode()?),
            WireTag::Float => visitor.visit_f32(self.decode()?),
            WireTag::Double => visitor.visit_f64(self.decode()?),
            WireTag::Char => visitor.visit_u8(self.decode()?),
            WireTag::WideChar => visitor.visit_char(self.decode()?),
            WireTag::String | WireTag::WideString => visitor.visit_string(self.decode_string()?),
            WireTag::Sequence | WireTag::Pair => {
                let depth = self.nest()?;
                visitor.visit_seq(SeqDeserializer::new(self.elements()?, depth))
            },
            WireTag::Opaque => {
                let depth = self.nest()?;
                visitor.visit_map(RecordDeserializer::new(self.decode_record()?, depth))
            },
            WireTag::Map => Err(Error::Unsupported("maps")),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.decode()?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.decode::<i32>()?.try_into()?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i16(self.decode::<i32>()?.try_into()?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.decode()?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(i64::from(self.decode::<i32>()?))
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(self.decode()?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u16(self.decode::<u64>()?.try_into()?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.decode::<u64>()?.try_into()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(self.decode()?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.decode()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.decode()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.buffer.tag() {
            WireTag::WideChar => visitor.visit_char(self.decode()?),
            WireTag::Char => visitor.visit_char(char::from(self.decode::<u8>()?)),
            o => Err(Error::UnexpectedTag(&[WireTag::WideChar, WireTag::Char], o)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.decode_string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.decode_string()?)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_byte_buf(self.decode()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_byte_buf(self.decode()?)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let depth = self.nest()?;
        let mut elements = split_sequence(&self.buffer)?;
        match (elements.pop(), elements.is_empty()) {
            (None, _) => visitor.visit_none(),
            (Some(buffer), true) => visitor.visit_some(Deserializer { buffer, depth }),
            (Some(_), false) => Err(de::Error::invalid_length(elements.len() + 1, &"at most one element")),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let record = self.decode_record()?;
        if record.is_empty() {
            visitor.visit_unit()
        } else {
            Err(de::Error::invalid_length(record.len(), &"an empty record"))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let depth = self.nest()?;
        visitor.visit_seq(SeqDeserializer::new(self.elements()?, depth))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        let expected = if len == 2 { WireTag::Pair } else { WireTag::Sequence };
        self.buffer.expect_tag(expected)?;
        let depth = self.nest()?;
        let elements = self.elements()?;
        if elements.len() != len {
            return Err(de::Error::invalid_length(elements.len(), &visitor));
        }
        visitor.visit_seq(SeqDeserializer::new(elements, depth))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self, _name: &'static str, len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("maps"))
    }

    fn deserialize_struct<V: Visitor<'de>>(self, _name: &'static str, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        let depth = self.nest()?;
        visitor.visit_map(RecordDeserializer::new(self.decode_record()?, depth))
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.buffer.tag() {
            WireTag::String | WireTag::WideString => visitor.visit_enum(self.decode_string()?.into_deserializer()),
            WireTag::Opaque => {
                let depth = self.nest()?;
                let record = self.decode_record()?;
                if record.len() != 1 {
                    return Err(Error::Variant(record.len()));
                }
                match record.into_iter().next() {
                    Some((variant, content)) => visitor.visit_enum(EnumDeserializer { variant, content, depth }),
                    None => Err(Error::Variant(0)),
                }
            },
            o => Err(Error::UnexpectedTag(&[WireTag::String, WireTag::WideString, WireTag::Opaque], o)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

}

struct SeqDeserializer {
    elements: std::vec::IntoIter<Buffer>,
    depth: usize,
}

impl SeqDeserializer {
    fn new(elements: Vec<Buffer>, depth: usize) -> Self {
        SeqDeserializer { elements: elements.into_iter(), depth }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.elements.next() {
            Some(buffer) => seed.deserialize(Deserializer { buffer, depth: self.depth }).map(Some),
            None => Ok(None),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len())
    }
}

/// Hands out the fields of a record in name order. Field names are owned strings, so identifiers
/// are visited as such.
struct RecordDeserializer {
    fields: std::collections::btree_map::IntoIter<String, Buffer>,
    value: Option<Buffer>,
    depth: usize,
}

impl RecordDeserializer {
    fn new(record: Record, depth: usize) -> Self {
        RecordDeserializer { fields: record.into_iter(), value: None, depth }
    }
}

impl<'de> MapAccess<'de> for RecordDeserializer {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.fields.next() {
            Some((name, value)) => {
                self.value = Some(value);
                seed.deserialize(name.into_deserializer()).map(Some)
            },
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        match self.value.take() {
            Some(buffer) => seed.deserialize(Deserializer { buffer, depth: self.depth }),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

struct EnumDeserializer {
    variant: String,
    content: Buffer,
    depth: usize,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = Deserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let deserializer: StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, Deserializer { buffer: self.content, depth: self.depth }))
    }
}

impl<'de> VariantAccess<'de> for Deserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        <()>::deserialize(self)
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_tuple(self, len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(self, "", fields, visitor)
    }
}
