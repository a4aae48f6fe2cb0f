use serde::{ser, Serialize};
use paket::{Buffer, Encode, Record, WireTag};
use std::convert::TryFrom;

use crate::error::{Error, Result};

/// Serializes into a single `Buffer`. Compound values collect their children first and are
/// packed once all of them are known.
pub struct Serializer;

pub fn to_buffer<T: ?Sized + Serialize>(value: &T) -> Result<Buffer> {
    value.serialize(Serializer)
}

pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(to_buffer(value)?.into_bytes())
}

/// Wraps the buffer of an enum variant's content into a record with a single field named after
/// the variant.
fn variant(name: &'static str, content: Buffer) -> Result<Buffer> {
    let mut record = Record::new();
    record.insert_buffer(name, content)?;
    Ok(record.to_buffer()?)
}

impl ser::Serializer for Serializer {

    type Ok = Buffer;
    type Error = Error;
    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = VariantSerializer<SeqSerializer>;
    type SerializeMap = ser::Impossible<Buffer, Error>;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = VariantSerializer<StructSerializer>;

    fn serialize_bool(self, v: bool) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_i8(self, v: i8) -> Result<Buffer> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Buffer> {
        self.serialize_i32(i32::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_i64(self, v: i64) -> Result<Buffer> {
        self.serialize_i32(i32::try_from(v)?)
    }

    fn serialize_u8(self, v: u8) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_u16(self, v: u16) -> Result<Buffer> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Buffer> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_f32(self, v: f32) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_f64(self, v: f64) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_char(self, v: char) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_str(self, v: &str) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Buffer> {
        Ok(v.encode()?)
    }

    fn serialize_none(self) -> Result<Buffer> {
        SeqSerializer::sequence(Some(0)).finish()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Buffer> {
        let mut seq = SeqSerializer::sequence(Some(1));
        seq.push(value)?;
        seq.finish()
    }

    fn serialize_unit(self) -> Result<Buffer> {
        Ok(Record::new().to_buffer()?)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Buffer> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<Buffer> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<Buffer> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, name: &'static str, value: &T) -> Result<Buffer> {
        variant(name, value.serialize(Serializer)?)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer::sequence(len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(SeqSerializer::tuple(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_tuple(len)
    }

    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, name: &'static str, len: usize) -> Result<Self::SerializeTupleVariant> {
        Ok(VariantSerializer { name, inner: SeqSerializer::tuple(len) })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::Unsupported("maps"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructSerializer { record: Record::new() })
    }

    fn serialize_struct_variant(self, _name: &'static str, _index: u32, name: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        Ok(VariantSerializer { name, inner: StructSerializer { record: Record::new() } })
    }

}

/// Sequences get a leading size child, pairs do not.
pub struct SeqSerializer {
    tag: WireTag,
    children: Vec<Buffer>,
}

impl SeqSerializer {

    fn sequence(len: Option<usize>) -> Self {
        SeqSerializer { tag: WireTag::Sequence, children: Vec::with_capacity(len.unwrap_or(0)) }
    }

    fn tuple(len: usize) -> Self {
        match len {
            2 => SeqSerializer { tag: WireTag::Pair, children: Vec::with_capacity(2) },
            _ => Self::sequence(Some(len)),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.children.push(value.serialize(Serializer)?);
        Ok(())
    }

    fn finish(self) -> Result<Buffer> {
        match self.tag {
            WireTag::Sequence => {
                let mut children = Vec::with_capacity(self.children.len() + 1);
                children.push(self.children.len().encode()?);
                children.extend(self.children);
                Ok(Buffer::pack(&children, WireTag::Sequence)?)
            },
            tag => Ok(Buffer::pack(&self.children, tag)?),
        }
    }

}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Buffer;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Buffer> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Buffer;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Buffer> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Buffer;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Buffer> {
        self.finish()
    }
}

pub struct StructSerializer {
    record: Record,
}

impl ser::SerializeStruct for StructSerializer {
    type Ok = Buffer;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        Ok(self.record.insert_buffer(key, value.serialize(Serializer)?)?)
    }

    fn end(self) -> Result<Buffer> {
        Ok(self.record.to_buffer()?)
    }
}

pub struct VariantSerializer<S> {
    name: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for VariantSerializer<SeqSerializer> {
    type Ok = Buffer;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> Result<Buffer> {
        variant(self.name, self.inner.finish()?)
    }
}

impl ser::SerializeStructVariant for VariantSerializer<StructSerializer> {
    type Ok = Buffer;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Buffer> {
        variant(self.name, ser::SerializeStruct::end(self.inner)?)
    }
}
