//! A serde [`Serializer`](ser::Serializer) that classifies values into [`HostValue`].
//!
//! Failures are contained where they happen: a field or element whose
//! `Serialize` impl errors becomes [`HostValue::Unsupported`] in place, and the
//! rest of the tree is still classified.

use std::fmt;

use serde::ser::{self, Serialize};

use super::HostValue;

/// Error produced by a `Serialize` implementation while classifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unrepresentable(String);

impl fmt::Display for Unrepresentable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Unrepresentable {}

impl ser::Error for Unrepresentable {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Unrepresentable(msg.to_string())
    }
}

/// Serializer whose output is a [`HostValue`].
///
/// Most callers want [`HostValue::from_serialize`], which also absorbs a
/// top-level error.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostValueSerializer;

fn classify<T: Serialize + ?Sized>(value: &T) -> HostValue {
    HostValue::from_serialize(value)
}

impl ser::Serializer for HostValueSerializer {
    type Ok = HostValue;
    type Error = Unrepresentable;

    type SerializeSeq = SequenceBuilder;
    type SerializeTuple = SequenceBuilder;
    type SerializeTupleStruct = SequenceBuilder;
    type SerializeTupleVariant = DiscardVariant;
    type SerializeMap = MappingBuilder;
    type SerializeStruct = MappingBuilder;
    type SerializeStructVariant = DiscardVariant;

    fn serialize_bool(self, v: bool) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v as f64))
    }

    fn serialize_i128(self, v: i128) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v as f64))
    }

    fn serialize_u8(self, v: u8) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v as f64))
    }

    fn serialize_u128(self, v: u128) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v as f64))
    }

    fn serialize_f32(self, v: f32) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Number(v))
    }

    fn serialize_char(self, v: char) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Nil)
    }

    fn serialize_some<T>(self, value: &T) -> Result<HostValue, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<HostValue, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<HostValue, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(HostValue::Unsupported(format!("enum variant {name}::{variant}")))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SequenceBuilder, Self::Error> {
        Ok(SequenceBuilder::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SequenceBuilder, Self::Error> {
        Ok(SequenceBuilder::with_capacity(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SequenceBuilder, Self::Error> {
        Ok(SequenceBuilder::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<DiscardVariant, Self::Error> {
        Ok(DiscardVariant::new(name, variant))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MappingBuilder, Self::Error> {
        Ok(MappingBuilder::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<MappingBuilder, Self::Error> {
        Ok(MappingBuilder::with_capacity(len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<DiscardVariant, Self::Error> {
        Ok(DiscardVariant::new(name, variant))
    }
}

/// Collects sequence, tuple and tuple-struct elements.
pub struct SequenceBuilder {
    items: Vec<HostValue>,
}

impl SequenceBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
        }
    }
}

impl ser::SerializeSeq for SequenceBuilder {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(classify(value));
        Ok(())
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Sequence(self.items))
    }
}

impl ser::SerializeTuple for SequenceBuilder {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SequenceBuilder {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        ser::SerializeSeq::end(self)
    }
}

/// Collects map entries and struct fields.
pub struct MappingBuilder {
    entries: Vec<(HostValue, HostValue)>,
    pending_key: Option<HostValue>,
}

impl MappingBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            entries: Vec::with_capacity(len),
            pending_key: None,
        }
    }
}

impl ser::SerializeMap for MappingBuilder {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.pending_key = Some(classify(key));
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Unrepresentable("map value serialized before its key".into()))?;
        self.entries.push((key, classify(value)));
        Ok(())
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Mapping(self.entries))
    }
}

impl ser::SerializeStruct for MappingBuilder {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.entries
            .push((HostValue::Text(key.to_string()), classify(value)));
        Ok(())
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Mapping(self.entries))
    }
}

/// Swallows the fields of a data-carrying enum variant.
pub struct DiscardVariant {
    description: String,
}

impl DiscardVariant {
    fn new(name: &str, variant: &str) -> Self {
        Self {
            description: format!("enum variant {name}::{variant}"),
        }
    }
}

impl ser::SerializeTupleVariant for DiscardVariant {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_field<T>(&mut self, _value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Unsupported(self.description))
    }
}

impl ser::SerializeStructVariant for DiscardVariant {
    type Ok = HostValue;
    type Error = Unrepresentable;

    fn serialize_field<T>(&mut self, _key: &'static str, _value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(())
    }

    fn end(self) -> Result<HostValue, Self::Error> {
        Ok(HostValue::Unsupported(self.description))
    }
}
