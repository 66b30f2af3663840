//! Host-side data model handed to templates.
//!
//! Templates receive their data as Lua values, but the conversion is split in
//! two steps. First any [`Serialize`] value is classified by its *structural*
//! kind into a [`HostValue`] (see [`HostValue::from_serialize`]). Then the
//! [`marshal`](crate::marshal) module turns that tree into Lua values inside a
//! specific interpreter state.
//!
//! Classifying through serde means the shape of the data decides the outcome,
//! not its nominal Rust type: a `HashMap<String, _>`, a `BTreeMap<String, _>`,
//! a `serde_json::Value::Object` and a plain struct all become
//! [`HostValue::Mapping`].
//!
//! | Rust shape                                  | HostValue            |
//! |---------------------------------------------|----------------------|
//! | `()`, `None`, unit structs                  | `Nil`                |
//! | `bool`                                      | `Bool`               |
//! | every integer and float width               | `Number` (as `f64`)  |
//! | `str`, `String`, `char`, unit enum variants | `Text`               |
//! | `serialize_bytes` (e.g. `serde_bytes`)      | `Bytes`              |
//! | maps, structs                               | `Mapping`            |
//! | `Vec`, slices, tuples, tuple structs        | `Sequence`           |
//! | enum variants carrying data                 | `Unsupported`        |
//!
//! Note that a plain `Vec<u8>` serializes as a sequence of numbers. Use
//! [`HostValue::bytes`] (or a type that calls `serialize_bytes`) to pass a
//! byte buffer as text.

mod ser;

use serde::Serialize;

pub use ser::{HostValueSerializer, Unrepresentable};

/// A host value classified by structural kind.
///
/// Mapping entries keep the key as a `HostValue` so that non-text keys survive
/// classification and can be diagnosed during marshalling.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// The absent value.
    Nil,
    Bool(bool),
    /// Any numeric kind, widened or narrowed to a double.
    Number(f64),
    Text(String),
    /// A byte buffer, delivered to Lua as a string of the same bytes.
    Bytes(Vec<u8>),
    /// Key/value pairs; order carries no meaning.
    Mapping(Vec<(HostValue, HostValue)>),
    /// Ordered elements.
    Sequence(Vec<HostValue>),
    /// A value with no Lua counterpart, with a short description of what it was.
    Unsupported(String),
}

impl HostValue {
    /// Classifies any serializable value.
    ///
    /// This never fails: if the value's `Serialize` implementation reports an
    /// error, the result is [`HostValue::Unsupported`] carrying the message.
    ///
    /// ```rust
    /// use luaweave::HostValue;
    /// use std::collections::BTreeMap;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("title", "Hi");
    ///
    /// let value = HostValue::from_serialize(&map);
    /// assert_eq!(
    ///     value,
    ///     HostValue::Mapping(vec![(HostValue::from("title"), HostValue::from("Hi"))]),
    /// );
    /// ```
    pub fn from_serialize<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        value
            .serialize(HostValueSerializer)
            .unwrap_or_else(|err| HostValue::Unsupported(err.to_string()))
    }

    /// Wraps a byte buffer.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        HostValue::Bytes(bytes.into())
    }

    /// Short name of the structural kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Nil => "nil",
            HostValue::Bool(_) => "bool",
            HostValue::Number(_) => "number",
            HostValue::Text(_) => "text",
            HostValue::Bytes(_) => "bytes",
            HostValue::Mapping(_) => "mapping",
            HostValue::Sequence(_) => "sequence",
            HostValue::Unsupported(_) => "unsupported",
        }
    }

    /// Returns the text if this is a [`HostValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            HostValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for HostValue {
    fn from(text: &str) -> Self {
        HostValue::Text(text.to_string())
    }
}

impl From<String> for HostValue {
    fn from(text: String) -> Self {
        HostValue::Text(text)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        HostValue::Number(n as f64)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::Nil, Into::into)
    }
}
