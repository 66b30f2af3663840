//! Conversion of [`HostValue`] trees into Lua values.
//!
//! The conversion never fails because of a value's kind. Kinds without a Lua
//! counterpart degrade to [`PLACEHOLDER`] and a `warn` event is emitted, so a
//! render with partially unsupported data still produces output. The only
//! error that can come back is the Lua state failing to allocate a string or
//! table.
//!
//! Sequences are stored 1-based, the way Lua's `ipairs` and `#` expect: host
//! element `i` lands at Lua index `i + 1`.

use mlua::{Lua, Table, Value};

use crate::value::HostValue;

/// Value substituted for anything that cannot be represented in Lua.
pub const PLACEHOLDER: Value = Value::Number(0.0);

/// Converts a host value into a value owned by `lua`.
///
/// ```rust
/// use luaweave::{marshal, HostValue};
///
/// let lua = mlua::Lua::new();
/// let value = marshal(&lua, &HostValue::from_serialize(&[10, 20])).unwrap();
/// lua.globals().set("items", value).unwrap();
///
/// let first: f64 = lua.load("return items[1]").eval().unwrap();
/// assert_eq!(first, 10.0);
/// ```
pub fn marshal(lua: &Lua, value: &HostValue) -> mlua::Result<Value> {
    let converted = match value {
        HostValue::Nil => Value::Nil,
        HostValue::Bool(b) => Value::Boolean(*b),
        HostValue::Number(n) => Value::Number(*n),
        HostValue::Text(text) => Value::String(lua.create_string(text)?),
        HostValue::Bytes(bytes) => Value::String(lua.create_string(bytes)?),
        HostValue::Mapping(entries) => mapping_to_table(lua, entries)?,
        HostValue::Sequence(items) => Value::Table(sequence_to_table(lua, items)?),
        HostValue::Unsupported(what) => {
            tracing::warn!(kind = %what, "unsupported host value, substituting placeholder");
            PLACEHOLDER
        }
    };
    Ok(converted)
}

fn mapping_to_table(lua: &Lua, entries: &[(HostValue, HostValue)]) -> mlua::Result<Value> {
    if let Some((key, _)) = entries.iter().find(|(key, _)| key.as_text().is_none()) {
        tracing::warn!(
            key_kind = key.kind(),
            "mapping key is not text, substituting placeholder for the whole mapping"
        );
        return Ok(PLACEHOLDER);
    }

    let table = lua.create_table()?;
    for (key, value) in entries {
        if let Some(key) = key.as_text() {
            table.raw_set(key, marshal(lua, value)?)?;
        }
    }
    Ok(Value::Table(table))
}

fn sequence_to_table(lua: &Lua, items: &[HostValue]) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    for (index, item) in items.iter().enumerate() {
        table.raw_set(index + 1, marshal(lua, item)?)?;
    }
    Ok(table)
}
