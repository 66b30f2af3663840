//! Property-based tests for host-to-Lua marshalling.

use std::collections::BTreeMap;

use luaweave::mlua::{Lua, Table, Value};
use luaweave::{marshal, HostValue};
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

/// Checks a Lua value against the host value it was built from, using only
/// Lua-side inspection (raw gets, lengths and pair iteration).
fn assert_equivalent(lua_value: &Value, host: &HostValue) -> Result<(), TestCaseError> {
    match (host, lua_value) {
        (HostValue::Nil, Value::Nil) => Ok(()),
        (HostValue::Bool(expected), Value::Boolean(actual)) => {
            prop_assert_eq!(expected, actual);
            Ok(())
        }
        (HostValue::Number(expected), Value::Number(actual)) => {
            prop_assert_eq!(expected, actual);
            Ok(())
        }
        // Whole-valued numbers read back through the API as integers.
        (HostValue::Number(expected), Value::Integer(actual)) => {
            prop_assert_eq!(*expected, *actual as f64);
            Ok(())
        }
        (HostValue::Text(expected), Value::String(actual)) => {
            prop_assert_eq!(expected.as_bytes(), &actual.as_bytes()[..]);
            Ok(())
        }
        (HostValue::Mapping(entries), Value::Table(table)) => {
            let mut seen = 0usize;
            for pair in table.clone().pairs::<String, Value>() {
                let (key, _) = pair.map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert!(entries.iter().any(|(k, _)| k.as_text() == Some(key.as_str())));
                seen += 1;
            }
            prop_assert_eq!(seen, entries.len());
            for (key, value) in entries {
                let key = key.as_text().ok_or_else(|| TestCaseError::fail("non-text key"))?;
                let stored: Value = raw_get(table, key)?;
                assert_equivalent(&stored, value)?;
            }
            Ok(())
        }
        (HostValue::Sequence(items), Value::Table(table)) => {
            prop_assert_eq!(table.raw_len(), items.len());
            let zeroth: Value = raw_get(table, 0)?;
            prop_assert!(zeroth.is_nil());
            for (index, item) in items.iter().enumerate() {
                let stored: Value = raw_get(table, index + 1)?;
                assert_equivalent(&stored, item)?;
            }
            Ok(())
        }
        (host, other) => Err(TestCaseError::fail(format!(
            "{} marshalled to {}",
            host.kind(),
            other.type_name()
        ))),
    }
}

fn raw_get<K: luaweave::mlua::IntoLua>(table: &Table, key: K) -> Result<Value, TestCaseError> {
    table
        .raw_get(key)
        .map_err(|e| TestCaseError::fail(e.to_string()))
}

fn leaf() -> impl Strategy<Value = HostValue> {
    prop_oneof![
        any::<i32>().prop_map(|n| HostValue::Number(n.into())),
        (-1.0e12f64..1.0e12).prop_map(HostValue::Number),
        "[a-zA-Z0-9 <>&]{0,12}".prop_map(HostValue::Text),
        any::<bool>().prop_map(HostValue::Bool),
    ]
}

fn host_value() -> impl Strategy<Value = HostValue> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(HostValue::Sequence),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6).prop_map(|map| {
                HostValue::Mapping(
                    map.into_iter()
                        .map(|(k, v)| (HostValue::Text(k), v))
                        .collect(),
                )
            }),
        ]
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Every supported value survives marshalling with its shape intact.
    #[test]
    fn marshalled_values_match_lua_inspection(host in host_value()) {
        let lua = Lua::new();
        let value = marshal(&lua, &host).map_err(|e| TestCaseError::fail(e.to_string()))?;
        assert_equivalent(&value, &host)?;
    }

    /// Integers within double range read back exactly from Lua code.
    #[test]
    fn integers_read_back_exactly(n in -(1i64 << 53)..(1i64 << 53)) {
        let lua = Lua::new();
        let value = marshal(&lua, &HostValue::from_serialize(&n)).unwrap();
        lua.globals().set("n", value).unwrap();
        let doubled: f64 = lua.load("return n * 2").eval().unwrap();
        prop_assert_eq!(doubled, (n as f64) * 2.0);
    }

    /// Sequence element i is visible to Lua at index i + 1.
    #[test]
    fn sequence_indices_shift_by_one(items in prop::collection::vec("[a-z]{1,5}", 1..10)) {
        let lua = Lua::new();
        let value = marshal(&lua, &HostValue::from_serialize(&items)).unwrap();
        lua.globals().set("items", value).unwrap();
        for (i, item) in items.iter().enumerate() {
            let got: String = lua.load(format!("return items[{}]", i + 1)).eval().unwrap();
            prop_assert_eq!(&got, item);
        }
        let count: usize = lua.load("return #items").eval().unwrap();
        prop_assert_eq!(count, items.len());
    }

    /// String-keyed maps keep exactly their key set.
    #[test]
    fn map_keys_survive(map in prop::collection::btree_map("[a-z]{1,6}", any::<u16>(), 0..8)) {
        let lua = Lua::new();
        let value = marshal(&lua, &HostValue::from_serialize(&map)).unwrap();
        let Value::Table(table) = value else {
            return Err(TestCaseError::fail("mapping did not become a table"));
        };
        let mut back = BTreeMap::new();
        for pair in table.pairs::<String, f64>() {
            let (k, v) = pair.unwrap();
            back.insert(k, v);
        }
        let expected: BTreeMap<String, f64> =
            map.into_iter().map(|(k, v)| (k, f64::from(v))).collect();
        prop_assert_eq!(back, expected);
    }
}

#[test]
fn test_whole_numbers_nested_in_tables_compare_equal() {
    let host = HostValue::Sequence(vec![HostValue::Mapping(vec![(
        HostValue::from("_"),
        HostValue::Number(0.0),
    )])]);
    let lua = Lua::new();
    let value = marshal(&lua, &host).unwrap();
    assert_equivalent(&value, &host).unwrap();
}
