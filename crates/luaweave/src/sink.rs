//! The output sink exposed to Lua as the `write` argument of `render`.
//!
//! The sink is a scoped Lua function: it borrows the caller's writer for the
//! duration of a single [`with_sink`] call and is invalidated when that call
//! returns, so no script can hold on to it afterwards.

use std::io::Write;

use mlua::{Function, Lua, Value, Variadic};

/// Writes each argument to `writer`, left to right, without separators.
///
/// Strings are written as their raw bytes. Every other value goes through the
/// state's own `tostring`, so numbers use the interpreter's formatting and
/// `__tostring` metamethods apply.
pub fn write_args<W>(lua: &Lua, writer: &mut W, args: &[Value]) -> mlua::Result<()>
where
    W: Write + ?Sized,
{
    let mut tostring: Option<Function> = None;
    for arg in args {
        let text = match arg {
            Value::String(s) => s.clone(),
            other => {
                let f = match tostring.take() {
                    Some(f) => f,
                    None => lua.globals().get::<Function>("tostring")?,
                };
                let text = f.call::<mlua::String>(other.clone())?;
                tostring = Some(f);
                text
            }
        };
        writer
            .write_all(&text.as_bytes())
            .map_err(mlua::Error::external)?;
    }
    Ok(())
}

/// Creates a sink bound to `writer` and passes it to `f`.
///
/// A failed write surfaces inside Lua as a runtime error raised by the sink
/// call, so the script's own error handling (or the protected call around it)
/// sees it.
pub fn with_sink<W, R, F>(lua: &Lua, writer: &mut W, f: F) -> mlua::Result<R>
where
    W: Write + ?Sized,
    F: FnOnce(Function) -> mlua::Result<R>,
{
    lua.scope(|scope| {
        let sink = scope.create_function_mut(move |lua, args: Variadic<Value>| {
            write_args(lua, &mut *writer, &args)
        })?;
        f(sink)
    })
}
