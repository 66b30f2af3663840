//! The render orchestrator.
//!
//! A render is two Lua calls on one pooled state. The template module turns
//! the data into a *structure*, then the runtime's `render` helper walks that
//! structure and streams bytes into the caller's writer:
//!
//! ```text
//! target ──resolve──▶ require(path) ──▶ template(data) ──▶ structure
//!                                                            │
//!                      writer ◀── sink ◀── render(structure, sink)
//! ```
//!
//! Every step is a protected call. The first failure ends the render and is
//! returned as [`RenderError::Script`] tagged with its [`RenderStage`]; bytes
//! already streamed stay in the writer. The state goes back to the pool on
//! every path.

use std::io::Write;

use mlua::{Function, Lua, Value};
use serde::Serialize;

use crate::config::RendererConfig;
use crate::error::{ConfigError, RenderError, RenderStage};
use crate::marshal::marshal;
use crate::pool::InstancePool;
use crate::resolve::resolve;
use crate::sink::with_sink;
use crate::value::HostValue;

/// Name of the global helper that serializes a structure.
pub const RENDER_HELPER: &str = "render";

/// Renders Lua templates into writers.
///
/// A `Renderer` is `Send + Sync`; share it between threads and call
/// [`render`](Self::render) concurrently. Each call gets its own interpreter
/// state from the pool.
///
/// # Example
///
/// ```rust,no_run
/// use luaweave::Renderer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Page { title: String }
///
/// let renderer = Renderer::new();
/// let mut out = std::io::stdout();
/// renderer.render(&mut out, &Page { title: "Hi".into() }, "content")?;
/// # Ok::<(), luaweave::RenderError>(())
/// ```
#[derive(Debug)]
pub struct Renderer {
    pool: InstancePool,
}

impl Renderer {
    /// Creates a renderer with the default configuration.
    ///
    /// Templates load from `lua/endpoints`, and states are not reused.
    pub fn new() -> Self {
        Self::from_valid(&RendererConfig::default())
    }

    /// Creates a renderer from `config` after [validating](RendererConfig::validate) it.
    ///
    /// Builder-made configs go through the same checks as YAML ones, so an
    /// endpoints name that would corrupt `package.path` is rejected here.
    pub fn with_config(config: RendererConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(&config))
    }

    fn from_valid(config: &RendererConfig) -> Self {
        let pool = InstancePool::new(config.factory(), config.capacity, config.reuse);
        Self { pool }
    }

    /// Wraps an existing pool.
    pub fn with_pool(pool: InstancePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &InstancePool {
        &self.pool
    }

    /// Renders `target` with `data` into `writer`.
    ///
    /// `data` is classified with [`HostValue::from_serialize`]; pass `&()` for
    /// no data. On success a single `\n` follows the template's output.
    pub fn render<W, T>(&self, writer: &mut W, data: &T, target: &str) -> Result<(), RenderError>
    where
        W: Write + ?Sized,
        T: Serialize + ?Sized,
    {
        self.render_value(writer, &HostValue::from_serialize(data), target)
    }

    /// Renders `target` with an already classified value.
    pub fn render_value<W>(
        &self,
        writer: &mut W,
        data: &HostValue,
        target: &str,
    ) -> Result<(), RenderError>
    where
        W: Write + ?Sized,
    {
        let instance = self.pool.checkout();
        let module = resolve(target);
        let _span = tracing::debug_span!(
            "render",
            requested = %target,
            module = %module,
            instance = instance.id()
        )
        .entered();

        let lua = instance.lua();
        let template = load_template(lua, &module)
            .map_err(|err| RenderError::script(RenderStage::ModuleLoading, &module, err))?;

        let structure = invoke_template(lua, &template, data)
            .map_err(|err| RenderError::script(RenderStage::TemplateInvoking, &module, err))?;

        serialize_structure(lua, structure, writer)
            .map_err(|err| RenderError::script(RenderStage::Rendering, &module, err))?;

        writer.write_all(b"\n")?;
        tracing::debug!("render complete");
        Ok(())
    }

    /// Renders into a new `String`.
    pub fn render_to_string<T>(&self, data: &T, target: &str) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let mut out = Vec::new();
        self.render(&mut out, data, target)?;
        Ok(String::from_utf8(out)?)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn load_template(lua: &Lua, module: &str) -> mlua::Result<Function> {
    let require: Function = lua.globals().get("require")?;
    require.call::<Function>(module)
}

fn invoke_template(lua: &Lua, template: &Function, data: &HostValue) -> mlua::Result<Value> {
    let input = marshal(lua, data)?;
    template.call::<Value>(input)
}

fn serialize_structure<W>(lua: &Lua, structure: Value, writer: &mut W) -> mlua::Result<()>
where
    W: Write + ?Sized,
{
    let render: Function = lua.globals().get(RENDER_HELPER)?;
    with_sink(lua, writer, |sink| render.call::<()>((structure, sink)))
}
