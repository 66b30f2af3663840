//! Construction of interpreter states.
//!
//! Every state is opened with Lua's safe standard libraries, gets a
//! `package.path` pointing at the template directories, and then runs the
//! configured [`Bootstrap`] so that the shared `render` helper exists before
//! the first template is loaded. Each state receives its own copy of the
//! helpers; nothing is shared between states.

use std::path::Path;

use mlua::{Function, Lua, Table};
use serde::{Deserialize, Serialize};

/// Source of the built-in `runtime` module.
pub const BUILTIN_RUNTIME: &str = include_str!("runtime.lua");

/// Module name under which the built-in runtime is preloaded.
pub const RUNTIME_MODULE: &str = "runtime";

/// How a freshly opened state receives its helper definitions.
///
/// In YAML configuration this is written as `builtin`, `none`, or
/// `!module <name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bootstrap {
    /// Preload and require the runtime shipped with this crate.
    #[default]
    Builtin,
    /// Require a module found through `package.path`, e.g. `runtime.lua`
    /// in the base directory.
    Module(String),
    /// Run nothing; templates must provide `render` themselves.
    None,
}

/// Builds bootstrapped Lua states.
#[derive(Debug, Clone)]
pub struct InstanceFactory {
    package_path: String,
    bootstrap: Bootstrap,
}

impl InstanceFactory {
    /// Creates a factory that searches `base_dir/endpoints` for templates and
    /// `base_dir` for shared modules.
    pub fn new(base_dir: &Path, endpoints: &str, bootstrap: Bootstrap) -> Self {
        Self {
            package_path: search_path(base_dir, endpoints),
            bootstrap,
        }
    }

    /// The `package.path` value installed in every state.
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// Opens and bootstraps a new state.
    ///
    /// This does not fail. A bootstrap error is logged and the state is
    /// returned anyway; renders on it then fail with the runtime's own message
    /// (typically a missing `render` global).
    pub fn open(&self) -> Lua {
        let lua = Lua::new();
        if let Err(err) = self.prepare(&lua) {
            tracing::error!(
                error = %err,
                bootstrap = ?self.bootstrap,
                "failed to bootstrap interpreter state"
            );
        }
        lua
    }

    fn prepare(&self, lua: &Lua) -> mlua::Result<()> {
        let package: Table = lua.globals().get("package")?;
        package.set("path", self.package_path.as_str())?;

        let module = match &self.bootstrap {
            Bootstrap::None => return Ok(()),
            Bootstrap::Builtin => {
                let preload: Table = package.get("preload")?;
                let loader = lua
                    .load(BUILTIN_RUNTIME)
                    .set_name(format!("={RUNTIME_MODULE}"))
                    .into_function()?;
                preload.set(RUNTIME_MODULE, loader)?;
                RUNTIME_MODULE
            }
            Bootstrap::Module(name) => name.as_str(),
        };

        let require: Function = lua.globals().get("require")?;
        require.call::<()>(module)
    }
}

/// Builds the `package.path` for a template tree.
///
/// Templates resolve as `<base>/<endpoints>/<name>.lua` (or `<name>/init.lua`);
/// shared modules such as a custom runtime resolve as `<base>/<name>.lua`.
pub fn search_path(base_dir: &Path, endpoints: &str) -> String {
    let base = base_dir.to_string_lossy();
    let base = base.trim_end_matches('/');
    let base = if base.is_empty() { "." } else { base };
    format!("{base}/{endpoints}/?.lua;{base}/{endpoints}/?/init.lua;{base}/?.lua")
}
