//! # luaweave - Lua templates for markup rendering
//!
//! `luaweave` renders markup by running templating logic written in Lua. The
//! host supplies data and a writer; a Lua module turns the data into a
//! document structure; a shared `render` helper streams that structure to the
//! writer without building the whole output in memory first.
//!
//! ## Core Concepts
//!
//! - [`Renderer`]: entry point; `render(writer, data, target)`
//! - [`InstancePool`]: bounded, non-blocking cache of bootstrapped Lua states
//! - [`HostValue`]: structural classification of any `Serialize` value
//! - [`marshal`]: conversion of a [`HostValue`] into Lua values
//! - [`resolve`]: mapping of target names to module paths (`blog/` → `blog/index`)
//! - [`RendererConfig`]: directories, pool sizing and bootstrap, loadable from YAML
//!
//! ## Quick Start
//!
//! Given `lua/endpoints/content.lua`:
//!
//! ```lua
//! local t = tags
//! return function(data)
//!   return t.html {
//!     t.body { t.h1 { data.title } },
//!   }
//! end
//! ```
//!
//! render it from Rust:
//!
//! ```rust,no_run
//! use luaweave::Renderer;
//! use std::collections::HashMap;
//!
//! let renderer = Renderer::new();
//! let data = HashMap::from([("title", "Hi")]);
//!
//! let mut out = Vec::new();
//! renderer.render(&mut out, &data, "content")?;
//! assert_eq!(out, b"<html><body><h1>Hi</h1></body></html>\n");
//! # Ok::<(), luaweave::RenderError>(())
//! ```
//!
//! ## Structures
//!
//! The built-in runtime renders tables shaped like
//! `{ __name = "a", href = "/", "link text" }`: `__name` is the element,
//! string keys are attributes, array entries are children. Tables without
//! `__name` are fragments. Strings are HTML-escaped unless wrapped with
//! `raw(...)`. The `tags` table builds elements (`tags.div { ... }`), and
//! `each(list, fn)` maps a sequence into a fragment.
//!
//! ## Pooling
//!
//! States are not reused by default: each render opens and closes its own.
//! Enable reuse with [`RendererConfig::with_reuse`]; the pool then keeps up to
//! [`capacity`](RendererConfig::capacity) idle states. Reused states keep
//! their globals and `package.loaded`, so templates are loaded once per state.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Unsupported data values are reported at `warn`, bootstrap failures at
//! `error`, pool activity at `trace`.

pub mod config;
mod error;
pub mod marshal;
pub mod pool;
mod renderer;
pub mod resolve;
pub mod runtime;
pub mod sink;
pub mod value;

pub use config::RendererConfig;
pub use error::{ConfigError, RenderError, RenderStage};
pub use marshal::{marshal, PLACEHOLDER};
pub use pool::{Instance, InstancePool, PoolStats, PooledInstance, DEFAULT_CAPACITY};
pub use renderer::{Renderer, RENDER_HELPER};
pub use resolve::{clean_path, resolve, INDEX_MODULE};
pub use runtime::{Bootstrap, InstanceFactory, BUILTIN_RUNTIME};
pub use value::HostValue;

pub use mlua;
