//! Error types for rendering and configuration.
//!
//! [`RenderError`] is returned by every [`Renderer`](crate::Renderer) entry
//! point. Script failures keep the original [`mlua::Error`] as their source so
//! the runtime's message reaches the caller unchanged, tagged with the
//! [`RenderStage`] that produced it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The phase of a render call in which a script failure happened.
///
/// A render walks these stages in order. The first failure stops the call;
/// no later stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Resolving the target through `require` and obtaining the template function.
    ModuleLoading,
    /// Calling the template function with the marshalled data.
    TemplateInvoking,
    /// Calling the runtime's `render` helper with the structure and the sink.
    Rendering,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStage::ModuleLoading => write!(f, "module loading"),
            RenderStage::TemplateInvoking => write!(f, "template invocation"),
            RenderStage::Rendering => write!(f, "rendering"),
        }
    }
}

/// Error type for render operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The Lua runtime reported a failure during one of the render stages.
    #[error("{stage} failed for `{target}`: {source}")]
    Script {
        stage: RenderStage,
        /// The resolved module path that was being rendered.
        target: String,
        #[source]
        source: mlua::Error,
    },

    /// Writing to the output failed outside of script execution.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The rendered bytes were not valid UTF-8 (only from `render_to_string`).
    #[error("rendered output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl RenderError {
    pub(crate) fn script(stage: RenderStage, target: &str, source: mlua::Error) -> Self {
        RenderError::Script {
            stage,
            target: target.to_string(),
            source,
        }
    }

    /// Returns the stage that failed, if this is a script error.
    pub fn stage(&self) -> Option<RenderStage> {
        match self {
            RenderError::Script { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Errors raised while loading a [`RendererConfig`](crate::RendererConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML document did not match the configuration schema.
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field holds a value the renderer cannot use.
    #[error("invalid config: {0}")]
    Invalid(String),
}
