#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use luaweave::{Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test subscriber once. Filter with `LUAWEAVE_LOG`, e.g.
/// `LUAWEAVE_LOG=luaweave=trace cargo test`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = std::env::var("LUAWEAVE_LOG")
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture_config() -> RendererConfig {
    RendererConfig::new().with_base_dir(fixtures_dir())
}

pub fn fixture_renderer() -> Renderer {
    init_tracing();
    Renderer::with_config(fixture_config()).unwrap()
}
