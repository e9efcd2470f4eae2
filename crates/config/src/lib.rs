//! Configuration loading and schema.
//!
//! Config file: `skein.toml`, searched in `./` then `~/.config/skein/`.
//! Missing or unreadable config falls back to defaults with a warning.

pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{BrowserConfig, EnhanceConfig, PaletteConfig, SessionConfig, SkeinConfig},
};
