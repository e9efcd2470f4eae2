use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::SkeinConfig;

/// Standard config file name.
const CONFIG_FILENAME: &str = "skein.toml";

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<SkeinConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./skein.toml` (project-local)
/// 2. `~/.config/skein/skein.toml` (user-global)
///
/// Returns `SkeinConfig::default()` if no config file is found.
pub fn discover_and_load(override_dir: Option<&Path>) -> SkeinConfig {
    if let Some(path) = find_config_file(override_dir) {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SkeinConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file(override_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = override_dir {
        let p = dir.join(CONFIG_FILENAME);
        return p.exists().then_some(p);
    }

    // Project-local
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    // User-global: ~/.config/skein/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "skein") {
        let p = dirs.config_dir().join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

/// Returns the user-global config directory (`~/.config/skein/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "skein").map(|d| d.config_dir().to_path_buf())
}
