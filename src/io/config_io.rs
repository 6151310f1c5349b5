use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "config.toml";

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// Load config.toml from the data directory. A missing file yields the
/// defaults. A corrupted file is backed up as .bak and replaced by defaults
/// so one bad edit never wedges the program.
pub fn load_config(dir: &Path) -> AppConfig {
    let path = config_path(dir);
    if !path.exists() {
        return AppConfig::default();
    }

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: invalid {}: {}", path.display(), e);
                let backup = path.with_extension("toml.bak");
                if fs::rename(&path, &backup).is_ok() {
                    eprintln!("warning: moved bad config to {}", backup.display());
                }
                AppConfig::default()
            }
        },
        Err(e) => {
            eprintln!("warning: could not read {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

/// Write config.toml, creating the data directory if needed.
pub fn save_config(dir: &Path, config: &AppConfig) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    fs::write(config_path(dir), content)
}
