use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use extract::ExtractOptions;

pub const DEFAULT_CONFIG_FILE: &str = "spread-task.toml";

/// Contents of `spread-task.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub extract: ExtractOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Options for one extraction run. `legacy_sections` adds the prerequisites-style
    /// section titles on top of the configured ones.
    pub fn extract_options(self, legacy_sections: bool) -> ExtractOptions {
        if legacy_sections {
            self.extract.with_legacy_sections()
        } else {
            self.extract
        }
    }
}

/// Load an explicit config file, or `./spread-task.toml` if it exists, or defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) => p,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(Config::default());
            }
            default
        }
    };

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loaded config from {}", path.display());
    Ok(config)
}
