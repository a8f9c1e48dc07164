//! Locating and parsing the tailwatch config file.
//!
//! An explicit `--config` path must exist. Without one, the first existing
//! file among `.tailwatch.toml` and `<config_dir>/tailwatch/config.toml` is
//! used, and built-in defaults apply when neither exists.

use std::path::{Path, PathBuf};

use super::TailwatchConfig;

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
}

#[derive(Debug)]
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Search the working directory, then the user config directory.
    #[must_use]
    pub fn new() -> Self {
        let search_paths = std::iter::once(PathBuf::from(".tailwatch.toml"))
            .chain(dirs::config_dir().map(|dir| dir.join("tailwatch").join("config.toml")))
            .collect();
        Self {
            explicit: None,
            search_paths,
        }
    }

    /// Load only `path`, failing if it does not exist.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            explicit: Some(path),
            search_paths: Vec::new(),
        }
    }

    /// Load the configuration and report which file supplied it.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit path is missing, or if the chosen
    /// file cannot be read or parsed.
    pub fn load(&self) -> Result<(TailwatchConfig, ConfigSource), ConfigError> {
        if let Some(path) = &self.explicit {
            if !path.is_file() {
                return Err(ConfigError::Missing(path.clone()));
            }
            return parse_file(path).map(|config| (config, ConfigSource::File(path.clone())));
        }

        match self.search_paths.iter().find(|path| path.is_file()) {
            Some(path) => {
                parse_file(path).map(|config| (config, ConfigSource::File(path.clone())))
            }
            None => Ok((TailwatchConfig::default(), ConfigSource::Defaults)),
        }
    }

    /// Paths that `load` would try, in order.
    #[must_use]
    pub fn candidates(&self) -> Vec<&Path> {
        self.explicit
            .iter()
            .chain(&self.search_paths)
            .map(PathBuf::as_path)
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_file(path: &Path) -> Result<TailwatchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
