// Configuration errors

use std::io;
use std::path::PathBuf;

/// Errors that can occur while loading or saving the configuration file
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration directory could not be created
    CreateDir { path: PathBuf, source: io::Error },

    /// The configuration file could not be read
    Read { path: PathBuf, source: io::Error },

    /// The configuration file could not be written
    Write { path: PathBuf, source: io::Error },
}

impl ConfigError {
    /// Path the failed operation was working on
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::CreateDir { path, .. }
            | ConfigError::Read { path, .. }
            | ConfigError::Write { path, .. } => path,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::CreateDir { path, source } => write!(
                f,
                "Couldn't create config directory {}: {}",
                path.display(),
                source
            ),
            ConfigError::Read { path, source } => {
                write!(f, "Couldn't read config file {}: {}", path.display(), source)
            }
            ConfigError::Write { path, source } => {
                write!(f, "Couldn't write config file {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::CreateDir { source, .. }
            | ConfigError::Read { source, .. }
            | ConfigError::Write { source, .. } => Some(source),
        }
    }
}
