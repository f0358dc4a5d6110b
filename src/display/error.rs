// Display errors

use std::io;
use std::path::PathBuf;

/// Errors that can occur while creating the graphics context
#[derive(Debug)]
pub enum DisplayError {
    /// The native window could not be attached to a drawing surface
    SurfaceAttach(String),

    /// No usable graphics adapter
    Adapter(String),

    /// The logical device could not be created
    Device(String),

    /// The surface could not be configured for presentation
    Surface(String),
}

impl std::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayError::SurfaceAttach(e) => write!(f, "Couldn't attach to window: {}", e),
            DisplayError::Adapter(e) => write!(f, "No suitable graphics adapter: {}", e),
            DisplayError::Device(e) => write!(f, "Couldn't create graphics device: {}", e),
            DisplayError::Surface(e) => write!(f, "Couldn't configure surface: {}", e),
        }
    }
}

impl std::error::Error for DisplayError {}

/// Errors that can occur while loading, building or saving a shader preset
#[derive(Debug)]
pub enum ShaderError {
    /// I/O error on a preset or pass file
    Io { path: PathBuf, source: io::Error },

    /// Malformed preset or pass source
    Parse { path: PathBuf, message: String },

    /// A pass named by the preset is missing
    MissingPass(usize),

    /// A pass failed to compile or validate
    Compile { pass: usize, message: String },
}

impl std::fmt::Display for ShaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ShaderError::Parse { path, message } => {
                write!(f, "{}: parse error: {}", path.display(), message)
            }
            ShaderError::MissingPass(n) => write!(f, "Preset has no entry for pass {}", n),
            ShaderError::Compile { pass, message } => {
                write!(f, "Shader pass {} failed to compile: {}", pass, message)
            }
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
