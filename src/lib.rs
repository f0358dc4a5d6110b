// SNES Frontend Library
// Configuration, input binding and display presentation for the frontend

// Public modules
pub mod config;
pub mod display;
pub mod input;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigStore, Settings};
pub use display::{DisplayError, DisplayPresenter, Frame, FrameBuffer, GraphicsContext, ShaderError};
pub use input::{Binding, Command, ControlMap, ControllerPorts};
