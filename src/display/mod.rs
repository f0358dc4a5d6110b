// Display module - Presents emulated frames to the window
//
// This module provides:
// - Frame descriptions and the RGB565 frame buffer
// - Aspect ratio and viewport computation
// - Frame pacing for timer-based throttling
// - Native surface providers (Wayland, Xlib, XCB)
// - Shader presets and their tunable parameters
// - The graphics context abstraction and its wgpu backend
// - The display presenter driving it all

pub mod aspect;
pub mod context;
pub mod error;
pub mod frame;
pub mod parameters_dialog;
pub mod presenter;
pub mod shader;
pub mod surface;
pub mod throttle;
pub mod wgpu_backend;

pub use aspect::{apply_aspect, Viewport};
pub use context::{GraphicsContext, ShaderChain, SimpleOutput};
pub use error::{DisplayError, ShaderError};
pub use frame::{
    rgb565_to_rgba8, Frame, FrameBuffer, PixelFormat, VideoStandard, MAX_SNES_HEIGHT,
    MAX_SNES_WIDTH, SNES_HEIGHT, SNES_HEIGHT_EXTENDED, SNES_WIDTH,
};
pub use parameters_dialog::ParametersDialog;
pub use presenter::DisplayPresenter;
pub use shader::{ScaleType, ShaderParameter, ShaderPass, ShaderPreset, MAX_PARAMETERS};
pub use surface::{NativeSurface, SurfaceProvider, WaylandSurface};
pub use throttle::Throttle;
pub use wgpu_backend::WgpuContext;
