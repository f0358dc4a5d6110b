// Graphics context - Device, swapchain and render strategies
//
// The presenter drives a `GraphicsContext` and exactly one render strategy:
// a user-selected shader chain, or the simple textured-quad output. The wgpu
// backend is the production implementation; tests substitute a recording
// context.

use super::aspect::Viewport;
use super::error::{DisplayError, ShaderError};
use super::frame::{Frame, PixelFormat};
use super::shader::ShaderPreset;
use super::surface::NativeSurface;
use std::path::Path;

/// Multi-pass shader pipeline built from a preset
pub trait ShaderChain<C> {
    /// Record and submit one frame; nothing is presented until `swap`
    ///
    /// Returns false if the frame could not be rendered.
    fn do_frame_without_swap(&mut self, ctx: &mut C, frame: &Frame, viewport: Viewport) -> bool;

    fn preset(&self) -> &ShaderPreset;

    fn preset_mut(&mut self) -> &mut ShaderPreset;
}

/// Direct upload-and-blit output
pub trait SimpleOutput<C> {
    /// Choose bilinear (`true`) or nearest sampling
    fn set_filter(&mut self, linear: bool);

    /// Record and submit one frame; nothing is presented until `swap`
    ///
    /// Returns false if the frame could not be rendered.
    fn do_frame_without_swap(&mut self, ctx: &mut C, frame: &Frame, viewport: Viewport) -> bool;
}

/// A graphics device bound to one native surface
pub trait GraphicsContext: Sized {
    type Surface: NativeSurface;
    type ShaderChain: ShaderChain<Self>;
    type SimpleOutput: SimpleOutput<Self>;

    /// Create the device and a swapchain of `width` x `height`
    fn create(surface: Self::Surface, width: u32, height: u32) -> Result<Self, DisplayError>;

    fn surface(&self) -> &Self::Surface;

    fn surface_mut(&mut self) -> &mut Self::Surface;

    /// Takes effect at the next swapchain (re)configuration or present
    fn set_vsync(&mut self, enabled: bool);

    fn recreate_swapchain(&mut self, width: u32, height: u32);

    /// Block until the device has finished all submitted work
    fn wait_idle(&self);

    /// Present the most recently rendered frame
    fn swap(&mut self);

    fn load_shader_chain(&mut self, preset: &Path) -> Result<Self::ShaderChain, ShaderError>;

    fn create_simple_output(&mut self, format: PixelFormat) -> Self::SimpleOutput;

    /// Draw an immediate-mode overlay on top of the rendered frame
    fn draw_overlay(&mut self, _ui: &mut dyn FnMut(&egui::Context)) {}
}
