// wgpu graphics context
//
// Owns the device, queue and swapchain for one window. A surface texture is
// acquired lazily by the first render of a frame and held until `swap`
// presents it, so the overlay can draw into the same image.

use super::overlay::Overlay;
use super::shader_chain::WgpuShaderChain;
use super::simple_output::WgpuSimpleOutput;
use crate::display::context::GraphicsContext;
use crate::display::error::{DisplayError, ShaderError};
use crate::display::frame::PixelFormat;
use crate::display::shader::ShaderPreset;
use crate::display::surface::SurfaceProvider;
use std::path::Path;
use winit::event::WindowEvent;

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

pub struct WgpuContext {
    overlay: Overlay,
    frame: Option<wgpu::SurfaceTexture>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    vsync: bool,
    provider: SurfaceProvider,
}

impl WgpuContext {
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Swapchain image format
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Forward a window event to the overlay
    ///
    /// Returns true if the overlay consumed it.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        let window = self.provider.window().clone();
        self.overlay.on_window_event(&window, event)
    }

    fn configure(&mut self) {
        self.frame = None;
        self.surface.configure(&self.device, &self.config);
    }

    /// View of the surface texture for the frame being rendered
    ///
    /// Returns `None` when no image could be acquired; the frame is skipped.
    pub(super) fn acquire(&mut self) -> Option<wgpu::TextureView> {
        if self.frame.is_none() {
            let frame = match self.surface.get_current_texture() {
                Ok(frame) => frame,
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    self.configure();
                    match self.surface.get_current_texture() {
                        Ok(frame) => frame,
                        Err(e) => {
                            log::error!(
                                "Couldn't acquire swapchain image after reconfigure: {}",
                                e
                            );
                            return None;
                        }
                    }
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::debug!("Swapchain image acquire timed out");
                    return None;
                }
                Err(e) => {
                    log::error!("Couldn't acquire swapchain image: {}", e);
                    return None;
                }
            };
            self.frame = Some(frame);
        }

        self.frame.as_ref().map(|frame| {
            frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default())
        })
    }
}

impl GraphicsContext for WgpuContext {
    type Surface = SurfaceProvider;
    type ShaderChain = WgpuShaderChain;
    type SimpleOutput = WgpuSimpleOutput;

    fn create(provider: SurfaceProvider, width: u32, height: u32) -> Result<Self, DisplayError> {
        let window = provider.window().clone();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| DisplayError::Surface(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| DisplayError::Adapter(e.to_string()))?;
        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Display Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            experimental_features: Default::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| DisplayError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| DisplayError::Surface("no supported surface formats".to_string()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(true),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!("Swapchain configured: {}x{} {:?}", width, height, format);

        let overlay = Overlay::new(&window, &device, format);

        Ok(Self {
            overlay,
            frame: None,
            surface,
            device,
            queue,
            config,
            vsync: true,
            provider,
        })
    }

    fn surface(&self) -> &SurfaceProvider {
        &self.provider
    }

    fn surface_mut(&mut self) -> &mut SurfaceProvider {
        &mut self.provider
    }

    fn set_vsync(&mut self, enabled: bool) {
        if self.vsync == enabled {
            return;
        }
        log::debug!("Vsync {}", if enabled { "enabled" } else { "disabled" });
        self.vsync = enabled;
        self.config.present_mode = present_mode(enabled);
        self.configure();
    }

    fn recreate_swapchain(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.configure();
    }

    fn wait_idle(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
            log::warn!("Device poll failed: {}", e);
        }
    }

    fn swap(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.present();
        }
    }

    fn load_shader_chain(&mut self, preset: &Path) -> Result<WgpuShaderChain, ShaderError> {
        let preset = ShaderPreset::load(preset)?;
        WgpuShaderChain::new(self, preset)
    }

    fn create_simple_output(&mut self, format: PixelFormat) -> WgpuSimpleOutput {
        WgpuSimpleOutput::new(self, format)
    }

    fn draw_overlay(&mut self, ui: &mut dyn FnMut(&egui::Context)) {
        let Some(frame) = &self.frame else {
            return;
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let size = (self.config.width, self.config.height);
        let window = self.provider.window().clone();
        self.overlay
            .render(&window, &self.device, &self.queue, &target, size, ui);
    }
}
