// Display presenter - Drives a graphics context for the frontend
//
// Lifecycle: `init` binds a context to the window surface and picks a render
// strategy, `refresh` follows window resizes, `update` renders, paces and
// presents one frame, and `deinit` tears the context down. Every call after
// a failed `init` is a no-op.
//
// The device is idle before the swapchain is resized and before the context
// is dropped.

use super::aspect::apply_aspect;
use super::context::{GraphicsContext, ShaderChain, SimpleOutput};
use super::error::{DisplayError, ShaderError};
use super::frame::{Frame, PixelFormat};
use super::parameters_dialog::ParametersDialog;
use super::shader::ShaderParameter;
use super::surface::NativeSurface;
use super::throttle::Throttle;
use crate::config::Settings;
use std::path::Path;

/// The active way of getting frames onto the surface
enum RenderStrategy<C: GraphicsContext> {
    ShaderChain(C::ShaderChain),
    Simple(C::SimpleOutput),
}

/// Presents emulated frames through a graphics context
pub struct DisplayPresenter<C: GraphicsContext> {
    /// Strategy resources are released before the context that owns them
    strategy: Option<RenderStrategy<C>>,
    context: Option<C>,
    current_width: u32,
    current_height: u32,
    throttle: Throttle,
    /// Whether the shader parameter UI may be opened
    parameters_enabled: bool,
    dialog: ParametersDialog,
}

impl<C: GraphicsContext> DisplayPresenter<C> {
    pub fn new() -> Self {
        Self {
            strategy: None,
            context: None,
            current_width: 0,
            current_height: 0,
            throttle: Throttle::new(),
            parameters_enabled: false,
            dialog: ParametersDialog::new(),
        }
    }

    /// Create the graphics context and choose a render strategy
    ///
    /// A shader preset that fails to load is logged and replaced by the
    /// simple output; only context creation failures are errors.
    pub fn init(&mut self, surface: C::Surface, settings: &Settings) -> Result<(), DisplayError> {
        let (width, height) = surface.drawable_size();
        self.current_width = width;
        self.current_height = height;

        let mut context = C::create(surface, width, height)
            .inspect_err(|e| log::error!("Couldn't create graphics context: {}", e))?;

        if let Some(preset) = settings.gpu.shader_preset() {
            match context.load_shader_chain(Path::new(preset)) {
                Ok(chain) => {
                    log::info!("Loaded shader preset {}", preset);
                    self.strategy = Some(RenderStrategy::ShaderChain(chain));
                    self.parameters_enabled = true;
                    self.context = Some(context);
                    return Ok(());
                }
                Err(e) => log::warn!("Couldn't load shader preset file: {}", e),
            }
        }

        self.strategy = Some(RenderStrategy::Simple(
            context.create_simple_output(PixelFormat::Rgb565),
        ));
        self.context = Some(context);
        Ok(())
    }

    /// Apply vsync and follow drawable size changes
    pub fn refresh(&mut self, settings: &Settings) {
        let Some(context) = self.context.as_mut() else {
            return;
        };

        context.set_vsync(settings.gpu.sync_to_vblank);

        context.surface_mut().resize();
        let (width, height) = context.surface().drawable_size();

        if (width, height) != (self.current_width, self.current_height) {
            log::debug!("Drawable resized to {}x{}", width, height);
            context.recreate_swapchain(width, height);
            context.wait_idle();
            self.current_width = width;
            self.current_height = height;
        }
    }

    /// Render, pace and present one frame
    pub fn update(&mut self, settings: &Settings, frame: &Frame) {
        let (width, height) = (self.current_width, self.current_height);
        let Self {
            strategy,
            context,
            throttle,
            dialog,
            ..
        } = self;
        let (Some(context), Some(strategy)) = (context.as_mut(), strategy.as_mut()) else {
            return;
        };

        let viewport = apply_aspect(
            frame.width() as u32,
            frame.height() as u32,
            width,
            height,
            &settings.display,
            frame.standard(),
        );

        let rendered = match strategy {
            RenderStrategy::ShaderChain(chain) => {
                chain.do_frame_without_swap(context, frame, viewport)
            }
            RenderStrategy::Simple(output) => {
                output.set_filter(settings.display.bilinear_filter);
                output.do_frame_without_swap(context, frame, viewport)
            }
        };
        if !rendered {
            return;
        }

        if let RenderStrategy::ShaderChain(chain) = strategy {
            if dialog.is_open() {
                draw_parameters_dialog(context, chain, dialog);
            }
        }

        if settings.emulation.speed_control.is_timer_based() {
            throttle.set_frame_rate(frame.standard().frame_rate());
            throttle.wait_for_frame_and_rebase_time();
        }

        context.swap();

        if settings.gpu.reduce_input_lag {
            context.wait_idle();
        }
    }

    /// Release the graphics context once the device is idle
    pub fn deinit(&mut self) {
        let Some(context) = self.context.as_ref() else {
            return;
        };

        if matches!(self.strategy, Some(RenderStrategy::ShaderChain(_))) {
            self.dialog.close();
        }

        context.wait_idle();

        self.strategy = None;
        self.context = None;
        self.parameters_enabled = false;
    }

    /// Parameters of the active shader chain
    pub fn get_parameters(&self) -> Option<&[ShaderParameter]> {
        match &self.strategy {
            Some(RenderStrategy::ShaderChain(chain)) => Some(chain.preset().parameters.as_slice()),
            _ => None,
        }
    }

    pub fn get_parameters_mut(&mut self) -> Option<&mut [ShaderParameter]> {
        match &mut self.strategy {
            Some(RenderStrategy::ShaderChain(chain)) => {
                Some(chain.preset_mut().parameters.as_mut_slice())
            }
            _ => None,
        }
    }

    /// Write the active shader preset with its current parameter values
    ///
    /// Does nothing when no shader chain is active.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ShaderError> {
        match &self.strategy {
            Some(RenderStrategy::ShaderChain(chain)) => chain.preset().save_to_file(path),
            _ => Ok(()),
        }
    }

    pub fn query_availability(&self) -> bool {
        true
    }

    pub fn is_ready(&self) -> bool {
        true
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub fn uses_shader_chain(&self) -> bool {
        matches!(self.strategy, Some(RenderStrategy::ShaderChain(_)))
    }

    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut C> {
        self.context.as_mut()
    }

    /// Drawable size the swapchain was last configured for
    pub fn current_size(&self) -> (u32, u32) {
        (self.current_width, self.current_height)
    }

    /// Whether the shader parameter UI is available
    pub fn parameters_enabled(&self) -> bool {
        self.parameters_enabled
    }

    pub fn parameters_dialog_open(&self) -> bool {
        self.dialog.is_open()
    }

    /// Open or close the shader parameter UI
    pub fn toggle_parameters_dialog(&mut self) {
        if self.dialog.is_open() {
            self.dialog.close();
            return;
        }
        if let Some(RenderStrategy::ShaderChain(chain)) = &self.strategy {
            self.dialog.open(chain.preset().path.clone());
        }
    }
}

impl<C: GraphicsContext> Default for DisplayPresenter<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_parameters_dialog<C: GraphicsContext>(
    context: &mut C,
    chain: &mut C::ShaderChain,
    dialog: &mut ParametersDialog,
) {
    let mut save_to = None;
    context.draw_overlay(&mut |ctx| {
        if let Some(path) = dialog.show(ctx, &mut chain.preset_mut().parameters) {
            save_to = Some(path);
        }
    });

    if let Some(path) = save_to {
        if let Err(e) = chain.preset().save_to_file(&path) {
            log::error!("Couldn't save shader preset: {}", e);
        }
    }
}
