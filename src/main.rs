// SNES frontend - Main entry point
//
// Loads the configuration, binds inputs, and presents a test pattern through
// the display presenter until the window is closed. The configuration is
// saved on exit.

use gilrs::{EventType, Gilrs};
use snes_frontend::config::{ConfigStore, EscBehavior, Settings};
use snes_frontend::display::{
    DisplayPresenter, FrameBuffer, GraphicsContext, NativeSurface, SurfaceProvider, WgpuContext,
    SNES_HEIGHT, SNES_WIDTH,
};
use snes_frontend::input::{Binding, ControlMap, ControllerPorts, Modifiers};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

/// Default window scale when no size is saved
const DEFAULT_SCALE: u32 = 3;

/// Frontend application state
struct Frontend {
    store: ConfigStore,
    settings: Settings,
    controls: ControlMap,
    ports: ControllerPorts,
    presenter: DisplayPresenter<WgpuContext>,
    window: Option<Arc<Window>>,
    frame_buffer: FrameBuffer,
    frame_count: usize,
    modifiers: Modifiers,
    gilrs: Option<Gilrs>,
}

impl Frontend {
    fn new(store: ConfigStore, settings: Settings) -> Self {
        let mut controls = ControlMap::new();
        ConfigStore::rebind_keys(&settings, &mut controls);
        log::info!(
            "Mapped {} buttons and {} pointers",
            controls.button_count(),
            controls.pointer_count()
        );

        let mut ports = ControllerPorts::new();
        ConfigStore::apply_controller_ports(&settings, &mut ports);

        let gilrs = Gilrs::new()
            .inspect_err(|e| log::warn!("Gamepad support unavailable: {}", e))
            .ok();

        Self {
            store,
            settings,
            controls,
            ports,
            presenter: DisplayPresenter::new(),
            window: None,
            frame_buffer: FrameBuffer::new(SNES_WIDTH, SNES_HEIGHT),
            frame_count: 0,
            modifiers: Modifiers::NONE,
            gilrs,
        }
    }

    fn window_size(&self) -> PhysicalSize<u32> {
        let w = &self.settings.window;
        if w.main_width > 0 && w.main_height > 0 {
            PhysicalSize::new(w.main_width as u32, w.main_height as u32)
        } else {
            PhysicalSize::new(
                SNES_WIDTH as u32 * DEFAULT_SCALE,
                SNES_HEIGHT as u32 * DEFAULT_SCALE,
            )
        }
    }

    fn dispatch(&self, binding: Binding) {
        if let Some(command) = self.controls.button(&binding) {
            log::debug!("{} -> {:?}", binding, command);
        }
    }

    fn handle_escape(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        match self.settings.behavior.esc_behavior {
            EscBehavior::ToggleMenuBar => {
                self.settings.window.ui_visible = !self.settings.window.ui_visible;
            }
            EscBehavior::ExitFullscreen => {
                if window.fullscreen().is_some() {
                    window.set_fullscreen(None);
                    self.settings.window.fullscreen = false;
                }
            }
            EscBehavior::Quit => event_loop.exit(),
        }
    }

    fn toggle_fullscreen(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let fullscreen = window.fullscreen().is_none();
        window.set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
        self.settings.window.fullscreen = fullscreen;
    }

    fn poll_gamepads(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        let mut pressed = Vec::new();
        while let Some(event) = gilrs.next_event() {
            if let EventType::ButtonPressed(button, _) = event.event {
                let pad = usize::from(event.id) as u8;
                pressed.push(Binding::JoystickButton { pad, button });
            }
        }
        for binding in pressed {
            self.dispatch(binding);
        }
    }

    fn render(&mut self) {
        self.frame_buffer.test_pattern(self.frame_count);
        self.frame_count = self.frame_count.wrapping_add(1);
        self.presenter
            .update(&self.settings, &self.frame_buffer.frame());
    }
}

impl ApplicationHandler for Frontend {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes()
            .with_title("Snes9x")
            .with_inner_size(self.window_size())
            .with_min_inner_size(PhysicalSize::new(SNES_WIDTH as u32, SNES_HEIGHT as u32));
        if self.settings.window.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Couldn't create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let provider = match SurfaceProvider::from_window(window.clone()) {
            Ok(provider) => provider,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        if self.presenter.init(provider, &self.settings).is_err() {
            event_loop.exit();
            return;
        }
        self.presenter.refresh(&self.settings);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.presenter.parameters_dialog_open() {
            if let Some(context) = self.presenter.context_mut() {
                if context.on_window_event(&event) {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.presenter.refresh(&self.settings);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = Modifiers::from_state(modifiers.state());
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => self.handle_escape(event_loop),
                KeyCode::F11 => self.toggle_fullscreen(),
                KeyCode::F8 if self.presenter.parameters_enabled() => {
                    self.presenter.toggle_parameters_dialog();
                }
                key => self.dispatch(Binding::Key {
                    key,
                    modifiers: self.modifiers,
                }),
            },
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                let index = match button {
                    MouseButton::Left => 0,
                    MouseButton::Middle => 1,
                    MouseButton::Right => 2,
                    _ => return,
                };
                self.dispatch(Binding::MouseButton(index));
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.poll_gamepads();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(context) = self.presenter.context() {
            if !self.settings.window.fullscreen {
                let (width, height) = context.surface().drawable_size();
                self.settings.window.main_width = width as i32;
                self.settings.window.main_height = height as i32;
            }
        }
        self.presenter.deinit();

        ConfigStore::capture_controller_ports(&mut self.settings, &self.ports);
        match self.store.save_config_file(&self.settings) {
            Ok(()) => log::info!(
                "Saved configuration to {}",
                self.store.config_file().display()
            ),
            Err(e) => log::error!("{}", e),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let store = ConfigStore::new();
    let mut settings = Settings::default();
    if store.load_config_file(&mut settings).is_err() {
        log::warn!("Using default settings");
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut frontend = Frontend::new(store, settings);
    event_loop.run_app(&mut frontend)?;

    Ok(())
}
