// Native surface - Window handles the graphics context draws into
//
// The provider is chosen once from the window's raw handles. Wayland
// surfaces do not learn their size from the server, so the frontend
// negotiates it explicitly before the swapchain is resized. X11 and other
// platforms report the window size directly.

use super::error::DisplayError;
use std::sync::Arc;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::window::Window;

/// A drawable the graphics context can present to
pub trait NativeSurface {
    /// Drawable size in physical pixels
    fn drawable_size(&self) -> (u32, u32);

    /// Renegotiate the drawable size with the windowing system
    fn resize(&mut self) {}
}

/// Wayland subsurface state
#[derive(Debug, Clone)]
pub struct WaylandSurface {
    window: Arc<Window>,
    size: (u32, u32),
}

impl WaylandSurface {
    fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();
        Self {
            window,
            size: (size.width, size.height),
        }
    }
}

/// Windowing backend the surface is attached through
#[derive(Debug, Clone)]
pub enum SurfaceProvider {
    Wayland(WaylandSurface),
    Xlib(Arc<Window>),
    Xcb(Arc<Window>),
    /// Any other platform handle the graphics API accepts directly
    Native(Arc<Window>),
}

impl SurfaceProvider {
    /// Pick the provider for a window from its raw handles
    pub fn from_window(window: Arc<Window>) -> Result<Self, DisplayError> {
        window
            .display_handle()
            .map_err(|e| DisplayError::SurfaceAttach(e.to_string()))?;
        let handle = window
            .window_handle()
            .map_err(|e| DisplayError::SurfaceAttach(e.to_string()))?
            .as_raw();

        let provider = match handle {
            RawWindowHandle::Wayland(_) => SurfaceProvider::Wayland(WaylandSurface::new(window)),
            RawWindowHandle::Xlib(_) => SurfaceProvider::Xlib(window),
            RawWindowHandle::Xcb(_) => SurfaceProvider::Xcb(window),
            _ => SurfaceProvider::Native(window),
        };
        log::info!("Using {} surface", provider.name());
        Ok(provider)
    }

    pub fn window(&self) -> &Arc<Window> {
        match self {
            SurfaceProvider::Wayland(surface) => &surface.window,
            SurfaceProvider::Xlib(window)
            | SurfaceProvider::Xcb(window)
            | SurfaceProvider::Native(window) => window,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceProvider::Wayland(_) => "Wayland",
            SurfaceProvider::Xlib(_) => "Xlib",
            SurfaceProvider::Xcb(_) => "XCB",
            SurfaceProvider::Native(_) => "native",
        }
    }
}

impl NativeSurface for SurfaceProvider {
    fn drawable_size(&self) -> (u32, u32) {
        match self {
            SurfaceProvider::Wayland(surface) => surface.size,
            other => {
                let size = other.window().inner_size();
                (size.width, size.height)
            }
        }
    }

    fn resize(&mut self) {
        if let SurfaceProvider::Wayland(surface) = self {
            let size = surface.window.inner_size();
            if (size.width, size.height) != surface.size {
                log::debug!(
                    "Wayland surface resized to {}x{}",
                    size.width,
                    size.height
                );
                surface.size = (size.width, size.height);
            }
        }
    }
}
