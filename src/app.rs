use log::{debug, error, info};
use winit::{dpi::PhysicalPosition, window::Window};

use crate::{
    backdrop::Backdrop,
    clock::Clock,
    config::Config,
    pointer::Pointer,
    renderer::{FrameStatus, Renderer},
    window::{HasSize, Size},
};

pub struct App {
    window: Window,
    backdrop: Backdrop,
    renderer: Option<Renderer>,
    clock: Clock,
    pointer: Pointer,
}

impl App {
    /// Mounts the backdrop and sets up rendering. If the GPU can't be
    /// initialized the failure is logged and the app runs without a background.
    pub async fn new(window: Window, config: &Config) -> Self {
        let mut backdrop = Backdrop::mount(config, window.size().aspect_ratio());

        let renderer = match Renderer::new(&window, &backdrop.descriptors()).await {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                error!("Background disabled, failed to initialize renderer: {}", e);
                backdrop.unmount();
                None
            }
        };

        Self {
            window,
            backdrop,
            renderer,
            clock: Clock::start(),
            pointer: Pointer::CENTER,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.renderer.is_some() && self.backdrop.is_mounted()
    }

    pub fn on_resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        let size = Size::from(size);
        if size.is_empty() {
            return;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(size);
        }
        self.backdrop.set_aspect_ratio(size.aspect_ratio());
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.pointer = Pointer::from_cursor(position, self.window.size());
    }

    pub fn render(&mut self) {
        let renderer = match &mut self.renderer {
            Some(renderer) => renderer,
            None => return,
        };

        let time = self.clock.tick();
        if !self.backdrop.frame(time, self.pointer) {
            return;
        }

        match renderer.render(&mut self.backdrop) {
            Ok(FrameStatus::Presented) => (),
            Ok(FrameStatus::Skipped) => debug!("Skipped frame {}", self.backdrop.frames()),
            Err(e) => {
                error!("Background disabled, rendering failed: {}", e);
                self.unmount();
            }
        }
    }

    /// Stops the animation and releases the backdrop and every GPU resource.
    pub fn unmount(&mut self) {
        if self.renderer.take().is_some() {
            info!("Released renderer");
        }
        self.backdrop.unmount();
    }
}
