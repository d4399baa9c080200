use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    backdrop::{Backdrop, LayerDescriptor},
    window::{Size, Window},
};

use self::{
    instanced::{InstancedMeshRenderer, InstancedMeshRendererBuilder},
    render_target::RenderTarget,
};

mod instanced;
mod mesh;
mod render_target;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface has no format compatible with the adapter")]
    NoSurfaceFormat,

    #[error("GPU ran out of memory")]
    OutOfMemory,

    #[error("{given} layers given to a renderer built for {built}")]
    LayerMismatch { built: usize, given: usize },
}

/// Outcome of a single [`Renderer::render`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// No frame was shown; the next one will try again.
    Skipped,
}

pub struct Renderer {
    surface: wgpu::Surface,
    surface_format: wgpu::TextureFormat,
    size: Size,
    device: wgpu::Device,
    queue: wgpu::Queue,
    depth: RenderTarget,
    layers: Vec<InstancedMeshRenderer>,
}

impl Renderer {
    pub async fn new(window: &impl Window, descriptors: &[LayerDescriptor]) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::Backends::PRIMARY);
        let surface = unsafe { instance.create_surface(window) };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        info!("Using adapter {:?}", adapter.get_info());

        let surface_format = surface
            .get_preferred_format(&adapter)
            .ok_or(RenderError::NoSurfaceFormat)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;

        let size = window.size();

        Self::configure_surface(&surface, &device, surface_format, size);

        let depth = RenderTarget::depth(&device, size);

        let layers: Vec<_> = descriptors
            .iter()
            .map(|descriptor| {
                InstancedMeshRendererBuilder::new(descriptor)
                    .color_target_format(surface_format)
                    .depth_format(depth.format)
                    .build(&device)
            })
            .collect();
        info!(
            "Renderer ready: {:?}, {} layers, {} instances",
            surface_format,
            layers.len(),
            layers.iter().map(|l| l.instance_count()).sum::<u32>()
        );

        Ok(Self {
            surface,
            surface_format,
            size,
            device,
            queue,
            depth,
            layers,
        })
    }

    fn configure_surface(
        surface: &wgpu::Surface,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: Size,
    ) {
        if size.is_empty() {
            return;
        }
        surface.configure(
            device,
            &wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width,
                height: size.height,
                present_mode: wgpu::PresentMode::Fifo,
            },
        )
    }

    pub fn resize(&mut self, size: Size) {
        // Minimized windows report zero; keep the old surface until restored.
        if size.is_empty() || size == self.size {
            return;
        }
        debug!("Resizing surface to {}x{}", size.width, size.height);
        self.size = size;
        Self::configure_surface(&self.surface, &self.device, self.surface_format, size);
        self.depth = RenderTarget::depth(&self.device, size);
    }

    /// Uploads every layer and draws them in order onto a white background.
    ///
    /// Lost or outdated surfaces are reconfigured and the frame is skipped;
    /// only running out of memory is an error.
    pub fn render(&mut self, backdrop: &mut Backdrop) -> Result<FrameStatus, RenderError> {
        let given = backdrop.layer_count();
        if given != self.layers.len() {
            return Err(RenderError::LayerMismatch {
                built: self.layers.len(),
                given,
            });
        }
        if self.size.is_empty() {
            return Ok(FrameStatus::Skipped);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                Self::configure_surface(&self.surface, &self.device, self.surface_format, self.size);
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out waiting for the next surface texture");
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
        };

        let queue = &self.queue;
        let mut renderers = self.layers.iter();
        backdrop.for_each_layer(|mut layer| {
            if let Some(renderer) = renderers.next() {
                renderer.update(queue, &mut layer);
            }
        });

        let surface_texture_view = surface_texture.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Backdrop Command Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Backdrop Render Pass"),
                color_attachments: &[wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: true,
                    },
                }],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: false,
                    }),
                    stencil_ops: None,
                }),
            });
            for renderer in &self.layers {
                renderer.draw(&mut rpass);
            }
        }

        self.queue.submit(Some(encoder.finish()));

        surface_texture.present();

        Ok(FrameStatus::Presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(RenderError::NoAdapter.to_string(), "no suitable GPU adapter found");
        assert_eq!(RenderError::OutOfMemory.to_string(), "GPU ran out of memory");
        assert_eq!(
            RenderError::LayerMismatch { built: 7, given: 3 }.to_string(),
            "3 layers given to a renderer built for 7"
        );
    }
}
