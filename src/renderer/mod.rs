pub mod blit_pipeline;

use std::sync::Arc;

use tracing::{debug, info};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use blit_pipeline::{BlitPipeline, CanvasTexture, create_blit_pipeline, create_canvas_texture};

use crate::canvas::Canvas;
use crate::error::EngineError;

/// Presents the software canvas in a window.
///
/// Every frame the canvas framebuffer is copied into a texture of the same
/// size, which is then drawn into the letterboxed part of the surface. The
/// rest of the surface is cleared to black.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    blit: BlitPipeline,
    canvas_texture: CanvasTexture,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, canvas_width: u32, canvas_height: u32) -> Result<Self, EngineError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| EngineError::Renderer(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .map_err(|e| EngineError::Renderer(format!("no suitable GPU adapter found: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .map_err(|e| EngineError::Renderer(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        // Canvas colors are sRGB-encoded; an sRGB surface keeps them unchanged.
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| EngineError::Renderer("surface reports no texture formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let blit = create_blit_pipeline(&device, format);
        let canvas_texture = create_canvas_texture(&device, &blit, canvas_width, canvas_height);

        info!(
            adapter = %adapter.get_info().name,
            format = ?format,
            width = config.width,
            height = config.height,
            "renderer_ready"
        );

        Ok(Self { window, surface, device, queue, config, blit, canvas_texture })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload `canvas` and draw it at `letterbox` (`[x, y, w, h]` in surface
    /// pixels).
    pub fn present(&mut self, canvas: &Canvas, letterbox: [f32; 4]) -> Result<(), wgpu::SurfaceError> {
        // Minimised window: nothing to upload.
        if canvas.width() == 0 || canvas.height() == 0 {
            return Ok(());
        }
        if canvas.width() != self.canvas_texture.width || canvas.height() != self.canvas_texture.height {
            debug!(width = canvas.width(), height = canvas.height(), "canvas_texture_resized");
            self.canvas_texture = create_canvas_texture(&self.device, &self.blit, canvas.width(), canvas.height());
        }

        let CanvasTexture { texture, width, height, .. } = &self.canvas_texture;
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(*height),
            },
            wgpu::Extent3d { width: *width, height: *height, depth_or_array_layers: 1 },
        );

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas_blit"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some([x, y, w, h]) = clip_to_surface(letterbox, self.config.width, self.config.height) {
                pass.set_viewport(x, y, w, h, 0.0, 1.0);
                pass.set_pipeline(&self.blit.pipeline);
                pass.set_bind_group(0, &self.canvas_texture.bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Intersect the letterbox with the surface. `None` when nothing is left.
fn clip_to_surface(rect: [f32; 4], surface_width: u32, surface_height: u32) -> Option<[f32; 4]> {
    let [x, y, w, h] = rect;
    let x0 = x.max(0.0);
    let y0 = y.max(0.0);
    let x1 = (x + w).min(surface_width as f32);
    let y1 = (y + h).min(surface_height as f32);
    (x1 > x0 && y1 > y0).then(|| [x0, y0, x1 - x0, y1 - y0])
}
