// ABOUTME: Main GPU renderer using wgpu.
// ABOUTME: Presents a frame's command buffer to the window surface.

use std::sync::Arc;
use winit::window::Window;

use wm_core::Color;

use crate::command::CommandBuffer;
use crate::gpu::GpuState;
use crate::pipeline::SolidPipeline;
use crate::tessellate::tessellate;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Surface reports no supported texture formats")]
    NoSurfaceFormat,
}

pub struct Renderer {
    gpu: GpuState,
    pipeline: SolidPipeline,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let gpu = GpuState::new(window).await?;
        let pipeline = SolidPipeline::new(&gpu.device, gpu.config.format);
        let (width, height) = gpu.size;
        pipeline.update_screen_size(&gpu.queue, width as f32, height as f32);

        Ok(Self {
            gpu,
            pipeline,
            clear_color: wgpu::Color::BLACK,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        let (width, height) = self.gpu.size;
        self.pipeline
            .update_screen_size(&self.gpu.queue, width as f32, height as f32);
    }

    /// Framebuffer size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.gpu.size
    }

    /// Color behind everything the command buffer draws
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: 1.0,
        };
    }

    pub fn render(&mut self, cb: &CommandBuffer) -> Result<(), RenderError> {
        let (width, height) = self.gpu.size;
        let batches = tessellate(cb, [width, height]);
        self.pipeline
            .prepare(&self.gpu.device, &self.gpu.queue, &batches);

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pane Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pipeline.render(&mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
