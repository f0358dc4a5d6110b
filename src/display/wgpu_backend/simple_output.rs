// Simple output - Upload the frame and blit it into the viewport

use super::context::WgpuContext;
use super::pipeline::{self, PassTexture, PassUniforms};
use crate::display::aspect::Viewport;
use crate::display::context::SimpleOutput;
use crate::display::frame::{Frame, PixelFormat};

pub struct WgpuSimpleOutput {
    format: PixelFormat,
    linear: bool,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    nearest_sampler: wgpu::Sampler,
    linear_sampler: wgpu::Sampler,
    uniforms: wgpu::Buffer,
    texture: Option<PassTexture>,
    /// Bind group for the current texture and the filter it was built with
    bind_group: Option<(wgpu::BindGroup, bool)>,
    scratch: Vec<u8>,
}

impl WgpuSimpleOutput {
    pub(super) fn new(context: &WgpuContext, format: PixelFormat) -> Self {
        let device = context.device();
        let layout = pipeline::create_bind_group_layout(device);
        let pipeline = pipeline::create_pipeline(
            device,
            "Simple Output Pipeline",
            pipeline::BLIT,
            &layout,
            context.format(),
        );

        Self {
            format,
            linear: false,
            nearest_sampler: pipeline::create_sampler(device, false),
            linear_sampler: pipeline::create_sampler(device, true),
            uniforms: pipeline::create_uniform_buffer(device, "Simple Output Uniforms"),
            layout,
            pipeline,
            texture: None,
            bind_group: None,
            scratch: Vec::new(),
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Make sure the upload texture matches the frame and is bound
    fn prepare(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if !self.texture.as_ref().is_some_and(|t| t.matches(width, height)) {
            log::debug!("Simple output texture resized to {}x{}", width, height);
            self.texture = Some(PassTexture::new(
                device,
                "Simple Output Texture",
                width,
                height,
            ));
            self.bind_group = None;
        }

        if self.bind_group.as_ref().is_some_and(|(_, linear)| *linear == self.linear) {
            return;
        }
        if let Some(texture) = &self.texture {
            let sampler = if self.linear {
                &self.linear_sampler
            } else {
                &self.nearest_sampler
            };
            let group = pipeline::create_bind_group(
                device,
                &self.layout,
                &texture.view,
                sampler,
                &self.uniforms,
            );
            self.bind_group = Some((group, self.linear));
        }
    }
}

impl SimpleOutput<WgpuContext> for WgpuSimpleOutput {
    fn set_filter(&mut self, linear: bool) {
        self.linear = linear;
    }

    fn do_frame_without_swap(
        &mut self,
        ctx: &mut WgpuContext,
        frame: &Frame,
        viewport: Viewport,
    ) -> bool {
        if frame.is_empty() {
            return false;
        }
        let (width, height) = (frame.width() as u32, frame.height() as u32);
        self.prepare(ctx.device(), width, height);

        let Some(target) = ctx.acquire() else {
            return false;
        };
        let (Some(texture), Some((bind_group, _))) = (&self.texture, &self.bind_group) else {
            return false;
        };

        texture.upload(ctx.queue(), frame, &mut self.scratch);
        let uniforms = PassUniforms {
            source_size: pipeline::size_vec(width, height),
            output_size: pipeline::size_vec(viewport.width, viewport.height),
            original_size: pipeline::size_vec(width, height),
            frame_count: [0; 4],
            params: [0.0; crate::display::shader::MAX_PARAMETERS],
        };
        ctx.queue()
            .write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Simple Output Encoder"),
            });
        pipeline::draw_pass(
            &mut encoder,
            "Simple Output Pass",
            &target,
            &self.pipeline,
            bind_group,
            Some(viewport),
        );
        ctx.queue().submit(std::iter::once(encoder.finish()));
        true
    }
}
