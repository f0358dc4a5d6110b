// Shader chain - Multi-pass rendering driven by a preset
//
// The original frame is uploaded once, then each pass samples the previous
// pass's output. Intermediate passes render into their own textures, sized
// by the pass's scale settings; the last pass renders into the viewport on
// the surface.

use super::context::WgpuContext;
use super::pipeline::{self, PassTexture, PassUniforms};
use crate::display::aspect::Viewport;
use crate::display::context::ShaderChain;
use crate::display::error::ShaderError;
use crate::display::frame::Frame;
use crate::display::shader::{ShaderPreset, MAX_PARAMETERS};
use std::fmt::Write as _;

struct ChainPass {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    linear: bool,
    /// Render target; `None` for the last pass
    target: Option<PassTexture>,
}

pub struct WgpuShaderChain {
    preset: ShaderPreset,
    layout: wgpu::BindGroupLayout,
    passes: Vec<ChainPass>,
    nearest_sampler: wgpu::Sampler,
    linear_sampler: wgpu::Sampler,
    original: Option<PassTexture>,
    frame_count: u32,
    scratch: Vec<u8>,
}

/// Pass source with the parameter index constants prepended
fn pass_source(preset: &ShaderPreset, body: &str) -> String {
    let mut source = String::new();
    for (i, parameter) in preset.parameters.iter().enumerate() {
        let _ = writeln!(source, "const PARAM_{}: u32 = {}u;", parameter.id, i);
    }
    source.push_str(body);
    source
}

impl WgpuShaderChain {
    pub(super) fn new(context: &WgpuContext, preset: ShaderPreset) -> Result<Self, ShaderError> {
        let device = context.device();
        let layout = pipeline::create_bind_group_layout(device);

        let last = preset.passes.len().saturating_sub(1);
        let mut passes = Vec::with_capacity(preset.passes.len());
        for (i, pass) in preset.passes.iter().enumerate() {
            let target_format = if i == last {
                context.format()
            } else {
                pipeline::SOURCE_FORMAT
            };
            let label = format!("Shader Pass {}", i);

            device.push_error_scope(wgpu::ErrorFilter::Validation);
            let render_pipeline = pipeline::create_pipeline(
                device,
                &label,
                &pass_source(&preset, &pass.wgsl_body()),
                &layout,
                target_format,
            );
            if let Some(e) = pollster::block_on(device.pop_error_scope()) {
                return Err(ShaderError::Compile {
                    pass: i,
                    message: e.to_string(),
                });
            }

            log::debug!("Compiled shader pass {} ({})", i, pass.path.display());
            passes.push(ChainPass {
                pipeline: render_pipeline,
                uniforms: pipeline::create_uniform_buffer(device, &label),
                linear: pass.filter_linear.unwrap_or(false),
                target: None,
            });
        }

        Ok(Self {
            preset,
            layout,
            passes,
            nearest_sampler: pipeline::create_sampler(device, false),
            linear_sampler: pipeline::create_sampler(device, true),
            original: None,
            frame_count: 0,
            scratch: Vec::new(),
        })
    }

    fn parameter_values(&self) -> [f32; MAX_PARAMETERS] {
        let mut values = [0.0; MAX_PARAMETERS];
        for (slot, parameter) in values.iter_mut().zip(&self.preset.parameters) {
            *slot = parameter.val;
        }
        values
    }

    /// Resize the original and intermediate textures for this frame
    ///
    /// Returns the output size of every pass.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        source: (u32, u32),
        viewport: (u32, u32),
    ) -> Vec<(u32, u32)> {
        if !self.original.as_ref().is_some_and(|t| t.matches(source.0, source.1)) {
            self.original = Some(PassTexture::new(
                device,
                "Shader Chain Original",
                source.0,
                source.1,
            ));
        }

        let last = self.passes.len().saturating_sub(1);
        let mut sizes = Vec::with_capacity(self.passes.len());
        let mut input = source;
        for (i, (pass, desc)) in self.passes.iter_mut().zip(&self.preset.passes).enumerate() {
            if i == last {
                sizes.push(viewport);
                break;
            }
            let output = desc.output_size(input, viewport, false);
            if !pass.target.as_ref().is_some_and(|t| t.matches(output.0, output.1)) {
                log::debug!("Shader pass {} target resized to {}x{}", i, output.0, output.1);
                pass.target = Some(PassTexture::new(
                    device,
                    "Shader Pass Target",
                    output.0,
                    output.1,
                ));
            }
            sizes.push(output);
            input = output;
        }
        sizes
    }
}

impl ShaderChain<WgpuContext> for WgpuShaderChain {
    fn do_frame_without_swap(
        &mut self,
        ctx: &mut WgpuContext,
        frame: &Frame,
        viewport: Viewport,
    ) -> bool {
        if frame.is_empty() || self.passes.is_empty() {
            return false;
        }
        let source = (frame.width() as u32, frame.height() as u32);
        let sizes = self.prepare(ctx.device(), source, (viewport.width, viewport.height));

        let Some(surface_view) = ctx.acquire() else {
            return false;
        };
        let Some(original) = &self.original else {
            return false;
        };
        original.upload(ctx.queue(), frame, &mut self.scratch);

        let params = self.parameter_values();
        let device = ctx.device();
        let queue = ctx.queue();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Shader Chain Encoder"),
        });

        let mut input_view = &original.view;
        let mut input_size = source;
        for (i, pass) in self.passes.iter().enumerate() {
            let output_size = sizes[i];
            let uniforms = PassUniforms {
                source_size: pipeline::size_vec(input_size.0, input_size.1),
                output_size: pipeline::size_vec(output_size.0, output_size.1),
                original_size: pipeline::size_vec(source.0, source.1),
                frame_count: [self.frame_count, 0, 0, 0],
                params,
            };
            queue.write_buffer(&pass.uniforms, 0, bytemuck::bytes_of(&uniforms));

            let sampler = if pass.linear {
                &self.linear_sampler
            } else {
                &self.nearest_sampler
            };
            let bind_group = pipeline::create_bind_group(
                device,
                &self.layout,
                input_view,
                sampler,
                &pass.uniforms,
            );

            match &pass.target {
                Some(target) => {
                    pipeline::draw_pass(
                        &mut encoder,
                        "Shader Pass",
                        &target.view,
                        &pass.pipeline,
                        &bind_group,
                        None,
                    );
                    input_view = &target.view;
                }
                None => {
                    pipeline::draw_pass(
                        &mut encoder,
                        "Shader Pass",
                        &surface_view,
                        &pass.pipeline,
                        &bind_group,
                        Some(viewport),
                    );
                }
            }
            input_size = output_size;
        }

        queue.submit(std::iter::once(encoder.finish()));
        self.frame_count = self.frame_count.wrapping_add(1);
        true
    }

    fn preset(&self) -> &ShaderPreset {
        &self.preset
    }

    fn preset_mut(&mut self) -> &mut ShaderPreset {
        &mut self.preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::shader::ShaderParameter;
    use std::path::PathBuf;

    #[test]
    fn test_pass_source_declares_parameters() {
        let preset = ShaderPreset {
            path: PathBuf::from("crt.preset"),
            passes: Vec::new(),
            parameters: vec![
                ShaderParameter {
                    id: "CURVATURE".to_string(),
                    name: "Curvature".to_string(),
                    val: 0.5,
                    default: 0.5,
                    min: 0.0,
                    max: 1.0,
                    step: 0.05,
                },
                ShaderParameter {
                    id: "MASK".to_string(),
                    name: "Mask".to_string(),
                    val: 1.0,
                    default: 1.0,
                    min: 0.0,
                    max: 2.0,
                    step: 1.0,
                },
            ],
        };

        let source = pass_source(&preset, "fn fs_main() {}");
        assert!(source
            .starts_with("const PARAM_CURVATURE: u32 = 0u;\nconst PARAM_MASK: u32 = 1u;\n"));
        assert!(source.ends_with("fn fs_main() {}"));
    }

    #[test]
    fn test_uniforms_match_shader_layout() {
        // 4 vec4 blocks plus 16 vec4 parameter slots
        assert_eq!(std::mem::size_of::<PassUniforms>(), 4 * 16 + 16 * 16);
    }
}
