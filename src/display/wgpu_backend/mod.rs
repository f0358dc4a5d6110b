// wgpu backend - Production graphics context for the display presenter

mod context;
mod overlay;
mod pipeline;
mod shader_chain;
mod simple_output;

pub use context::WgpuContext;
pub use shader_chain::WgpuShaderChain;
pub use simple_output::WgpuSimpleOutput;
