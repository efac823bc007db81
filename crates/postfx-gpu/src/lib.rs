//! Off-screen post-processing for a wgpu renderer.
//!
//! Render the scene between [`PostProcessEffect::begin`] and
//! [`PostProcessEffect::end`]; the effect owns the off-screen target and the
//! composite draw, and [`ShaderProgram`] owns loading, compiling, linking and
//! validating the WGSL pair that shades the full-screen quad.
//!
//! ```no_run
//! # fn demo(device: &wgpu::Device, queue: &wgpu::Queue, output: &wgpu::TextureView) -> Result<(), postfx_gpu::PostFxError> {
//! use std::path::Path;
//! use postfx_gpu::{PostProcessEffect, COLOR_FORMAT};
//!
//! let mut effect = PostProcessEffect::new(
//!     device,
//!     800,
//!     600,
//!     Path::new("shaders/composite.vert.wgsl"),
//!     Path::new("shaders/composite.frag.wgsl"),
//!     COLOR_FORMAT,
//! )?;
//!
//! let mut encoder = device.create_command_encoder(&Default::default());
//! {
//!     let _scene_pass = effect.begin(&mut encoder);
//!     // ... record scene draws into the pass ...
//! }
//! effect.end(queue, &mut encoder, output);
//! queue.submit([encoder.finish()]);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod effect;
pub mod error;
pub mod shader;

pub use context::{GpuContext, ScreenUniforms};
pub use effect::{PostProcessEffect, RenderTarget, COLOR_FORMAT, DEPTH_FORMAT};
pub use error::{ContextError, PostFxError, ShaderError};
pub use shader::{ResolutionBinding, ShaderProgram, Stage};
