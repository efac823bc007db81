use std::path::PathBuf;

use crate::shader::Stage;

/// Failures while turning a pair of shader files into a linked program.
///
/// Stage diagnostics (`Parse`, `Validate`) carry the naga front-end's
/// rendered message, the closest thing WGSL has to a driver info log.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader source {path} is not valid UTF-8")]
    NonUtf8 { path: PathBuf },

    #[error("{stage} shader failed to parse:\n{diagnostic}")]
    Parse { stage: Stage, diagnostic: String },

    #[error("{stage} shader failed validation:\n{diagnostic}")]
    Validate { stage: Stage, diagnostic: String },

    #[error("{stage} shader is missing entry point `{name}`")]
    MissingEntryPoint { stage: Stage, name: &'static str },

    #[error("shader stages do not link: {diagnostic}")]
    Link { diagnostic: String },

    #[error("shader resource bindings violate the composite contract: {diagnostic}")]
    BindingContract { diagnostic: String },

    #[error("fragment shader does not declare a screen-resolution uniform (vec2<f32> in a var<uniform>)")]
    MissingResolutionUniform,
}

/// Failures while building or resizing the post-process effect.
#[derive(Debug, thiserror::Error)]
pub enum PostFxError {
    #[error("render target size {width}x{height} is invalid: both sides must be > 0")]
    InvalidSize { width: u32, height: u32 },

    #[error("render target size {width}x{height} exceeds the device limit of {limit}")]
    OversizedTarget { width: u32, height: u32, limit: u32 },

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Failures while acquiring a GPU device.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
