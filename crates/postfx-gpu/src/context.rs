use wgpu::{Device, Instance, Queue};

use crate::error::ContextError;

pub struct GpuContext {
    pub instance: Instance,
    pub device: Device,
    pub queue: Queue,
}

impl GpuContext {
    /// Create a headless GPU context (no surface). Used by the offscreen
    /// example and the integration tests; applications that already own a
    /// device/queue pair can skip this entirely.
    pub async fn new_headless() -> Result<Self, ContextError> {
        let instance = Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ContextError::NoAdapter)?;

        log::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("postfx-gpu device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            instance,
            device,
            queue,
        })
    }
}

/// Per-frame data uploaded to the composite shader as a single uniform
/// buffer. Must match the uniform declared at group 0, binding 0 in the
/// fragment shader. `repr(C)` + `bytemuck` ensures safe casting to `&[u8]`;
/// the padding keeps the buffer 16-byte sized for uniform-buffer rules.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniforms {
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

impl ScreenUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            _pad: [0.0; 2],
        }
    }
}
