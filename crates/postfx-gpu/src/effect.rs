//! The post-processing bracket: an off-screen render target plus the
//! full-screen composite draw.
//!
//! Callers open a frame with [`PostProcessEffect::begin`], record their scene
//! draws into the returned render pass, drop it, then call
//! [`PostProcessEffect::end`] to composite the off-screen color texture onto
//! the output view through the loaded shader program.

use std::path::Path;

use postfx_core::{FramePhase, FULLSCREEN_QUAD, QUAD_VERTEX_COUNT};
use wgpu::util::DeviceExt;

use crate::context::ScreenUniforms;
use crate::error::PostFxError;
use crate::shader::ShaderProgram;

/// Format of the off-screen color texture.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Combined depth + stencil attachment, the `DEPTH24_STENCIL8` equivalent.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

// ---------------------------------------------------------------------------
// RenderTarget
// ---------------------------------------------------------------------------

/// The off-screen target: color texture + depth/stencil texture, both sized
/// `width` × `height`. Owned exclusively by the effect; the wgpu handles
/// release their GPU objects on drop, so rebuilding cannot leak.
#[derive(Debug)]
pub struct RenderTarget {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    /// Build a complete target or fail. An unusable size blocks
    /// initialization instead of limping on with an incomplete attachment
    /// set.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self, PostFxError> {
        if width == 0 || height == 0 {
            return Err(PostFxError::InvalidSize { width, height });
        }
        let limit = device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            return Err(PostFxError::OversizedTarget {
                width,
                height,
                limit,
            });
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("postfx_color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("postfx_depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let color_view = color.create_view(&Default::default());
        let depth_view = depth.create_view(&Default::default());

        Ok(Self {
            color,
            color_view,
            depth,
            depth_view,
            width,
            height,
        })
    }
}

// ---------------------------------------------------------------------------
// PostProcessEffect
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PostProcessEffect {
    target: RenderTarget,
    program: ShaderProgram,
    quad_vertices: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    phase: FramePhase,
}

impl PostProcessEffect {
    /// Build the full bracket: off-screen target, shader program from the
    /// two source files, quad vertex buffer, sampler, uniform buffer, and
    /// the composite bind group. `output_format` is the format of the view
    /// `end()` will draw into (typically the surface format).
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        vs_path: &Path,
        fs_path: &Path,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, PostFxError> {
        let target = RenderTarget::new(device, width, height)?;
        let program = ShaderProgram::from_paths(device, vs_path, fs_path, output_format)?;

        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("postfx_quad"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Nearest + clamp-to-edge: the texture is shown 1:1, and clamping
        // prevents bleeding at the borders.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("postfx_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("postfx_uniforms"),
            contents: bytemuck::bytes_of(&ScreenUniforms::new(width, height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = Self::create_bind_group(device, &program, &uniforms, &target, &sampler);

        Ok(Self {
            target,
            program,
            quad_vertices,
            uniforms,
            sampler,
            bind_group,
            phase: FramePhase::Idle,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        program: &ShaderProgram,
        uniforms: &wgpu::Buffer,
        target: &RenderTarget,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("postfx_bg"),
            layout: program.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&target.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Open the off-screen pass for this frame's scene draws. Color and
    /// depth/stencil are cleared, and the depth attachment makes depth
    /// testing available to the scene pipelines even though the composite
    /// itself never uses it. Drop the returned pass before calling `end()`.
    pub fn begin<'e>(&mut self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        self.phase = FramePhase::Recording;
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("postfx_scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    /// Composite the off-screen color texture onto `output`: upload the
    /// current resolution, bind the program, the composite bind group and
    /// the quad, and draw the two triangles. No depth attachment — the quad
    /// must never be depth-clipped.
    ///
    /// Calling `end()` again without an intervening `begin()` is legal and
    /// simply re-presents the last off-screen contents.
    pub fn end(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
    ) {
        if self.phase.is_stale_present() {
            log::debug!("end() without begin(): re-presenting last off-screen contents");
        }
        self.phase = FramePhase::Idle;

        queue.write_buffer(
            &self.uniforms,
            0,
            bytemuck::bytes_of(&ScreenUniforms::new(self.target.width, self.target.height)),
        );

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("postfx_composite_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        self.program.bind(&mut pass);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_vertices.slice(..));
        pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
    }

    /// Rebuild the size-dependent resources. The uniform buffer catches up
    /// on the next `end()`.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), PostFxError> {
        self.target = RenderTarget::new(device, width, height)?;
        self.bind_group = Self::create_bind_group(
            device,
            &self.program,
            &self.uniforms,
            &self.target,
            &self.sampler,
        );
        log::debug!("render target resized to {width}×{height}");
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.target.width
    }

    pub fn height(&self) -> u32 {
        self.target.height
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    /// Read access to the off-screen color view, for callers chaining
    /// further passes over the scene texture.
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.target.color_view
    }
}
