//! Shader program loading: read WGSL source from files, compile and check
//! each stage independently, link the stage interfaces, validate the
//! resource-binding contract, and build the composite render pipeline.
//!
//! The phases mirror a classic driver's compile / link / validate split so
//! each failure class surfaces its own diagnostic instead of collapsing into
//! a single pipeline-creation panic:
//!
//! - compile: naga WGSL parse + module validation, per stage
//! - link: every fragment `@location(n)` input must have a matching vertex
//!   output of the same type
//! - validate: stage modules must fit the fixed composite bind group layout

use std::fmt;
use std::path::Path;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use postfx_core::QuadVertex;

use crate::error::ShaderError;

/// Entry point names the composite pipeline expects.
pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    pub fn entry_point(self) -> &'static str {
        match self {
            Stage::Vertex => VERTEX_ENTRY,
            Stage::Fragment => FRAGMENT_ENTRY,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        })
    }
}

/// Resolved location of the screen-resolution uniform, cached once after
/// linking. Only exists on a successfully built program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionBinding {
    pub group: u32,
    pub binding: u32,
}

// ---------------------------------------------------------------------------
// Source loading and per-stage compilation
// ---------------------------------------------------------------------------

/// Read shader source from disk. A missing file is unrecoverable for the
/// caller, so the failure propagates instead of being logged away.
pub fn read_source(path: &Path) -> Result<String, ShaderError> {
    let bytes = std::fs::read(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| ShaderError::NonUtf8 {
        path: path.to_path_buf(),
    })
}

/// Parse and validate one stage's WGSL, returning the IR module used for
/// linking and reflection. Diagnostics carry the naga front-end's rendered
/// message, source spans included.
pub fn compile_stage(stage: Stage, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|err| ShaderError::Parse {
        stage,
        diagnostic: err.emit_to_string(source),
    })?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| ShaderError::Validate {
            stage,
            diagnostic: render_validation_error(source, &err),
        })?;

    Ok(module)
}

fn render_validation_error(
    source: &str,
    err: &naga::WithSpan<naga::valid::ValidationError>,
) -> String {
    use std::fmt::Write;

    let mut diagnostic = String::new();
    let _ = writeln!(diagnostic, "{}", err.as_inner());
    for (span, label) in err.spans() {
        let loc = span.location(source);
        let _ = writeln!(
            diagnostic,
            "  at line {}, column {}: {}",
            loc.line_number, loc.line_position, label
        );
    }
    diagnostic
}

// ---------------------------------------------------------------------------
// Linking — vertex outputs vs fragment inputs
// ---------------------------------------------------------------------------

fn entry<'m>(module: &'m naga::Module, stage: Stage) -> Result<&'m naga::EntryPoint, ShaderError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga() && ep.name == stage.entry_point())
        .ok_or(ShaderError::MissingEntryPoint {
            stage,
            name: stage.entry_point(),
        })
}

/// Shape of one user-defined inter-stage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IoSlot {
    kind: naga::ScalarKind,
    width: u8,
    size: Option<naga::VectorSize>,
}

fn io_slot(module: &naga::Module, ty: naga::Handle<naga::Type>) -> Option<IoSlot> {
    match module.types[ty].inner {
        naga::TypeInner::Scalar(scalar) => Some(IoSlot {
            kind: scalar.kind,
            width: scalar.width,
            size: None,
        }),
        naga::TypeInner::Vector { size, scalar } => Some(IoSlot {
            kind: scalar.kind,
            width: scalar.width,
            size: Some(size),
        }),
        _ => None,
    }
}

/// Flatten an entry-point argument or result into `(location, slot)` pairs,
/// descending into IO structs and skipping builtins.
fn collect_io(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<(u32, IoSlot)>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            if let Some(slot) = io_slot(module, ty) {
                out.push((*location, slot));
            }
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { ref members, .. } = module.types[ty].inner {
                for member in members {
                    collect_io(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn link_interfaces(vertex: &naga::Module, fragment: &naga::Module) -> Result<(), ShaderError> {
    let vs = entry(vertex, Stage::Vertex)?;
    let fs = entry(fragment, Stage::Fragment)?;

    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_io(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = Vec::new();
    for arg in &fs.function.arguments {
        collect_io(fragment, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for (location, slot) in &inputs {
        match outputs.iter().find(|(out_loc, _)| out_loc == location) {
            None => {
                return Err(ShaderError::Link {
                    diagnostic: format!(
                        "fragment input @location({location}) has no matching vertex output"
                    ),
                })
            }
            Some((_, out_slot)) if out_slot != slot => {
                return Err(ShaderError::Link {
                    diagnostic: format!(
                        "fragment input @location({location}) does not match the vertex output type"
                    ),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation — resource bindings against the composite contract
// ---------------------------------------------------------------------------

fn is_vec2f(module: &naga::Module, ty: naga::Handle<naga::Type>) -> bool {
    matches!(
        module.types[ty].inner,
        naga::TypeInner::Vector {
            size: naga::VectorSize::Bi,
            scalar: naga::Scalar {
                kind: naga::ScalarKind::Float,
                width: 4,
            },
        }
    )
}

/// The resolution uniform may be a bare `vec2<f32>` or a struct whose first
/// member is one (the shipped shaders use the struct form).
fn uniform_holds_resolution(module: &naga::Module, ty: naga::Handle<naga::Type>) -> bool {
    if is_vec2f(module, ty) {
        return true;
    }
    match module.types[ty].inner {
        naga::TypeInner::Struct { ref members, .. } => members
            .first()
            .is_some_and(|member| is_vec2f(module, member.ty)),
        _ => false,
    }
}

/// Check both modules against the fixed composite layout: group 0 holds the
/// resolution uniform (0), the off-screen color texture (1), and its sampler
/// (2); the vertex stage declares no resources at all. Returns the resolved
/// resolution binding.
fn check_binding_contract(
    vertex: &naga::Module,
    fragment: &naga::Module,
) -> Result<ResolutionBinding, ShaderError> {
    for (_, var) in vertex.global_variables.iter() {
        if var.binding.is_some() {
            return Err(ShaderError::BindingContract {
                diagnostic: "vertex shader must not declare resource bindings".into(),
            });
        }
    }

    let mut resolution = None;
    for (_, var) in fragment.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        if binding.group != 0 {
            return Err(ShaderError::BindingContract {
                diagnostic: format!(
                    "@group({}) @binding({}) is outside group 0",
                    binding.group, binding.binding
                ),
            });
        }
        match binding.binding {
            0 => {
                if var.space != naga::AddressSpace::Uniform
                    || !uniform_holds_resolution(fragment, var.ty)
                {
                    return Err(ShaderError::BindingContract {
                        diagnostic: "binding 0 must be a var<uniform> holding the vec2<f32> \
                                     screen resolution"
                            .into(),
                    });
                }
                resolution = Some(ResolutionBinding {
                    group: binding.group,
                    binding: binding.binding,
                });
            }
            1 => {
                let ok = matches!(
                    fragment.types[var.ty].inner,
                    naga::TypeInner::Image {
                        dim: naga::ImageDimension::D2,
                        arrayed: false,
                        class: naga::ImageClass::Sampled {
                            kind: naga::ScalarKind::Float,
                            multi: false,
                        },
                    }
                );
                if !ok {
                    return Err(ShaderError::BindingContract {
                        diagnostic: "binding 1 must be a texture_2d<f32>".into(),
                    });
                }
            }
            2 => {
                if !matches!(
                    fragment.types[var.ty].inner,
                    naga::TypeInner::Sampler { comparison: false }
                ) {
                    return Err(ShaderError::BindingContract {
                        diagnostic: "binding 2 must be a non-comparison sampler".into(),
                    });
                }
            }
            other => {
                return Err(ShaderError::BindingContract {
                    diagnostic: format!("@binding({other}) is not part of the composite layout"),
                });
            }
        }
    }

    resolution.ok_or(ShaderError::MissingResolutionUniform)
}

// ---------------------------------------------------------------------------
// ShaderProgram
// ---------------------------------------------------------------------------

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

pub(crate) fn quad_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

pub(crate) fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("postfx_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// A compiled, linked, validated composite program. Exists only if every
/// phase succeeded; the owned render pipeline is the opaque program handle.
#[derive(Debug)]
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    resolution_binding: ResolutionBinding,
}

impl ShaderProgram {
    /// Load both stage files and build the program. File-read failures
    /// propagate untouched; compile/link/validate diagnostics are logged at
    /// error level before the `Err` is returned.
    pub fn from_paths(
        device: &wgpu::Device,
        vs_path: &Path,
        fs_path: &Path,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let vs_source = read_source(vs_path)?;
        let fs_source = read_source(fs_path)?;
        let program = Self::from_source(device, &vs_source, &fs_source, output_format)?;
        log::info!(
            "post-process shader program linked: {} + {}",
            vs_path.display(),
            fs_path.display()
        );
        Ok(program)
    }

    pub fn from_source(
        device: &wgpu::Device,
        vs_source: &str,
        fs_source: &str,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        // Compile both stages before failing so a vertex error cannot mask a
        // fragment error; every diagnostic is logged.
        let vertex = compile_stage(Stage::Vertex, vs_source);
        let fragment = compile_stage(Stage::Fragment, fs_source);
        for err in [vertex.as_ref().err(), fragment.as_ref().err()]
            .into_iter()
            .flatten()
        {
            log::error!("{err}");
        }
        let (vertex, fragment) = (vertex?, fragment?);

        link_interfaces(&vertex, &fragment).inspect_err(|err| log::error!("{err}"))?;
        let resolution_binding =
            check_binding_contract(&vertex, &fragment).inspect_err(|err| log::error!("{err}"))?;

        let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("postfx_vs"),
            source: wgpu::ShaderSource::Wgsl(vs_source.into()),
        });
        let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("postfx_fs"),
            source: wgpu::ShaderSource::Wgsl(fs_source.into()),
        });

        let bind_group_layout = create_bind_group_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("postfx_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("postfx_composite"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs_module,
                entry_point: VERTEX_ENTRY,
                buffers: &[quad_vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs_module,
                entry_point: FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // The composite quad must never be depth-clipped.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            resolution_binding,
        })
    }

    /// Activate this program for subsequent draws on `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
    }

    /// The linked pipeline — the opaque program handle.
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn resolution_binding(&self) -> ResolutionBinding {
        self.resolution_binding
    }
}

// ---------------------------------------------------------------------------
// Tests — compile/link/validate phases run without a GPU
// ---------------------------------------------------------------------------
