//! File-based shader program tests. Compilation and reflection run without a
//! GPU; pipeline construction requires an adapter and is skipped (with a
//! note) on machines that have none.

use std::path::{Path, PathBuf};

use postfx_gpu::shader::{compile_stage, read_source, Stage};
use postfx_gpu::{GpuContext, ResolutionBinding, ShaderError, ShaderProgram, COLOR_FORMAT};

fn shader_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders").join(name)
}

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn gpu() -> Option<GpuContext> {
    match pollster::block_on(GpuContext::new_headless()) {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            eprintln!("skipping GPU-dependent test: {err}");
            None
        }
    }
}

// --- No GPU required --------------------------------------------------------

#[test]
fn shipped_composite_pair_compiles() {
    let vs = read_source(&shader_path("composite.vert.wgsl")).unwrap();
    let fs = read_source(&shader_path("composite.frag.wgsl")).unwrap();
    compile_stage(Stage::Vertex, &vs).unwrap();
    compile_stage(Stage::Fragment, &fs).unwrap();
}

#[test]
fn missing_shader_file_fails_deterministically() {
    let err = read_source(&shader_path("does_not_exist.wgsl")).unwrap_err();
    match err {
        ShaderError::Read { path, .. } => {
            assert!(path.ends_with("does_not_exist.wgsl"));
        }
        other => panic!("expected Read, got {other:?}"),
    }
}

#[test]
fn broken_fragment_fixture_reports_a_parse_diagnostic() {
    let source = read_source(&fixture_path("bad_syntax.frag.wgsl")).unwrap();
    let err = compile_stage(Stage::Fragment, &source).unwrap_err();
    match err {
        ShaderError::Parse { stage, diagnostic } => {
            assert_eq!(stage, Stage::Fragment);
            assert!(!diagnostic.is_empty(), "diagnostic should be human-readable");
        }
        other => panic!("expected Parse, got {other:?}"),
    }
}

// --- GPU required -----------------------------------------------------------

#[test]
fn valid_pair_builds_a_program_with_the_resolution_resolved() {
    let Some(ctx) = gpu() else { return };
    let program = ShaderProgram::from_paths(
        &ctx.device,
        &shader_path("composite.vert.wgsl"),
        &shader_path("composite.frag.wgsl"),
        COLOR_FORMAT,
    )
    .unwrap();
    assert_eq!(
        program.resolution_binding(),
        ResolutionBinding { group: 0, binding: 0 }
    );
}

#[test]
fn broken_fragment_leaves_no_program_behind() {
    let Some(ctx) = gpu() else { return };
    let err = ShaderProgram::from_paths(
        &ctx.device,
        &shader_path("composite.vert.wgsl"),
        &fixture_path("bad_syntax.frag.wgsl"),
        COLOR_FORMAT,
    )
    .unwrap_err();
    assert!(matches!(err, ShaderError::Parse { stage: Stage::Fragment, .. }), "{err:?}");
}

#[test]
fn fragment_without_resolution_uniform_is_rejected() {
    let Some(ctx) = gpu() else { return };
    let err = ShaderProgram::from_paths(
        &ctx.device,
        &shader_path("composite.vert.wgsl"),
        &fixture_path("no_resolution.frag.wgsl"),
        COLOR_FORMAT,
    )
    .unwrap_err();
    assert!(matches!(err, ShaderError::MissingResolutionUniform), "{err:?}");
}

#[test]
fn missing_file_leaves_no_program_behind() {
    let Some(ctx) = gpu() else { return };
    let err = ShaderProgram::from_paths(
        &ctx.device,
        &shader_path("composite.vert.wgsl"),
        &shader_path("does_not_exist.wgsl"),
        COLOR_FORMAT,
    )
    .unwrap_err();
    assert!(matches!(err, ShaderError::Read { .. }), "{err:?}");
}
