//! Headless one-frame demo: build the effect, record an (empty) scene into
//! the off-screen target, composite it into an output texture, and submit.
//!
//! Run with `RUST_LOG=info cargo run -p postfx-gpu --example offscreen`.

use std::path::Path;

use postfx_gpu::{GpuContext, PostProcessEffect, COLOR_FORMAT};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let ctx = pollster::block_on(GpuContext::new_headless())?;

    let shaders = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
    let mut effect = PostProcessEffect::new(
        &ctx.device,
        800,
        600,
        &shaders.join("composite.vert.wgsl"),
        &shaders.join("composite.frag.wgsl"),
        COLOR_FORMAT,
    )?;

    let output = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen_output"),
        size: wgpu::Extent3d {
            width: 800,
            height: 600,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let output_view = output.create_view(&Default::default());

    let mut encoder = ctx.device.create_command_encoder(&Default::default());
    {
        let _scene_pass = effect.begin(&mut encoder);
        // A real renderer records its scene draws here.
    }
    effect.end(&ctx.queue, &mut encoder, &output_view);
    ctx.queue.submit([encoder.finish()]);
    ctx.device.poll(wgpu::Maintain::Wait);

    log::info!(
        "composited one {}×{} frame through the post-process bracket",
        effect.width(),
        effect.height()
    );
    Ok(())
}
