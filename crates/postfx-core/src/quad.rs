//! Full-screen quad geometry for the composite draw.
//!
//! Two triangles covering clip space exactly, each vertex carrying a 2D
//! clip-space position in [-1, 1] and a texture coordinate in [0, 1] with
//! uv = (pos + 1) / 2 — so (0, 0) samples the texel shown at the (-1, -1)
//! corner. The geometry is resolution-independent: the same six vertices
//! cover the viewport whatever the render target size.

use glam::Vec2;

/// One vertex of the full-screen quad. `repr(C)` + `bytemuck` so the slice
/// casts straight to `&[u8]` for the GPU vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

const fn v(x: f32, y: f32, u: f32, w: f32) -> QuadVertex {
    QuadVertex {
        position: [x, y],
        tex_coord: [u, w],
    }
}

/// Number of vertices in the composite draw call.
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// The six vertices, two triangles sharing the (1,-1)–(-1,1) diagonal.
pub const FULLSCREEN_QUAD: [QuadVertex; 6] = [
    v(1.0, -1.0, 1.0, 0.0),
    v(-1.0, -1.0, 0.0, 0.0),
    v(-1.0, 1.0, 0.0, 1.0),
    //
    v(1.0, 1.0, 1.0, 1.0),
    v(1.0, -1.0, 1.0, 0.0),
    v(-1.0, 1.0, 0.0, 1.0),
];

/// Signed area of the (a, b, p) edge function. Positive on one side of the
/// a→b edge, negative on the other, zero on the edge itself.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Whether `p` lies inside the triangle formed by three consecutive quad
/// vertices, with `slack` widening (positive) or shrinking (negative) the
/// triangle by roughly that many clip-space units at each edge. Handles
/// either winding.
pub fn triangle_contains(tri: &[QuadVertex], p: Vec2, slack: f32) -> bool {
    let a = Vec2::from(tri[0].position);
    let b = Vec2::from(tri[1].position);
    let c = Vec2::from(tri[2].position);
    let e0 = edge(a, b, p);
    let e1 = edge(b, c, p);
    let e2 = edge(c, a, p);
    let orient = if edge(a, b, c) >= 0.0 { 1.0 } else { -1.0 };
    e0 * orient >= -slack && e1 * orient >= -slack && e2 * orient >= -slack
}

/// How many of the quad's two triangles contain `p` (with `slack` as above).
pub fn coverage(p: Vec2, slack: f32) -> usize {
    FULLSCREEN_QUAD
        .chunks(3)
        .filter(|tri| triangle_contains(tri, p, slack))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    // --- Static shape ----------------------------------------------------------

    #[test]
    fn six_vertices_on_the_clip_square() {
        assert_eq!(FULLSCREEN_QUAD.len(), QUAD_VERTEX_COUNT as usize);
        for vtx in &FULLSCREEN_QUAD {
            assert_eq!(vtx.position[0].abs(), 1.0, "{vtx:?}");
            assert_eq!(vtx.position[1].abs(), 1.0, "{vtx:?}");
        }
    }

    #[test]
    fn uv_is_position_remapped_to_unit_square() {
        for vtx in &FULLSCREEN_QUAD {
            let expect_u = (vtx.position[0] + 1.0) * 0.5;
            let expect_w = (vtx.position[1] + 1.0) * 0.5;
            assert_eq!(vtx.tex_coord, [expect_u, expect_w], "{vtx:?}");
        }
    }

    #[test]
    fn uv_origin_sits_at_lower_left_corner() {
        let lower_left = FULLSCREEN_QUAD
            .iter()
            .find(|vtx| vtx.position == [-1.0, -1.0])
            .expect("quad has a (-1,-1) corner");
        assert_eq!(lower_left.tex_coord, [0.0, 0.0]);
    }

    #[test]
    fn every_corner_appears() {
        for corner in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(
                FULLSCREEN_QUAD.iter().any(|vtx| vtx.position == corner),
                "missing corner {corner:?}"
            );
        }
    }

    #[test]
    fn triangles_are_not_degenerate() {
        for tri in FULLSCREEN_QUAD.chunks(3) {
            let a = Vec2::from(tri[0].position);
            let b = Vec2::from(tri[1].position);
            let c = Vec2::from(tri[2].position);
            // Each triangle is half the 2×2 clip square → area 2.
            assert!((edge(a, b, c).abs() * 0.5 - 2.0).abs() < EPS);
        }
    }

    // --- Rasterization round-trip ----------------------------------------------
    //
    // Sample a grid of "pixel centers" across clip space. Every sample must be
    // covered (no gaps), and no sample may be strictly interior to both
    // triangles (no overlap — shared-edge samples touch both, which is what a
    // rasterizer's fill rule resolves, so the strict test excludes the edge).

    #[test]
    fn pixel_centers_fully_covered_without_overlap() {
        const N: usize = 64;
        for j in 0..N {
            for i in 0..N {
                let p = Vec2::new(
                    -1.0 + (i as f32 + 0.5) * 2.0 / N as f32,
                    -1.0 + (j as f32 + 0.5) * 2.0 / N as f32,
                );
                assert!(coverage(p, EPS) >= 1, "gap at {p}");
                assert!(coverage(p, -EPS) <= 1, "overlap at {p}");
            }
        }
    }

    #[test]
    fn points_outside_clip_space_are_not_covered() {
        for p in [
            Vec2::new(-1.01, 0.0),
            Vec2::new(1.01, 0.0),
            Vec2::new(0.0, -1.01),
            Vec2::new(0.0, 1.01),
            Vec2::new(2.0, 2.0),
        ] {
            assert_eq!(coverage(p, EPS), 0, "covered outside the quad: {p}");
        }
    }

    #[test]
    fn vertex_bytes_cast_cleanly() {
        let bytes: &[u8] = bytemuck::cast_slice(&FULLSCREEN_QUAD);
        assert_eq!(bytes.len(), 6 * 4 * std::mem::size_of::<f32>());
    }
}
