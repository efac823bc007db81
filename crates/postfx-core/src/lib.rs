pub mod quad;

pub use quad::{QuadVertex, FULLSCREEN_QUAD, QUAD_VERTEX_COUNT};

// ---------------------------------------------------------------------------
// FramePhase — where the begin/end bracket currently stands
// ---------------------------------------------------------------------------

/// Per-frame state of the post-processing bracket.
///
/// `begin()` moves to `Recording` (scene draws go to the off-screen target),
/// `end()` back to `Idle` (the composite has been recorded). An `end()` while
/// already `Idle` is legal: it re-presents whatever the off-screen texture
/// last held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    Idle,
    Recording,
}

impl FramePhase {
    /// True if an `end()` in this phase would re-present stale contents
    /// rather than the scene recorded this frame.
    pub fn is_stale_present(self) -> bool {
        self == FramePhase::Idle
    }
}
