use crate::config::{DEFAULT_PREVIEW_FRAME_LIMIT, DEFAULT_PREVIEW_ITERATIONS};

/// Sub-step policy: a first call of a short (preview) sequence is fast-forwarded
/// so a single render already shows accumulated motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewWarmup {
    pub preview_iterations: usize,
    pub preview_frame_limit: usize,
}

impl Default for PreviewWarmup {
    fn default() -> Self {
        Self {
            preview_iterations: DEFAULT_PREVIEW_ITERATIONS,
            preview_frame_limit: DEFAULT_PREVIEW_FRAME_LIMIT,
        }
    }
}

impl PreviewWarmup {
    pub fn iterations(&self, frame_index: usize, total_frames: usize) -> usize {
        if frame_index == 0 && total_frames <= self.preview_frame_limit {
            self.preview_iterations.max(1)
        } else {
            1
        }
    }
}

/// [`PreviewWarmup::iterations`] with the default thresholds.
pub fn iterations(frame_index: usize, total_frames: usize) -> usize {
    PreviewWarmup::default().iterations(frame_index, total_frames)
}
