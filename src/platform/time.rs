//! Frame timing

use crate::consts::MAX_FRAME_MS;

/// Turns animation-frame timestamps into clamped frame times
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous timestamp, clamped to `[0, MAX_FRAME_MS]`
    ///
    /// Long stalls (tab switches, breakpoints) become one slow frame instead of
    /// a huge jump.
    pub fn advance(&mut self, timestamp_ms: f64) -> f32 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }
        let elapsed = timestamp_ms - self.last;
        self.last = timestamp_ms;
        elapsed.clamp(0.0, MAX_FRAME_MS as f64) as f32
    }
}
