use tracing::{debug, warn};

const FRAMES_PER_SAMPLE: u32 = 60;
const LOW_FPS_THRESHOLD: f64 = 30.0;

/// Frame-rate bookkeeping for the overlay loop.
///
/// Timestamps are seconds on a monotonic clock, such as egui's `InputState::time`.
#[derive(Debug, Clone, Default)]
pub struct FrameMonitor {
    frame_count: u32,
    sample_start: Option<f64>,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a frame; every 60 frames the rate is computed and returned.
    pub fn record_frame(&mut self, now: f64) -> Option<f64> {
        let start = match self.sample_start {
            Some(start) if now >= start => start,
            _ => {
                self.frame_count = 0;
                self.sample_start = Some(now);
                return None;
            }
        };

        self.frame_count += 1;
        if self.frame_count < FRAMES_PER_SAMPLE {
            return None;
        }

        let elapsed = (now - start).max(0.001);
        let fps = f64::from(self.frame_count) / elapsed;
        self.frame_count = 0;
        self.sample_start = Some(now);

        if fps < LOW_FPS_THRESHOLD {
            warn!("Low frame rate: {:.1} FPS", fps);
        } else {
            debug!("Frame rate: {:.1} FPS", fps);
        }
        Some(fps)
    }
}
