//! Average frame-rate reporting over fixed windows of render time.

/// Default reporting window in seconds.
pub const DEFAULT_REPORT_INTERVAL: f64 = 5.0;

/// One average-FPS report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FpsReport {
    /// Frames in the window divided by the window length, truncated.
    pub average_fps: u32,
    /// Frames rendered during the window.
    pub frames: u32,
}

/// Accumulates render time and reports the average frame rate once per window.
///
/// When the accumulated time reaches the interval, a report fires and both
/// the accumulator and the frame counter go back to zero. Overshoot past the
/// interval is discarded rather than carried into the next window.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    interval: f64,
    elapsed: f64,
    frames: u32,
}

impl FpsCounter {
    /// An interval that is not a positive finite number falls back to
    /// [`DEFAULT_REPORT_INTERVAL`].
    pub fn new(interval_secs: f64) -> Self {
        let interval = if interval_secs.is_finite() && interval_secs > 0.0 {
            interval_secs
        } else {
            DEFAULT_REPORT_INTERVAL
        };
        Self {
            interval,
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Records one rendered frame that took `dt` seconds.
    pub fn record(&mut self, dt: f64) -> Option<FpsReport> {
        self.elapsed += dt;
        self.frames += 1;

        if self.elapsed < self.interval {
            return None;
        }

        let report = FpsReport {
            average_fps: (self.frames as f64 / self.interval) as u32,
            frames: self.frames,
        };
        self.elapsed = 0.0;
        self.frames = 0;
        Some(report)
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_INTERVAL)
    }
}
