use std::collections::VecDeque;
use std::time::Duration;

/// Default cap on the wall time credited to one frame. Keeps a window that
/// was hidden or stalled from replaying minutes of simulation on return.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(1000);

/// Number of frame-time samples kept by [`FrameStats`].
const FRAME_SAMPLES: usize = 60;

/// Fixed-timestep accumulator.
///
/// Each display frame credits the elapsed wall time (clamped to
/// `max_elapsed`) and then drains it in whole `interval` steps. Whatever is
/// left over carries into the next frame.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    interval: Duration,
    accumulated: Duration,
    max_elapsed: Duration,
}

impl FixedTimestep {
    /// `update_frequency` is clamped to at least 1 update per second.
    pub fn new(update_frequency: u32) -> Self {
        Self::with_interval(Duration::from_secs_f64(1.0 / update_frequency.max(1) as f64))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_nanos(1)),
            accumulated: Duration::ZERO,
            max_elapsed: MAX_FRAME_DELTA,
        }
    }

    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    pub fn interval(&self) -> Duration { self.interval }
    pub fn accumulated(&self) -> Duration { self.accumulated }
    pub fn max_elapsed(&self) -> Duration { self.max_elapsed }

    /// Credit `elapsed` and return how many updates are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed.min(self.max_elapsed);

        let mut steps = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            steps += 1;
        }
        steps
    }

    /// Drop any carried time, e.g. after a state reload.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

/// Rolling buffer of recent frame times, used by the debug overlay.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frame_times: VecDeque<f32>,
    updates_last_frame: u32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FRAME_SAMPLES),
            updates_last_frame: 0,
        }
    }

    pub fn record(&mut self, elapsed: Duration, updates: u32) {
        if self.frame_times.len() >= FRAME_SAMPLES {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(elapsed.as_secs_f32());
        self.updates_last_frame = updates;
    }

    /// Average frame time in seconds, `0.0` before the first frame.
    pub fn average_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let avg = self.average_frame_time();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    pub fn updates_last_frame(&self) -> u32 { self.updates_last_frame }
    pub fn samples(&self) -> usize { self.frame_times.len() }
}
