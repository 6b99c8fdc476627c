use std::time::Duration;

use cadence2d::timing::{FixedTimestep, FrameStats, MAX_FRAME_DELTA};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

// ── FixedTimestep ─────────────────────────────────────────────────────────────

/// Exactly one interval of elapsed time is exactly one update.
#[test]
fn one_interval_runs_one_update() {
    let mut step = FixedTimestep::with_interval(ms(10));
    assert_eq!(step.advance(ms(10)), 1);
    assert_eq!(step.accumulated(), Duration::ZERO);
}

/// Time short of an interval is carried into the next frame.
#[test]
fn leftover_time_carries_over() {
    let mut step = FixedTimestep::with_interval(ms(10));
    assert_eq!(step.advance(ms(6)), 0);
    assert_eq!(step.accumulated(), ms(6));
    assert_eq!(step.advance(ms(6)), 1, "6 + 6 ms crosses one 10 ms interval");
    assert_eq!(step.accumulated(), ms(2));
}

/// A long frame catches up with several updates.
#[test]
fn long_frame_catches_up() {
    let mut step = FixedTimestep::with_interval(ms(10));
    assert_eq!(step.advance(ms(35)), 3);
    assert_eq!(step.accumulated(), ms(5));
}

/// Elapsed time is clamped to 1000 ms, so a stalled window does not replay
/// minutes of simulation.
#[test]
fn elapsed_is_clamped_to_one_second() {
    let mut step = FixedTimestep::with_interval(ms(10));
    assert_eq!(step.max_elapsed(), MAX_FRAME_DELTA);
    assert_eq!(step.advance(Duration::from_secs(60)), 100);
    assert_eq!(step.accumulated(), Duration::ZERO);
}

#[test]
fn custom_clamp_is_honoured() {
    let mut step = FixedTimestep::with_interval(ms(10)).with_max_elapsed(ms(25));
    assert_eq!(step.advance(ms(500)), 2);
    assert_eq!(step.accumulated(), ms(5));
}

#[test]
fn frequency_sets_interval() {
    let step = FixedTimestep::new(50);
    assert_eq!(step.interval(), ms(20));
}

/// A zero frequency is treated as one update per second instead of dividing
/// by zero.
#[test]
fn zero_frequency_is_clamped() {
    let step = FixedTimestep::new(0);
    assert_eq!(step.interval(), Duration::from_secs(1));
}

#[test]
fn reset_drops_carried_time() {
    let mut step = FixedTimestep::with_interval(ms(10));
    step.advance(ms(7));
    step.reset();
    assert_eq!(step.accumulated(), Duration::ZERO);
    assert_eq!(step.advance(ms(7)), 0);
}

// ── FrameStats ────────────────────────────────────────────────────────────────

#[test]
fn empty_stats_report_zero() {
    let stats = FrameStats::new();
    assert_eq!(stats.average_frame_time(), 0.0);
    assert_eq!(stats.fps(), 0.0);
    assert_eq!(stats.samples(), 0);
}

#[test]
fn fps_is_inverse_of_average_frame_time() {
    let mut stats = FrameStats::new();
    stats.record(ms(20), 1);
    stats.record(ms(30), 2);
    assert!((stats.average_frame_time() - 0.025).abs() < 1e-6);
    assert!((stats.fps() - 40.0).abs() < 0.01);
    assert_eq!(stats.updates_last_frame(), 2);
}

/// Only the most recent 60 frames are kept.
#[test]
fn stats_window_is_bounded() {
    let mut stats = FrameStats::new();
    for _ in 0..100 {
        stats.record(ms(10), 1);
    }
    assert_eq!(stats.samples(), 60);
}
