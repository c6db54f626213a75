//! Frame-pacing clock
//!
//! Drives the engine's `tick()` from outside; the engine itself has no
//! awareness of elapsed time.

use std::time::{Duration, Instant};

/// Fixed-rate frame pacer.
///
/// Calls a frame callback with the delta seconds since the previous frame,
/// sleeping between frames to hold the target rate. Tracks a one-second fps
/// window and a running average delta, like any stats overlay wants.
#[derive(Debug)]
pub struct Clock {
    target_frame_time: Duration,
    last_frame: Option<Instant>,
    delta_seconds: f64,
    average_delta_ms: f64,
    frame_count: u64,
    fps_window_start: Option<Instant>,
    fps_window_frames: u32,
    fps: u32,
}

impl Clock {
    /// `target_fps == 0` means unpaced: frames run back to back.
    pub fn new(target_fps: u32) -> Self {
        let target_frame_time = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        };
        Self {
            target_frame_time,
            last_frame: None,
            delta_seconds: 0.0,
            average_delta_ms: 0.0,
            frame_count: 0,
            fps_window_start: None,
            fps_window_frames: 0,
            fps: 0,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn delta_seconds(&self) -> f64 {
        self.delta_seconds
    }

    /// Running average frame time in milliseconds.
    pub fn average_delta_ms(&self) -> f64 {
        self.average_delta_ms
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance one frame: measure the delta, update the stats counters.
    pub fn advance(&mut self) -> f64 {
        let now = Instant::now();
        self.delta_seconds = match self.last_frame {
            Some(last) => now.duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_frame = Some(now);
        self.frame_count += 1;

        let delta_ms = self.delta_seconds * 1000.0;
        let n = self.frame_count as f64;
        self.average_delta_ms += (delta_ms - self.average_delta_ms) / n;

        match self.fps_window_start {
            Some(start) if now.duration_since(start) < Duration::from_secs(1) => {
                self.fps_window_frames += 1;
            }
            _ => {
                self.fps = self.fps_window_frames;
                self.fps_window_frames = 1;
                self.fps_window_start = Some(now);
            }
        }

        self.delta_seconds
    }

    /// Run `frames` frames, calling `callback(delta_seconds)` once per frame
    /// and sleeping to hold the target rate.
    pub fn run(&mut self, frames: u64, mut callback: impl FnMut(f64)) {
        for _ in 0..frames {
            let frame_start = Instant::now();
            let delta = self.advance();
            callback(delta);
            self.hold_rate(frame_start);
        }
    }

    /// Like [`Clock::run`], but stops at the first frame whose callback
    /// returns an error and propagates it; remaining frames never run.
    pub fn try_run<E>(
        &mut self,
        frames: u64,
        mut callback: impl FnMut(f64) -> Result<(), E>,
    ) -> Result<(), E> {
        for _ in 0..frames {
            let frame_start = Instant::now();
            let delta = self.advance();
            callback(delta)?;
            self.hold_rate(frame_start);
        }
        Ok(())
    }

    fn hold_rate(&self, frame_start: Instant) {
        let elapsed = frame_start.elapsed();
        if elapsed < self.target_frame_time {
            std::thread::sleep(self.target_frame_time - elapsed);
        }
    }

    /// Measure how long `func` takes, in milliseconds.
    pub fn measure(func: impl FnOnce()) -> f64 {
        let start = Instant::now();
        func();
        start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_requested_frames() {
        let mut clock = Clock::new(0);
        let mut calls = 0;
        clock.run(5, |_| calls += 1);
        assert_eq!(calls, 5);
        assert_eq!(clock.frame_count(), 5);
    }

    #[test]
    fn test_try_run_stops_at_first_error() {
        let mut clock = Clock::new(0);
        let mut calls = 0;
        let result: Result<(), &str> = clock.try_run(5, |_| {
            calls += 1;
            if calls == 2 {
                Err("boom")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 2, "frames after the failure never run");
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_first_delta_is_zero() {
        let mut clock = Clock::new(0);
        assert_eq!(clock.advance(), 0.0);
        assert!(clock.advance() >= 0.0);
    }

    #[test]
    fn test_paced_run_is_not_faster_than_target() {
        let mut clock = Clock::new(100);
        let start = Instant::now();
        clock.run(3, |_| {});
        // 3 frames at 100fps: at least ~30ms including the first frame's sleep
        assert!(start.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn test_measure_reports_elapsed() {
        let ms = Clock::measure(|| std::thread::sleep(Duration::from_millis(10)));
        assert!(ms >= 10.0);
    }
}
