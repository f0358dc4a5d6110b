// Throttle - Frame pacing for timer-based speed control
//
// Blocks the presentation thread until the next frame is due. Deadlines
// advance by one frame interval each call, so short delays are absorbed.
// When the caller falls more than two frames behind, the schedule is rebased
// to the current time instead of rushing to catch up.

use std::thread;
use std::time::{Duration, Instant};

/// Frames the schedule may lag before it is rebased
const MAX_FRAMES_BEHIND: u32 = 2;

/// Frame pacing timer
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    /// Deadline of the most recent frame
    last_frame: Option<Instant>,
}

impl Throttle {
    pub fn new() -> Self {
        Self {
            interval: Duration::ZERO,
            last_frame: None,
        }
    }

    /// Set the target rate; non-positive rates disable pacing
    pub fn set_frame_rate(&mut self, hz: f64) {
        self.interval = if hz > 0.0 && hz.is_finite() {
            Duration::from_secs_f64(1.0 / hz)
        } else {
            Duration::ZERO
        };
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Forget the schedule; the next call returns after one interval
    pub fn reset(&mut self) {
        self.last_frame = None;
    }

    /// Sleep until the next frame is due, then advance the schedule
    pub fn wait_for_frame_and_rebase_time(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        let now = Instant::now();
        let last = *self.last_frame.get_or_insert(now);
        let deadline = last + self.interval;

        if now > deadline + self.interval * MAX_FRAMES_BEHIND {
            log::trace!("Frame pacing fell behind, rebasing");
            self.last_frame = Some(now);
            return;
        }

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(deadline - now);
        }

        self.last_frame = Some(deadline);
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}
