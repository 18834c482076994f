//=========================================================================
// Time
//=========================================================================
//
// Per-frame time source plus the two time-driven utilities built on it.
//
// - FrameTime: delta / elapsed / frame counter, advanced once per tick
// - Timer:     countdown owned and updated by a single component
// - Scheduler: (deadline, task) queue polled by the engine every tick
//
//=========================================================================

//=== Module Declarations =================================================

mod scheduler;
mod timer;

//=== Public API ==========================================================

pub use scheduler::{ScheduledTask, Scheduler, TaskId};
pub use timer::Timer;

//=== FrameTime ===========================================================

/// Snapshot of the logical clock for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous tick.
    pub delta: f32,
    /// Seconds since the clock started.
    pub elapsed: f64,
    /// Number of ticks advanced so far.
    pub frame: u64,
}

impl FrameTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by one tick of `delta` seconds.
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += f64::from(delta);
        self.frame += 1;
    }

    /// Builds a snapshot at an explicit point in time.
    pub fn at(elapsed: f64, delta: f32, frame: u64) -> Self {
        Self { delta, elapsed, frame }
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_elapsed_and_frames() {
        let mut time = FrameTime::new();
        time.advance(0.5);
        time.advance(0.25);

        assert_eq!(time.frame, 2);
        assert_eq!(time.delta, 0.25);
        assert_eq!(time.elapsed, 0.75);
    }
}
