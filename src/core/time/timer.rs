//=========================================================================
// Timer
//=========================================================================
//
// Countdown utility advanced once per tick by its owner.
//
// Flow:
//   start() → update(delta) ... → elapsed ≥ duration → on_completed
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Timer ===============================================================

type TimerCallback = Box<dyn FnMut() + Send>;

/// Elapsed-time counter with optional start/completion callbacks.
///
/// The owner must call [`Timer::update`] every tick with the frame delta.
pub struct Timer {
    label: String,
    duration: f32,
    elapsed: f32,
    running: bool,
    on_started: Option<TimerCallback>,
    on_completed: Option<TimerCallback>,
}

impl Timer {
    //--- Construction -----------------------------------------------------

    pub fn new(duration: f32) -> Self {
        Self::with_label("", duration)
    }

    pub fn with_label(label: impl Into<String>, duration: f32) -> Self {
        Self {
            label: label.into(),
            duration: duration.max(0.0),
            elapsed: 0.0,
            running: false,
            on_started: None,
            on_completed: None,
        }
    }

    /// Registers a callback run whenever the timer starts.
    pub fn on_started<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_started = Some(Box::new(callback));
        self
    }

    /// Registers a callback run when the timer reaches its duration.
    pub fn on_completed<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_completed = Some(Box::new(callback));
        self
    }

    //--- Control ----------------------------------------------------------

    /// Starts the timer.
    ///
    /// With `reset`, elapsed time is cleared first. Starting a running
    /// timer does nothing.
    pub fn start(&mut self, invoke_start: bool, reset: bool) {
        if reset {
            self.reset();
        }

        if self.running {
            return;
        }
        self.running = true;

        if invoke_start {
            if let Some(callback) = self.on_started.as_mut() {
                callback();
            }
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Clears elapsed time and stops the timer.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.running = false;
    }

    /// Advances a running timer by `delta` seconds.
    ///
    /// Returns `true` on the tick the timer completes. Elapsed time is
    /// clamped to the duration and the timer stops.
    pub fn update(&mut self, delta: f32) -> bool {
        if !self.running {
            return false;
        }

        self.elapsed += delta;

        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.running = false;
            if let Some(callback) = self.on_completed.as_mut() {
                callback();
            }
            return true;
        }

        false
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
    }

    //--- Queries ----------------------------------------------------------

    /// Progress in `0.0..=1.0`; always 0 for a zero-length timer.
    pub fn normalized_time(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("label", &self.label)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("running", &self.running)
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn idle_timer_does_not_advance() {
        let mut timer = Timer::new(1.0);
        assert!(!timer.update(0.5));
        assert_eq!(timer.elapsed(), 0.0);
    }

    #[test]
    fn completes_once_and_clamps() {
        let completions = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&completions);
        let mut timer = Timer::with_label("cooldown", 1.0).on_completed(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        timer.start(true, false);
        assert!(!timer.update(0.5));
        assert!(timer.update(0.75));
        assert!(!timer.update(0.75));

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(timer.elapsed(), 1.0);
        assert!(!timer.is_running());
        assert_eq!(timer.label(), "cooldown");
    }

    #[test]
    fn start_callback_respects_flag() {
        let starts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&starts);
        let mut timer = Timer::new(1.0).on_started(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        timer.start(false, false);
        timer.stop();
        timer.start(true, false);
        timer.start(true, false);

        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_with_reset_restarts_from_zero() {
        let mut timer = Timer::new(2.0);
        timer.start(true, false);
        timer.update(1.5);
        timer.start(true, true);
        assert_eq!(timer.elapsed(), 0.0);
        assert!(timer.is_running());
    }

    #[test]
    fn normalized_time_handles_zero_duration() {
        let mut timer = Timer::new(4.0);
        timer.start(true, false);
        timer.update(1.0);
        assert_eq!(timer.normalized_time(), 0.25);

        timer.set_duration(-3.0);
        assert_eq!(timer.duration(), 0.0);
        assert_eq!(timer.normalized_time(), 0.0);
    }
}
