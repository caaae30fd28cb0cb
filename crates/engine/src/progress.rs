use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::scheduler::{RunId, Scheduler, TimerHandle, TimerSignal};

/// Upper bound of the progress value.
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// Source of the per-tick progress increments.
pub trait IncrementSource {
    /// Returns the next increment in percentage points.
    fn next_increment(&mut self) -> f64;
}

/// Uniform random increments in `[min, max)`.
#[derive(Debug, Clone)]
pub struct RandomIncrements<R> {
    rng: R,
    min: f64,
    max: f64,
}

impl<R: Rng> RandomIncrements<R> {
    /// `min` must be strictly below `max`.
    pub fn new(rng: R, min: f64, max: f64) -> Self {
        assert!(min < max, "increment range must not be empty");
        Self { rng, min, max }
    }
}

impl RandomIncrements<StdRng> {
    /// Increments drawn from an OS-seeded generator.
    pub fn from_entropy(min: f64, max: f64) -> Self {
        Self::new(StdRng::from_entropy(), min, max)
    }
}

impl<R: Rng> IncrementSource for RandomIncrements<R> {
    fn next_increment(&mut self) -> f64 {
        self.rng.gen_range(self.min..self.max)
    }
}

/// Replays a fixed sequence of increments, cycling when exhausted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedIncrements {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedIncrements {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl IncrementSource for FixedIncrements {
    fn next_increment(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[derive(Debug)]
struct ArmedRun {
    run: RunId,
    tick: TimerHandle,
    completion: TimerHandle,
}

impl ArmedRun {
    fn cancel(&self) {
        self.tick.cancel();
        self.completion.cancel();
    }
}

/// Progress ramp of the current run and the two timers driving it.
///
/// At most one run is armed at a time; arming a new run cancels both timers
/// of the previous one first.
#[derive(Debug)]
pub struct ProgressSimulator {
    tick_period: Duration,
    completion_delay: Duration,
    progress: f64,
    armed: Option<ArmedRun>,
}

impl ProgressSimulator {
    pub fn new(tick_period: Duration, completion_delay: Duration) -> Self {
        Self {
            tick_period,
            completion_delay,
            progress: 0.0,
            armed: None,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.armed.as_ref().map(|armed| armed.run)
    }

    /// Whether `signal` belongs to the armed run.
    pub fn accepts(&self, signal: &TimerSignal) -> bool {
        self.current_run() == Some(signal.run)
    }

    /// Cancels any armed run, resets progress and arms both timers for `run`.
    pub fn arm<S: Scheduler>(&mut self, scheduler: &mut S, run: RunId) {
        if let Some(previous) = self.cancel() {
            debug!(previous, run, "previous run cancelled before re-arm");
        }
        self.progress = 0.0;
        let tick = scheduler.schedule_repeating(self.tick_period, TimerSignal::tick(run));
        let completion =
            scheduler.schedule_once(self.completion_delay, TimerSignal::completion(run));
        self.armed = Some(ArmedRun {
            run,
            tick,
            completion,
        });
    }

    /// Cancels both timers of the armed run, if any, and returns its id.
    pub fn cancel(&mut self) -> Option<RunId> {
        let armed = self.armed.take()?;
        armed.cancel();
        Some(armed.run)
    }

    /// Adds `increment` to the progress, capped at 100.
    pub fn advance(&mut self, increment: f64) -> f64 {
        let increment = if increment.is_finite() {
            increment.max(0.0)
        } else {
            0.0
        };
        self.progress = (self.progress + increment).min(PROGRESS_COMPLETE);
        self.progress
    }

    /// Forces progress to 100 and releases the armed run.
    pub fn finish(&mut self) -> Option<RunId> {
        let run = self.cancel();
        self.progress = PROGRESS_COMPLETE;
        run
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}
