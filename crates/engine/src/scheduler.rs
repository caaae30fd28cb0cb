use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::debug;

/// Identifier of one generation run.
pub type RunId = u64;

/// Which of the two run timers produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    ProgressTick,
    Completion,
}

/// Message delivered back to the studio when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSignal {
    pub run: RunId,
    pub kind: TimerKind,
}

impl TimerSignal {
    pub fn tick(run: RunId) -> Self {
        Self {
            run,
            kind: TimerKind::ProgressTick,
        }
    }

    pub fn completion(run: RunId) -> Self {
        Self {
            run,
            kind: TimerKind::Completion,
        }
    }
}

/// Handle to one scheduled timer.
///
/// Cancelling is idempotent and safe after the timer already fired.
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_task(mut self, task: AbortHandle) -> Self {
        self.task = Some(task);
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Timer operations required by the studio.
pub trait Scheduler {
    /// Delivers `signal` every `period`, first after one full period.
    fn schedule_repeating(&mut self, period: Duration, signal: TimerSignal) -> TimerHandle;

    /// Delivers `signal` once after `delay`.
    fn schedule_once(&mut self, delay: Duration, signal: TimerSignal) -> TimerHandle;
}

/// Tokio-backed scheduler posting fired signals into a channel.
///
/// The owner of the receiving end feeds each signal back into the studio as
/// [`Command::Timer`](crate::Command::Timer).
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    signal_tx: UnboundedSender<TimerSignal>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle, signal_tx: UnboundedSender<TimerSignal>) -> Self {
        Self { runtime, signal_tx }
    }

    /// Creates a scheduler on `runtime` and the receiver of its signals.
    pub fn channel(runtime: Handle) -> (Self, UnboundedReceiver<TimerSignal>) {
        let (signal_tx, signal_rx) = unbounded_channel();
        (Self::new(runtime, signal_tx), signal_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&mut self, period: Duration, signal: TimerSignal) -> TimerHandle {
        let handle = TimerHandle::new();
        let cancelled = Arc::clone(&handle.cancelled);
        let signal_tx = self.signal_tx.clone();
        let task = self.runtime.spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if cancelled.load(Ordering::Acquire) || signal_tx.send(signal).is_err() {
                    break;
                }
            }
        });
        debug!(run = signal.run, ?period, "repeating timer armed");
        handle.with_task(task.abort_handle())
    }

    fn schedule_once(&mut self, delay: Duration, signal: TimerSignal) -> TimerHandle {
        let handle = TimerHandle::new();
        let cancelled = Arc::clone(&handle.cancelled);
        let signal_tx = self.signal_tx.clone();
        let task = self.runtime.spawn(async move {
            sleep(delay).await;
            if !cancelled.load(Ordering::Acquire) {
                let _ = signal_tx.send(signal);
            }
        });
        debug!(run = signal.run, ?delay, "one-shot timer armed");
        handle.with_task(task.abort_handle())
    }
}

#[derive(Debug)]
struct ManualTimer {
    seq: u64,
    due: Duration,
    period: Option<Duration>,
    signal: TimerSignal,
    handle: TimerHandle,
}

#[derive(Debug, Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    timers: Vec<ManualTimer>,
}

/// Virtual-clock scheduler for deterministic drivers.
///
/// Nothing fires on its own; [`ManualScheduler::advance`] moves the clock
/// and hands due signals to the caller in time order. Clones share the same
/// clock.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use engine::{ManualScheduler, Scheduler, TimerSignal};
///
/// let mut scheduler = ManualScheduler::new();
/// scheduler.schedule_once(Duration::from_millis(100), TimerSignal::completion(1));
///
/// let mut fired = Vec::new();
/// scheduler.advance(Duration::from_millis(150), |signal| fired.push(signal));
/// assert_eq!(fired, vec![TimerSignal::completion(1)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of armed timers that are not cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .timers
            .iter()
            .filter(|timer| !timer.handle.is_cancelled())
            .count()
    }

    /// Advances the clock by `by`, delivering each due signal in order.
    ///
    /// Cancellation is re-checked before every delivery, so a timer cancelled
    /// by an earlier delivery in the same advance never fires.
    pub fn advance<F>(&self, by: Duration, mut deliver: F)
    where
        F: FnMut(TimerSignal),
    {
        let target = self.now() + by;
        loop {
            let signal = {
                let mut clock = self.lock();
                clock.timers.retain(|timer| !timer.handle.is_cancelled());
                let next = clock
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.seq))
                    .map(|(index, _)| index);
                let Some(index) = next else {
                    clock.now = target;
                    break;
                };

                let due = clock.timers[index].due;
                clock.now = due;
                let signal = clock.timers[index].signal;
                match clock.timers[index].period {
                    Some(period) => clock.timers[index].due = due + period,
                    None => {
                        clock.timers.remove(index);
                    }
                }
                signal
            };
            deliver(signal);
        }
    }

    fn arm(&self, delay: Duration, period: Option<Duration>, signal: TimerSignal) -> TimerHandle {
        let handle = TimerHandle::new();
        let mut clock = self.lock();
        let seq = clock.next_seq;
        clock.next_seq += 1;
        let due = clock.now + delay;
        clock.timers.push(ManualTimer {
            seq,
            due,
            period,
            signal,
            handle: handle.clone(),
        });
        handle
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration, signal: TimerSignal) -> TimerHandle {
        self.arm(period, Some(period), signal)
    }

    fn schedule_once(&mut self, delay: Duration, signal: TimerSignal) -> TimerHandle {
        self.arm(delay, None, signal)
    }
}
