/// Time sources and the deferred/periodic timer queue
///
/// All waiting is expressed as timers: nothing blocks. Callbacks are
/// represented as [`TimerTask`] values which the owner interprets when
/// [`TimerQueue::pop_due`] hands them back.
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::instrument::Instrument;

pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Simulated clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    SequencerTick,
    PlaybackHit(Instrument),
    PlaybackFinished,
    ClearFlash(Instrument),
}

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    due: u64,
    period: Option<u64>,
    task: TimerTask,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot timer firing `delay_ms` after `now`
    pub fn after(&mut self, now: u64, delay_ms: u64, task: TimerTask) -> TimerHandle {
        self.insert(now + delay_ms, None, task)
    }

    /// Periodic timer, first firing one interval after `now`
    pub fn every(&mut self, now: u64, interval_ms: u64, task: TimerTask) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.insert(now + interval_ms, Some(interval_ms), task)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() < before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Take the earliest timer due at or before `now`, together with its
    /// nominal due time. Ties go to the timer created first. A periodic
    /// timer more than one period late fires once and resumes on its grid.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, TimerTask)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.handle.0))
            .map(|(i, _)| i)?;

        let Timer {
            due, period, task, ..
        } = self.timers[index];
        match period {
            Some(period) => {
                // missed periods are skipped, not replayed; the one firing
                // takes the latest missed slot
                let latest = due + (now - due) / period * period;
                self.timers[index].due = latest + period;
                Some((latest, task))
            }
            None => {
                self.timers.remove(index);
                Some((due, task))
            }
        }
    }

    fn insert(&mut self, due: u64, period: Option<u64>, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            due,
            period,
            task,
        });
        handle
    }
}
