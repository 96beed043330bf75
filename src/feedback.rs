/// Transient pad highlighting
use crate::clock::{TimerHandle, TimerQueue, TimerTask};
use crate::instrument::Instrument;

pub const DEFAULT_FLASH_MS: u64 = 100;

/// A pad is lit while it has a pending clear timer.
#[derive(Debug)]
pub struct VisualFeedback {
    flash_ms: u64,
    pending: [Option<TimerHandle>; Instrument::COUNT],
}

impl VisualFeedback {
    pub fn new(flash_ms: u64) -> Self {
        Self {
            flash_ms,
            pending: [None; Instrument::COUNT],
        }
    }

    /// Light the pad for `flash_ms`. A flash on an already lit pad restarts
    /// the window.
    pub fn flash(&mut self, instrument: Instrument, timers: &mut TimerQueue, now: u64) {
        if let Some(previous) = self.pending[instrument.index()].take() {
            timers.cancel(previous);
        }
        let handle = timers.after(now, self.flash_ms, TimerTask::ClearFlash(instrument));
        self.pending[instrument.index()] = Some(handle);
    }

    pub fn clear(&mut self, instrument: Instrument) {
        self.pending[instrument.index()] = None;
    }

    pub fn is_lit(&self, instrument: Instrument) -> bool {
        self.pending[instrument.index()].is_some()
    }
}

impl Default for VisualFeedback {
    fn default() -> Self {
        Self::new(DEFAULT_FLASH_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(feedback: &mut VisualFeedback, timers: &mut TimerQueue, now: u64) {
        while let Some((_, task)) = timers.pop_due(now) {
            if let TimerTask::ClearFlash(i) = task {
                feedback.clear(i);
            }
        }
    }

    #[test]
    fn test_flash_clears_after_window() {
        let mut timers = TimerQueue::new();
        let mut feedback = VisualFeedback::default();
        feedback.flash(Instrument::Clap, &mut timers, 0);
        assert!(feedback.is_lit(Instrument::Clap));
        drain(&mut feedback, &mut timers, 99);
        assert!(feedback.is_lit(Instrument::Clap));
        drain(&mut feedback, &mut timers, 100);
        assert!(!feedback.is_lit(Instrument::Clap));
    }

    #[test]
    fn test_overlapping_flash_restarts_window() {
        let mut timers = TimerQueue::new();
        let mut feedback = VisualFeedback::default();
        feedback.flash(Instrument::Tom, &mut timers, 0);
        feedback.flash(Instrument::Tom, &mut timers, 60);
        drain(&mut feedback, &mut timers, 100);
        assert!(feedback.is_lit(Instrument::Tom));
        drain(&mut feedback, &mut timers, 160);
        assert!(!feedback.is_lit(Instrument::Tom));
        assert!(timers.is_empty());
    }
}
