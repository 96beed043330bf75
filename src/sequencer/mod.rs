/// Beat grid state and the fixed-clock step sequencer
use crate::clock::{TimerHandle, TimerQueue, TimerTask};
use crate::instrument::Instrument;

pub mod recorder;

pub const DEFAULT_BEATS_PER_SEQUENCE: usize = 8;
/// 120 BPM at 8th-note resolution
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

/// One row per instrument, one column per beat
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Vec<bool>>,
    beats: usize,
}

impl Grid {
    pub fn new(beats: usize) -> Self {
        Self {
            cells: vec![vec![false; beats]; Instrument::COUNT],
            beats,
        }
    }

    pub fn beats(&self) -> usize {
        self.beats
    }

    pub fn get(&self, instrument: Instrument, beat: usize) -> bool {
        self.cells
            .get(instrument.index())
            .and_then(|row| row.get(beat))
            .copied()
            .unwrap_or(false)
    }

    /// Flip one cell, returning its new value, or `None` if out of range
    pub fn toggle(&mut self, instrument: Instrument, beat: usize) -> Option<bool> {
        let cell = self.cells.get_mut(instrument.index())?.get_mut(beat)?;
        *cell = !*cell;
        Some(*cell)
    }

    /// Active instruments at a beat, in declaration order
    pub fn column(&self, beat: usize) -> Vec<Instrument> {
        Instrument::ALL
            .iter()
            .copied()
            .filter(|i| self.get(*i, beat))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SequencerState {
    pub is_playing: bool,
    pub current_beat: usize,
    pub clock: Option<TimerHandle>,
}

pub struct SequencerEngine {
    grid: Grid,
    state: SequencerState,
    tick_interval_ms: u64,
}

impl SequencerEngine {
    pub fn new(beats: usize, tick_interval_ms: u64) -> Self {
        Self {
            grid: Grid::new(beats.max(1)),
            state: SequencerState::default(),
            tick_interval_ms,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn current_beat(&self) -> usize {
        self.state.current_beat
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Beat column that sounded most recently, for highlighting
    pub fn last_fired_beat(&self) -> Option<usize> {
        if !self.state.is_playing {
            return None;
        }
        let beats = self.grid.beats();
        Some((self.state.current_beat + beats - 1) % beats)
    }

    pub fn toggle_cell(&mut self, instrument: Instrument, beat: usize) -> Option<bool> {
        let value = self.grid.toggle(instrument, beat);
        if value.is_none() {
            log::warn!(
                "Ignoring toggle of {} beat {} (sequence has {} beats)",
                instrument,
                beat,
                self.grid.beats()
            );
        }
        value
    }

    /// Start or stop. Starting resets to beat 0, fires it immediately and
    /// returns its hits; stopping cancels the clock and returns nothing.
    pub fn toggle(&mut self, timers: &mut TimerQueue, now: u64) -> Vec<Instrument> {
        if self.state.is_playing {
            if let Some(handle) = self.state.clock.take() {
                timers.cancel(handle);
            }
            self.state.is_playing = false;
            log::debug!("Sequencer stopped at beat {}", self.state.current_beat);
            Vec::new()
        } else {
            self.state.is_playing = true;
            self.state.current_beat = 0;
            let hits = self.fire_beat();
            self.state.clock =
                Some(timers.every(now, self.tick_interval_ms, TimerTask::SequencerTick));
            log::debug!("Sequencer started");
            hits
        }
    }

    /// Periodic clock callback
    pub fn on_clock_tick(&mut self) -> Vec<Instrument> {
        if !self.state.is_playing {
            return Vec::new();
        }
        self.fire_beat()
    }

    fn fire_beat(&mut self) -> Vec<Instrument> {
        let hits = self.grid.column(self.state.current_beat);
        self.state.current_beat = (self.state.current_beat + 1) % self.grid.beats();
        hits
    }
}

impl Default for SequencerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_BEATS_PER_SEQUENCE, DEFAULT_TICK_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(8);
        assert_eq!(grid.beats(), 8);
        for instrument in Instrument::ALL {
            for beat in 0..8 {
                assert!(!grid.get(instrument, beat));
            }
        }
    }

    #[test]
    fn test_grid_toggle() {
        let mut grid = Grid::new(8);
        assert_eq!(grid.toggle(Instrument::Kick, 3), Some(true));
        assert!(grid.get(Instrument::Kick, 3));
        assert_eq!(grid.toggle(Instrument::Kick, 3), Some(false));
        assert!(!grid.get(Instrument::Kick, 3));
        assert_eq!(grid.toggle(Instrument::Kick, 8), None);
    }

    #[test]
    fn test_column_in_declaration_order() {
        let mut grid = Grid::new(8);
        grid.toggle(Instrument::Boom, 2);
        grid.toggle(Instrument::Kick, 2);
        grid.toggle(Instrument::Hihat, 2);
        grid.toggle(Instrument::Snare, 3);
        assert_eq!(
            grid.column(2),
            vec![Instrument::Kick, Instrument::Hihat, Instrument::Boom]
        );
        assert!(grid.column(4).is_empty());
    }

    #[test]
    fn test_start_fires_beat_zero() {
        let mut timers = TimerQueue::new();
        let mut seq = SequencerEngine::default();
        seq.toggle_cell(Instrument::Kick, 0);
        let hits = seq.toggle(&mut timers, 0);
        assert_eq!(hits, vec![Instrument::Kick]);
        assert!(seq.is_playing());
        assert_eq!(seq.current_beat(), 1);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_stop_keeps_beat_and_cancels_clock() {
        let mut timers = TimerQueue::new();
        let mut seq = SequencerEngine::default();
        seq.toggle(&mut timers, 0);
        seq.on_clock_tick();
        seq.on_clock_tick();
        assert_eq!(seq.current_beat(), 3);
        assert!(seq.toggle(&mut timers, 500).is_empty());
        assert!(!seq.is_playing());
        assert_eq!(seq.current_beat(), 3);
        assert!(seq.state().clock.is_none());
        assert!(timers.is_empty());
        assert!(seq.on_clock_tick().is_empty());
    }

    #[test]
    fn test_beat_wraps() {
        let mut timers = TimerQueue::new();
        let mut seq = SequencerEngine::default();
        seq.toggle(&mut timers, 0);
        for _ in 0..7 {
            seq.on_clock_tick();
        }
        assert_eq!(seq.current_beat(), 0);
        assert_eq!(seq.last_fired_beat(), Some(7));
    }
}
