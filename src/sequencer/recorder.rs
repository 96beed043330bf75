/// Live performance capture and timed replay
use crate::clock::{TimerHandle, TimerQueue, TimerTask};
use crate::instrument::Instrument;
use crate::trigger::TriggerEvent;

pub const DEFAULT_PLAYBACK_TAIL_MS: u64 = 500;

/// Append-only while armed, so events are already in offset order
pub type Recording = Vec<TriggerEvent>;

#[derive(Debug, Clone, Default)]
pub struct RecorderState {
    pub is_armed: bool,
    pub start_ms: u64,
    pub is_playing_back: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderMode {
    Idle,
    Armed,
    PlayingBack,
}

pub struct Recorder {
    state: RecorderState,
    recording: Recording,
    tail_ms: u64,
    finish: Option<(TimerHandle, u64)>,
}

impl Recorder {
    pub fn new(tail_ms: u64) -> Self {
        Self {
            state: RecorderState::default(),
            recording: Vec::new(),
            tail_ms,
            finish: None,
        }
    }

    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn mode(&self) -> RecorderMode {
        if self.state.is_playing_back {
            RecorderMode::PlayingBack
        } else if self.state.is_armed {
            RecorderMode::Armed
        } else {
            RecorderMode::Idle
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state.is_armed
    }

    pub fn is_playing_back(&self) -> bool {
        self.state.is_playing_back
    }

    pub fn recording(&self) -> &[TriggerEvent] {
        &self.recording
    }

    /// Arm and discard the previous take. Callers must not start a
    /// recording while playback is running.
    pub fn start_recording(&mut self, now: u64) {
        if self.state.is_playing_back {
            log::warn!("Recording started while playback is still running");
        }
        self.recording.clear();
        self.state.is_armed = true;
        self.state.start_ms = now;
        log::info!("Recording started");
    }

    pub fn stop_recording(&mut self) {
        if self.state.is_armed {
            log::info!("Recording stopped with {} events", self.recording.len());
        }
        self.state.is_armed = false;
    }

    /// Append a hit if armed; a silent no-op otherwise
    pub fn record(&mut self, instrument: Instrument, now: u64) -> Option<TriggerEvent> {
        if !self.state.is_armed {
            return None;
        }
        let event = TriggerEvent {
            instrument,
            offset_ms: now.saturating_sub(self.state.start_ms),
        };
        self.recording.push(event);
        Some(event)
    }

    /// Schedule every recorded hit relative to `now` plus the completion
    /// timer. Returns false, doing nothing, when there is nothing recorded.
    pub fn playback(&mut self, timers: &mut TimerQueue, now: u64) -> bool {
        let Some(last) = self.recording.last() else {
            log::info!("Nothing recorded yet");
            return false;
        };

        log::info!("Playing back {} events", self.recording.len());
        let mut deadline = now + last.offset_ms + self.tail_ms;
        for event in &self.recording {
            timers.after(now, event.offset_ms, TimerTask::PlaybackHit(event.instrument));
        }

        if let Some((previous, previous_deadline)) = self.finish.take() {
            timers.cancel(previous);
            deadline = deadline.max(previous_deadline);
        }
        let handle = timers.after(now, deadline - now, TimerTask::PlaybackFinished);
        self.finish = Some((handle, deadline));
        self.state.is_playing_back = true;
        true
    }

    /// Completion timer callback
    pub fn on_playback_finished(&mut self) {
        self.finish = None;
        self.state.is_playing_back = false;
        log::info!("Playback finished");
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYBACK_TAIL_MS)
    }
}
