/// The drum machine: owns every component and routes triggers between them
use std::collections::VecDeque;

use crate::clock::{Clock, TimerQueue, TimerTask};
use crate::config::MachineConfig;
use crate::feedback::VisualFeedback;
use crate::instrument::Instrument;
use crate::sequencer::recorder::{Recorder, RecorderMode};
use crate::sequencer::SequencerEngine;
use crate::sound::SoundBank;
use crate::trigger::{InputEvent, TriggerDispatcher, TriggerEvent, TriggerSource};

/// Events beyond this many without a `poll_events` push out the oldest
pub const MAX_PENDING_EVENTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent {
    /// An instrument sounded; `event.offset_ms` is relative to the recording
    /// start when captured, zero otherwise.
    Triggered {
        event: TriggerEvent,
        source: TriggerSource,
        recorded: bool,
    },
    BeatFired(usize),
    PlaybackStarted,
    PlaybackFinished,
}

/// Which transport buttons the front end should enable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportControls {
    pub sequencer_playing: bool,
    pub record_enabled: bool,
    pub stop_recording_enabled: bool,
    pub play_recording_enabled: bool,
    pub playing_back: bool,
}

pub struct DrumMachine<C: Clock> {
    clock: C,
    timers: TimerQueue,
    sounds: SoundBank,
    feedback: VisualFeedback,
    dispatcher: TriggerDispatcher,
    sequencer: SequencerEngine,
    recorder: Recorder,
    events: VecDeque<MachineEvent>,
}

impl<C: Clock> DrumMachine<C> {
    pub fn new(config: &MachineConfig, mut sounds: SoundBank, clock: C) -> Self {
        sounds.set_volume(config.initial_volume);
        let missing = sounds.missing();
        if !missing.is_empty() {
            log::warn!("No sound loaded for: {:?}", missing);
        }
        log::info!("Drum machine initialized");

        Self {
            clock,
            timers: TimerQueue::new(),
            sounds,
            feedback: VisualFeedback::new(config.flash_ms),
            dispatcher: TriggerDispatcher::new(),
            sequencer: SequencerEngine::new(config.beats_per_sequence, config.tick_interval_ms),
            recorder: Recorder::new(config.playback_tail_ms),
            events: VecDeque::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sounds(&self) -> &SoundBank {
        &self.sounds
    }

    pub fn feedback(&self) -> &VisualFeedback {
        &self.feedback
    }

    pub fn sequencer(&self) -> &SequencerEngine {
        &self.sequencer
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn input(&mut self, input: InputEvent) -> bool {
        match self.dispatcher.resolve(input) {
            Some(dispatch) => {
                let now = self.clock.now_ms();
                self.publish(dispatch.instrument, dispatch.source, now);
                dispatch.suppress_default
            }
            None => false,
        }
    }

    pub fn pad_activated(&mut self, instrument: Instrument) {
        self.input(InputEvent::Pad(instrument));
    }

    /// Returns true when the key was handled and its default action should
    /// be suppressed.
    pub fn key_down(&mut self, key: char, in_text_entry: bool) -> bool {
        self.input(InputEvent::Key { key, in_text_entry })
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sounds.set_volume(volume);
    }

    pub fn toggle_cell(&mut self, instrument: Instrument, beat: usize) -> Option<bool> {
        self.sequencer.toggle_cell(instrument, beat)
    }

    pub fn toggle_sequencer(&mut self) {
        let now = self.clock.now_ms();
        let was_playing = self.sequencer.is_playing();
        let hits = self.sequencer.toggle(&mut self.timers, now);
        if !was_playing {
            self.fire_hits(hits, now);
        }
    }

    pub fn start_recording(&mut self) {
        let now = self.clock.now_ms();
        self.recorder.start_recording(now);
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop_recording();
    }

    pub fn play_recording(&mut self) -> bool {
        let now = self.clock.now_ms();
        let started = self.recorder.playback(&mut self.timers, now);
        if started {
            self.push_event(MachineEvent::PlaybackStarted);
        }
        started
    }

    /// Run every timer that has come due, each at its nominal due time
    pub fn pump(&mut self) {
        let now = self.clock.now_ms();
        while let Some((due, task)) = self.timers.pop_due(now) {
            match task {
                TimerTask::SequencerTick => {
                    let hits = self.sequencer.on_clock_tick();
                    self.fire_hits(hits, due);
                }
                TimerTask::PlaybackHit(instrument) => {
                    self.publish(instrument, TriggerSource::Playback, due);
                }
                TimerTask::PlaybackFinished => {
                    self.recorder.on_playback_finished();
                    self.push_event(MachineEvent::PlaybackFinished);
                }
                TimerTask::ClearFlash(instrument) => self.feedback.clear(instrument),
            }
        }
    }

    /// Drain the event queue. Only the newest `MAX_PENDING_EVENTS` are
    /// kept between polls; older ones are dropped.
    pub fn poll_events(&mut self) -> Vec<MachineEvent> {
        self.events.drain(..).collect()
    }

    pub fn controls(&self) -> TransportControls {
        let mode = self.recorder.mode();
        let armed = self.recorder.is_armed();
        let playing_back = mode == RecorderMode::PlayingBack;
        TransportControls {
            sequencer_playing: self.sequencer.is_playing(),
            record_enabled: !armed && !playing_back,
            stop_recording_enabled: armed,
            play_recording_enabled: !armed
                && !playing_back
                && !self.recorder.recording().is_empty(),
            playing_back,
        }
    }

    fn fire_hits(&mut self, hits: Vec<Instrument>, at: u64) {
        // `current_beat` has already advanced past the beat just fired
        if let Some(beat) = self.sequencer.last_fired_beat() {
            self.push_event(MachineEvent::BeatFired(beat));
        }
        for instrument in hits {
            self.publish(instrument, TriggerSource::Sequencer, at);
        }
    }

    fn publish(&mut self, instrument: Instrument, source: TriggerSource, at: u64) {
        let played = self.sounds.play(instrument);
        // a late timer still gets its full flash window
        let flash_at = at.max(self.clock.now_ms());
        self.feedback.flash(instrument, &mut self.timers, flash_at);

        let captured = if played && source.is_live() {
            self.recorder.record(instrument, at)
        } else {
            None
        };
        self.push_event(MachineEvent::Triggered {
            event: captured.unwrap_or(TriggerEvent {
                instrument,
                offset_ms: 0,
            }),
            source,
            recorded: captured.is_some(),
        });
    }

    fn push_event(&mut self, event: MachineEvent) {
        if self.events.len() == MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
