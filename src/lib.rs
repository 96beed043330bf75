/// DRUMPAD - a pad-and-step drum machine library
///
/// This library provides the core of the drum machine:
/// - Sound bank mapping instruments to re-triggerable sounds
/// - Pad and keyboard trigger dispatch
/// - Fixed-clock step sequencer over an instrument x beat grid
/// - Performance recorder with timed playback
/// - Audio (cpal) and MIDI (midir) backends for the sounds

pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod help;
pub mod instrument;
pub mod machine;
pub mod midi;
pub mod sequencer;
pub mod sound;
pub mod trigger;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock, TimerQueue, TimerTask};
pub use config::{MachineConfig, OutputBackend};
pub use error::DrumError;
pub use feedback::VisualFeedback;
pub use instrument::Instrument;
pub use machine::{DrumMachine, MachineEvent, TransportControls};
pub use sequencer::recorder::{Recorder, RecorderMode};
pub use sequencer::{Grid, SequencerEngine};
pub use sound::{PlayableSound, SoundBank};
pub use trigger::{InputEvent, TriggerDispatcher, TriggerEvent, TriggerSource};
pub use audio::AudioOutput;
pub use midi::MidiDrumOutput;
