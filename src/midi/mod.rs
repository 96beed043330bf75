/// MIDI output using midir, sounding instruments as General MIDI drums
use midir::{MidiOutput, MidiOutputConnection};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{DrumError, Result};
use crate::instrument::Instrument;
use crate::sound::{PlayableSound, SoundBank};

const CLIENT_NAME: &str = "DRUMPAD MIDI Output";
/// Channel 10, the General MIDI percussion channel
const NOTE_ON: u8 = 0x99;
const NOTE_OFF: u8 = 0x89;

/// General MIDI percussion key for an instrument
pub fn gm_drum_note(instrument: Instrument) -> u8 {
    match instrument {
        Instrument::Kick => 36,
        Instrument::Ride => 51,
        Instrument::Snare => 38,
        Instrument::Tom => 45,
        Instrument::Hihat => 42,
        Instrument::Clap => 39,
        Instrument::Openhat => 46,
        Instrument::Tink => 37,
        Instrument::Boom => 35,
    }
}

pub fn velocity_for_volume(volume: f32) -> u8 {
    (volume.clamp(0.0, 1.0) * 127.0).round() as u8
}

pub struct MidiDrumOutput {
    connection: Rc<RefCell<MidiOutputConnection>>,
}

impl MidiDrumOutput {
    pub fn available_ports() -> Vec<String> {
        if let Ok(midi_out) = MidiOutput::new(CLIENT_NAME) {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        } else {
            vec![]
        }
    }

    pub fn connect(port_index: usize) -> Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| DrumError::Midi(format!("Failed to create MIDI output: {}", e)))?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| DrumError::Midi(format!("Invalid port index {}", port_index)))?;

        let connection = midi_out
            .connect(port, "drumpad")
            .map_err(|e| DrumError::Midi(format!("Failed to connect: {}", e)))?;

        Ok(Self {
            connection: Rc::new(RefCell::new(connection)),
        })
    }

    /// Give every instrument a handle on this connection
    pub fn fill_bank(&self, bank: &mut SoundBank) {
        for instrument in Instrument::ALL {
            let sink = ConnectionSink(Rc::clone(&self.connection));
            bank.insert(instrument, Box::new(MidiDrumHandle::new(instrument, sink)));
        }
    }
}

/// Destination for raw MIDI messages
pub trait MidiSink {
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

struct ConnectionSink(Rc<RefCell<MidiOutputConnection>>);

impl MidiSink for ConnectionSink {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        self.0
            .borrow_mut()
            .send(message)
            .map_err(|e| DrumError::Midi(format!("Failed to send: {}", e)))
    }
}

pub struct MidiDrumHandle<S: MidiSink> {
    sink: S,
    note: u8,
    velocity: u8,
}

impl<S: MidiSink> MidiDrumHandle<S> {
    pub fn new(instrument: Instrument, sink: S) -> Self {
        Self {
            sink,
            note: gm_drum_note(instrument),
            velocity: 127,
        }
    }
}

impl<S: MidiSink> PlayableSound for MidiDrumHandle<S> {
    fn restart(&mut self) {
        let result = self
            .sink
            .send(&[NOTE_OFF, self.note, 0])
            .and_then(|_| self.sink.send(&[NOTE_ON, self.note, self.velocity]));
        if let Err(e) = result {
            log::error!("{}", e);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.velocity = velocity_for_volume(volume);
    }
}
