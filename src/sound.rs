/// Instrument to playable-sound mapping with shared volume
use std::collections::HashMap;

use crate::error::DrumError;
use crate::instrument::Instrument;

/// A pre-loaded sound that can be (re)started from its beginning
pub trait PlayableSound {
    /// Rewind to position zero and start playing, cutting off any
    /// playback already in progress.
    fn restart(&mut self);

    fn set_volume(&mut self, volume: f32);
}

pub struct SoundBank {
    handles: HashMap<Instrument, Box<dyn PlayableSound>>,
    volume: f32,
}

impl SoundBank {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            volume: 1.0,
        }
    }

    /// Register the handle for an instrument, replacing any previous one.
    /// The current volume is not applied until `set_volume` is called again.
    pub fn insert(&mut self, instrument: Instrument, sound: Box<dyn PlayableSound>) {
        self.handles.insert(instrument, sound);
    }

    pub fn has(&self, instrument: Instrument) -> bool {
        self.handles.contains_key(&instrument)
    }

    pub fn missing(&self) -> Vec<Instrument> {
        Instrument::ALL
            .iter()
            .copied()
            .filter(|i| !self.has(*i))
            .collect()
    }

    /// Returns false, after logging, when the instrument has no handle
    pub fn play(&mut self, instrument: Instrument) -> bool {
        match self.handles.get_mut(&instrument) {
            Some(sound) => {
                sound.restart();
                true
            }
            None => {
                log::error!("{}", DrumError::MissingResource(instrument));
                false
            }
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        for sound in self.handles.values_mut() {
            sound.set_volume(self.volume);
        }
    }
}

impl Default for SoundBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Restart(Instrument),
        Volume(Instrument, f32),
    }

    pub struct FakeSound {
        instrument: Instrument,
        log: Rc<RefCell<Vec<Call>>>,
    }

    impl PlayableSound for FakeSound {
        fn restart(&mut self) {
            self.log.borrow_mut().push(Call::Restart(self.instrument));
        }

        fn set_volume(&mut self, volume: f32) {
            self.log
                .borrow_mut()
                .push(Call::Volume(self.instrument, volume));
        }
    }

    pub fn fake_bank() -> (SoundBank, Rc<RefCell<Vec<Call>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bank = SoundBank::new();
        for instrument in Instrument::ALL {
            bank.insert(
                instrument,
                Box::new(FakeSound {
                    instrument,
                    log: Rc::clone(&log),
                }),
            );
        }
        (bank, log)
    }

    #[test]
    fn test_play_restarts_every_time() {
        let (mut bank, log) = fake_bank();
        bank.play(Instrument::Snare);
        bank.play(Instrument::Snare);
        assert_eq!(
            *log.borrow(),
            vec![Call::Restart(Instrument::Snare), Call::Restart(Instrument::Snare)]
        );
    }

    #[test]
    fn test_missing_handle_is_noop() {
        let mut bank = SoundBank::new();
        assert!(!bank.play(Instrument::Kick));
        assert_eq!(bank.missing().len(), Instrument::COUNT);

        let (mut bank, _log) = fake_bank();
        assert!(bank.play(Instrument::Kick));
    }

    #[test]
    fn test_volume_applies_to_all_handles() {
        let (mut bank, log) = fake_bank();
        bank.set_volume(0.5);
        let volumes = log
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Volume(_, v) if *v == 0.5))
            .count();
        assert_eq!(volumes, Instrument::COUNT);
        assert_eq!(bank.volume(), 0.5);
    }

    #[test]
    fn test_volume_not_applied_to_later_handles() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bank = SoundBank::new();
        bank.set_volume(0.3);
        bank.insert(
            Instrument::Tom,
            Box::new(FakeSound {
                instrument: Instrument::Tom,
                log: Rc::clone(&log),
            }),
        );
        assert!(log.borrow().is_empty());
        bank.set_volume(0.3);
        assert_eq!(*log.borrow(), vec![Call::Volume(Instrument::Tom, 0.3)]);
    }
}
