/// Resolving raw input into instrument triggers
use crate::instrument::Instrument;

/// An instrument activation at an offset from the start of a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub instrument: Instrument,
    pub offset_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Pad,
    Key,
    Sequencer,
    Playback,
}

impl TriggerSource {
    /// Live sources are captured by an armed recorder; replayed hits are not.
    pub fn is_live(self) -> bool {
        !matches!(self, TriggerSource::Playback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pad(Instrument),
    Key { key: char, in_text_entry: bool },
}

/// A resolved input: what to trigger, and whether the host should swallow
/// the input's default behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub instrument: Instrument,
    pub source: TriggerSource,
    pub suppress_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TriggerDispatcher;

impl TriggerDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, input: InputEvent) -> Option<Dispatch> {
        match input {
            InputEvent::Pad(instrument) => Some(Dispatch {
                instrument,
                source: TriggerSource::Pad,
                suppress_default: false,
            }),
            InputEvent::Key { in_text_entry: true, .. } => None,
            InputEvent::Key { key, .. } => {
                let instrument = Instrument::from_key(key)?;
                Some(Dispatch {
                    instrument,
                    source: TriggerSource::Key,
                    suppress_default: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_resolves_directly() {
        let dispatch = TriggerDispatcher::new()
            .resolve(InputEvent::Pad(Instrument::Ride))
            .unwrap();
        assert_eq!(dispatch.instrument, Instrument::Ride);
        assert!(!dispatch.suppress_default);
    }

    #[test]
    fn test_mapped_key_suppresses_default() {
        let dispatcher = TriggerDispatcher::new();
        for key in ['q', 'Q'] {
            let dispatch = dispatcher
                .resolve(InputEvent::Key { key, in_text_entry: false })
                .unwrap();
            assert_eq!(dispatch.instrument, Instrument::Kick);
            assert_eq!(dispatch.source, TriggerSource::Key);
            assert!(dispatch.suppress_default);
        }
    }

    #[test]
    fn test_unmapped_and_text_entry_ignored() {
        let dispatcher = TriggerDispatcher::new();
        assert_eq!(
            dispatcher.resolve(InputEvent::Key { key: 'z', in_text_entry: false }),
            None
        );
        assert_eq!(
            dispatcher.resolve(InputEvent::Key { key: 'q', in_text_entry: true }),
            None
        );
    }

    #[test]
    fn test_playback_is_not_live() {
        assert!(TriggerSource::Sequencer.is_live());
        assert!(!TriggerSource::Playback.is_live());
    }
}
