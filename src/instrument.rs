/// The fixed set of percussion voices
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Kick,
    Ride,
    Snare,
    Tom,
    Hihat,
    Clap,
    Openhat,
    Tink,
    Boom,
}

impl Instrument {
    pub const COUNT: usize = 9;

    /// Declaration order. Simultaneous hits always fire in this order.
    pub const ALL: [Instrument; Instrument::COUNT] = [
        Instrument::Kick,
        Instrument::Ride,
        Instrument::Snare,
        Instrument::Tom,
        Instrument::Hihat,
        Instrument::Clap,
        Instrument::Openhat,
        Instrument::Tink,
        Instrument::Boom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Kick => "kick",
            Instrument::Ride => "ride",
            Instrument::Snare => "snare",
            Instrument::Tom => "tom",
            Instrument::Hihat => "hihat",
            Instrument::Clap => "clap",
            Instrument::Openhat => "openhat",
            Instrument::Tink => "tink",
            Instrument::Boom => "boom",
        }
    }

    /// Keyboard key bound to this instrument (lowercase)
    pub fn key(self) -> char {
        match self {
            Instrument::Kick => 'q',
            Instrument::Ride => 'w',
            Instrument::Snare => 'e',
            Instrument::Tom => 'r',
            Instrument::Hihat => 't',
            Instrument::Clap => 'y',
            Instrument::Openhat => 'u',
            Instrument::Tink => 'i',
            Instrument::Boom => 'o',
        }
    }

    /// Case-insensitive lookup in the keyboard table
    pub fn from_key(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|i| i.key() == key)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
