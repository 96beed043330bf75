/// Audio output using cpal, playing pre-loaded WAV samples
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{DrumError, Result};
use crate::instrument::Instrument;
use crate::sound::{PlayableSound, SoundBank};

struct Voice {
    samples: Arc<Vec<f32>>,
    step: f64,
    position: f64,
    playing: bool,
    gain: f32,
}

impl Voice {
    fn next_sample(&mut self) -> f32 {
        if !self.playing {
            return 0.0;
        }
        match self.samples.get(self.position as usize) {
            Some(sample) => {
                self.position += self.step;
                sample * self.gain
            }
            None => {
                self.playing = false;
                0.0
            }
        }
    }
}

pub struct AudioOutput {
    _stream: Option<cpal::Stream>,
    voices: Arc<Mutex<Vec<Voice>>>,
    sample_rate: u32,
}

impl AudioOutput {
    pub fn new() -> Result<Self> {
        let voices = Arc::new(Mutex::new(Vec::new()));
        let (stream, sample_rate) = Self::setup_audio_stream(Arc::clone(&voices))?;

        Ok(Self {
            _stream: Some(stream),
            voices,
            sample_rate,
        })
    }

    /// Output with no device attached; handles still track playback state
    pub fn silent(sample_rate: u32) -> Self {
        Self {
            _stream: None,
            voices: Arc::new(Mutex::new(Vec::new())),
            sample_rate,
        }
    }

    fn setup_audio_stream(voices: Arc<Mutex<Vec<Voice>>>) -> Result<(cpal::Stream, u32)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| DrumError::Audio("no default output device".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| DrumError::Audio(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.config(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    render(&voices, data, channels);
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            ),
            other => {
                return Err(DrumError::Audio(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| DrumError::Audio(e.to_string()))?;

        stream
            .play()
            .map_err(|e| DrumError::Audio(e.to_string()))?;
        Ok((stream, sample_rate))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn load_sound<P: AsRef<Path>>(&self, path: P) -> Result<SampleHandle> {
        let (samples, file_rate) = read_wav_mono(path.as_ref())?;
        let voice = Voice {
            samples: Arc::new(samples),
            step: file_rate as f64 / self.sample_rate as f64,
            position: 0.0,
            playing: false,
            gain: 1.0,
        };

        let mut voices = self
            .voices
            .lock()
            .map_err(|_| DrumError::Audio("voice table poisoned".to_string()))?;
        voices.push(voice);
        Ok(SampleHandle {
            voices: Arc::clone(&self.voices),
            index: voices.len() - 1,
        })
    }

    /// Load `<dir>/<instrument>.wav` for every instrument. Instruments whose
    /// file cannot be loaded are left without a handle. Returns the number
    /// loaded.
    pub fn load_bank<P: AsRef<Path>>(&self, dir: P, bank: &mut SoundBank) -> usize {
        let mut loaded = 0;
        for instrument in Instrument::ALL {
            let path = dir.as_ref().join(format!("{}.wav", instrument.name()));
            match self.load_sound(&path) {
                Ok(handle) => {
                    bank.insert(instrument, Box::new(handle));
                    loaded += 1;
                }
                Err(e) => log::error!("{} ({})", DrumError::MissingResource(instrument), e),
            }
        }
        loaded
    }
}

/// Handle to one loaded sample
pub struct SampleHandle {
    voices: Arc<Mutex<Vec<Voice>>>,
    index: usize,
}

impl SampleHandle {
    pub fn is_playing(&self) -> bool {
        self.with_voice(|voice| voice.playing).unwrap_or(false)
    }

    fn with_voice<T>(&self, f: impl FnOnce(&mut Voice) -> T) -> Option<T> {
        let mut voices = self.voices.lock().ok()?;
        voices.get_mut(self.index).map(f)
    }
}

impl PlayableSound for SampleHandle {
    fn restart(&mut self) {
        self.with_voice(|voice| {
            voice.position = 0.0;
            voice.playing = true;
        });
    }

    fn set_volume(&mut self, volume: f32) {
        self.with_voice(|voice| voice.gain = volume);
    }
}

fn render(voices: &Mutex<Vec<Voice>>, data: &mut [f32], channels: usize) {
    let Ok(mut voices) = voices.lock() else {
        data.fill(0.0);
        return;
    };
    for frame in data.chunks_mut(channels.max(1)) {
        let mix: f32 = voices.iter_mut().map(Voice::next_sample).sum();
        frame.fill(mix.clamp(-1.0, 1.0));
    }
}

fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let wav_error = |e: hound::Error| DrumError::Audio(format!("{}: {}", path.display(), e));

    let mut reader = hound::WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(wav_error)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(wav_error)?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}
