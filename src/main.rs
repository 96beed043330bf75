#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use drumpad::{
    help, AudioOutput, DrumMachine, Instrument, MachineConfig, MachineEvent, MidiDrumOutput,
    OutputBackend, SoundBank, SystemClock,
};

#[cfg(feature = "gui")]
const CONFIG_PATH: &str = "drumpad.ron";

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = MachineConfig::load_or_default(CONFIG_PATH);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 720.0])
            .with_title("DRUMPAD - Drum Machine"),
        ..Default::default()
    };

    eframe::run_native(
        "DRUMPAD",
        options,
        Box::new(|_cc| Ok(Box::new(DrumApp::new(config)))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

/// Single-character key presses with the modifiers they arrived with, so a
/// handled Shift+Q is consumed as Shift+Q
#[cfg(feature = "gui")]
fn letter_presses(events: &[egui::Event]) -> Vec<(egui::Key, egui::Modifiers, char)> {
    events
        .iter()
        .filter_map(|e| match e {
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                let mut chars = key.name().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((*key, *modifiers, c)),
                    _ => None,
                }
            }
            _ => None,
        })
        .collect()
}

/// Keeps the sound backend alive for the lifetime of the app
#[cfg(feature = "gui")]
enum Backend {
    Audio { _output: AudioOutput },
    Midi { _output: MidiDrumOutput },
    None,
}

#[cfg(feature = "gui")]
enum HelpView {
    Closed,
    Open(String),
    Failed(String),
}

#[cfg(feature = "gui")]
struct DrumApp {
    machine: DrumMachine<SystemClock>,
    _backend: Backend,
    help_path: std::path::PathBuf,

    // UI state
    volume: f32,
    help: HelpView,
}

#[cfg(feature = "gui")]
impl DrumApp {
    fn new(config: MachineConfig) -> Self {
        let mut bank = SoundBank::new();
        let backend = match &config.backend {
            OutputBackend::Audio => match AudioOutput::new() {
                Ok(output) => {
                    output.load_bank(&config.sounds_dir, &mut bank);
                    Backend::Audio { _output: output }
                }
                Err(e) => {
                    log::error!("{}", e);
                    Backend::None
                }
            },
            OutputBackend::Midi { port } => match MidiDrumOutput::connect(*port) {
                Ok(output) => {
                    output.fill_bank(&mut bank);
                    Backend::Midi { _output: output }
                }
                Err(e) => {
                    log::error!("{} (available: {:?})", e, MidiDrumOutput::available_ports());
                    Backend::None
                }
            },
        };

        Self {
            machine: DrumMachine::new(&config, bank, SystemClock::new()),
            _backend: backend,
            help_path: config.help_path.clone(),
            volume: config.initial_volume,
            help: HelpView::Closed,
        }
    }

    fn handle_machine_events(&mut self) {
        for event in self.machine.poll_events() {
            match event {
                MachineEvent::Triggered {
                    event,
                    source,
                    recorded: true,
                } => {
                    log::debug!("Recorded {:?} {} at {}ms", source, event.instrument, event.offset_ms);
                }
                MachineEvent::PlaybackFinished => log::debug!("Playback complete"),
                _ => {}
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let in_text_entry = ctx.wants_keyboard_input();
        let pressed = ctx.input(|i| letter_presses(&i.events));

        for (key, modifiers, c) in pressed {
            if self.machine.key_down(c, in_text_entry) {
                ctx.input_mut(|i| i.consume_key(modifiers, key));
            }
        }
    }

    fn show_help(&mut self) {
        self.help = match help::load_help_text(&self.help_path) {
            Ok(text) => HelpView::Open(text),
            Err(e) => {
                log::error!("Error fetching instructions: {}", e);
                HelpView::Failed(e.to_string())
            }
        };
    }
}

#[cfg(feature = "gui")]
impl eframe::App for DrumApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        self.machine.pump();
        self.handle_keyboard(ctx);
        self.handle_machine_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("DRUMPAD - Drum Machine");
            ui.add_space(10.0);

            // Drum pads
            ui.horizontal(|ui| {
                for instrument in Instrument::ALL {
                    let lit = self.machine.feedback().is_lit(instrument);
                    let button = egui::Button::new(format!(
                        "{}\n{}",
                        instrument.key().to_ascii_uppercase(),
                        instrument.name()
                    ))
                    .min_size(egui::vec2(80.0, 80.0))
                    .fill(if lit {
                        egui::Color32::from_rgb(0, 255, 255)
                    } else {
                        egui::Color32::from_rgb(40, 40, 40)
                    });

                    if ui.add(button).clicked() {
                        self.machine.pad_activated(instrument);
                    }
                }
            });

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("Volume:");
                if ui
                    .add(egui::Slider::new(&mut self.volume, 0.0..=1.0).step_by(0.01))
                    .changed()
                {
                    self.machine.set_volume(self.volume);
                }
            });

            ui.add_space(20.0);

            // Transport controls
            let controls = self.machine.controls();
            ui.horizontal(|ui| {
                let label = if controls.sequencer_playing {
                    "Stop Sequence"
                } else {
                    "Play Sequence"
                };
                if ui.button(label).clicked() {
                    self.machine.toggle_sequencer();
                }

                ui.add_space(20.0);

                // stop is only enabled while armed
                let record = egui::Button::new("⏺ Record").fill(if controls.stop_recording_enabled {
                    egui::Color32::from_rgb(160, 30, 30)
                } else {
                    egui::Color32::from_rgb(40, 40, 40)
                });
                if ui.add_enabled(controls.record_enabled, record).clicked() {
                    self.machine.start_recording();
                }
                if ui
                    .add_enabled(controls.stop_recording_enabled, egui::Button::new("⏹ Stop"))
                    .clicked()
                {
                    self.machine.stop_recording();
                }
                let play_label = if controls.playing_back {
                    "Playing..."
                } else {
                    "Play Recording"
                };
                if ui
                    .add_enabled(controls.play_recording_enabled, egui::Button::new(play_label))
                    .clicked()
                {
                    self.machine.play_recording();
                }

                ui.add_space(20.0);

                if ui.button("Instructions").clicked() {
                    self.show_help();
                }
            });

            ui.add_space(20.0);

            // Step grid
            let beats = self.machine.sequencer().grid().beats();
            let current = self.machine.sequencer().last_fired_beat();
            let mut toggled = None;
            egui::Grid::new("sequencer").spacing([4.0, 4.0]).show(ui, |ui| {
                for instrument in Instrument::ALL {
                    ui.label(instrument.name());
                    for beat in 0..beats {
                        let active = self.machine.sequencer().grid().get(instrument, beat);
                        let button = egui::Button::new("")
                            .min_size(egui::vec2(40.0, 30.0))
                            .fill(if active {
                                egui::Color32::from_rgb(0, 200, 200)
                            } else if current == Some(beat) {
                                egui::Color32::from_rgb(80, 80, 80)
                            } else {
                                egui::Color32::from_rgb(40, 40, 40)
                            });
                        if ui.add(button).clicked() {
                            toggled = Some((instrument, beat));
                        }
                    }
                    ui.end_row();
                }
            });
            if let Some((instrument, beat)) = toggled {
                self.machine.toggle_cell(instrument, beat);
            }

            ui.separator();
            ui.label("Click pads or press Q W E R T Y U I O. Click grid cells to build a beat.");
            if let HelpView::Failed(reason) = &self.help {
                ui.colored_label(
                    egui::Color32::YELLOW,
                    format!("⚠ Could not load instructions: {}", reason),
                );
            }
        });

        if let HelpView::Open(text) = &self.help {
            let mut open = true;
            egui::Window::new("App Instructions")
                .open(&mut open)
                .vscroll(true)
                .show(ctx, |ui| {
                    ui.label(text.as_str());
                });
            if !open {
                self.help = HelpView::Closed;
            }
        }
    }
}

#[cfg(all(test, feature = "gui"))]
mod tests {
    use super::*;

    fn key_event(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn test_letter_presses_keep_modifiers() {
        let events = [
            key_event(egui::Key::Q, egui::Modifiers::SHIFT),
            key_event(egui::Key::Escape, egui::Modifiers::NONE),
            key_event(egui::Key::Z, egui::Modifiers::NONE),
        ];
        assert_eq!(
            letter_presses(&events),
            vec![
                (egui::Key::Q, egui::Modifiers::SHIFT, 'Q'),
                (egui::Key::Z, egui::Modifiers::NONE, 'Z'),
            ]
        );
    }

    #[test]
    fn test_shift_q_consumed_with_its_modifiers() {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            events: vec![key_event(egui::Key::Q, egui::Modifiers::SHIFT)],
            ..Default::default()
        };
        ctx.begin_frame(input);
        let pressed = ctx.input(|i| letter_presses(&i.events));
        assert_eq!(Instrument::from_key(pressed[0].2), Some(Instrument::Kick));
        let (key, modifiers, _) = pressed[0];
        assert!(ctx.input_mut(|i| i.consume_key(modifiers, key)));
        assert!(ctx.input(|i| letter_presses(&i.events)).is_empty());
        let _ = ctx.end_frame();
    }
}
