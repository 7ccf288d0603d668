// Main UI App - Transport, tempo and rudiment controls over the note grid

use crate::audio::engine::DroppedClicks;
use crate::audio::timing::AudioClock;
use crate::config::MetronomeConfig;
use crate::messaging::channels::ClickProducer;
use crate::messaging::command::Command;
use crate::practice::{LookaheadTimer, PracticeSession, SharedSession};
use crate::sequencer::rudiment::PatternLibrary;
use crate::sequencer::scheduler::TempoChangePolicy;
use crate::sequencer::sync::FrameState;
use crate::sequencer::timeline::{SubdivisionKind, TIME_SIGNATURES, Tempo, TimeSignature};
use crate::ui::note_grid::NoteGrid;
use eframe::egui;
use std::sync::Arc;

type Session = PracticeSession<AudioClock, ClickProducer>;

pub struct MetronomeApp {
    session: SharedSession<AudioClock, ClickProducer>,
    timer: LookaheadTimer,
    dropped: DroppedClicks,
    config: MetronomeConfig,
    note_grid: NoteGrid,
    // Widget state mirrored from the session
    bpm_ui: f64,
    volume_ui: f32,
    status: Option<String>,
}

impl MetronomeApp {
    /// `timer` must already be polling `session`
    pub fn new(
        session: SharedSession<AudioClock, ClickProducer>,
        timer: LookaheadTimer,
        dropped: DroppedClicks,
        config: MetronomeConfig,
    ) -> Self {
        let (bpm_ui, volume_ui) = session
            .lock()
            .map(|session| (session.scheduler().target_bpm(), session.scheduler().volume()))
            .unwrap_or((config.bpm, config.volume));
        Self {
            session,
            timer,
            dropped,
            config,
            note_grid: NoteGrid::default(),
            bpm_ui,
            volume_ui,
            status: None,
        }
    }

    fn send(&mut self, session: &mut Session, command: Command) {
        if let Err(e) = session.apply(command) {
            log::error!("{}", e);
            self.status = Some(e.to_string());
        }
        // Stopping may land a pending tempo
        self.bpm_ui = session.scheduler().target_bpm();
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui, session: &mut Session) {
        ui.horizontal(|ui| {
            let playing = session.is_playing();
            let label = if playing { "⏹ Stop" } else { "▶ Start" };
            let button = egui::Button::new(label).min_size(egui::vec2(90.0, 28.0));
            if ui.add(button).clicked() || ui.input(|i| i.key_pressed(egui::Key::Space)) {
                self.send(session, Command::TogglePlayback);
            }

            ui.add_space(10.0);
            ui.label("Tempo:");
            let slider = egui::Slider::new(&mut self.bpm_ui, Tempo::MIN_BPM..=Tempo::MAX_BPM)
                .suffix(" BPM")
                .fixed_decimals(0);
            if ui.add(slider).changed() {
                self.send(session, Command::SetBpm(self.bpm_ui));
            }

            ui.add_space(10.0);
            ui.label("Volume:");
            if ui.add(egui::Slider::new(&mut self.volume_ui, 0.0..=1.0)).changed() {
                self.send(session, Command::SetVolume(self.volume_ui));
            }
        });
    }

    fn draw_settings(&mut self, ui: &mut egui::Ui, session: &mut Session) {
        ui.horizontal(|ui| {
            ui.label("Time signature:");
            let mut time_signature = session.visual_time_signature();
            egui::ComboBox::from_id_salt("time_signature_selector")
                .selected_text(time_signature.name)
                .show_ui(ui, |ui| {
                    for candidate in TIME_SIGNATURES {
                        ui.selectable_value(&mut time_signature, candidate, candidate.name);
                    }
                });
            if time_signature != session.visual_time_signature() {
                self.send(session, Command::SetTimeSignature(time_signature));
            }

            ui.add_space(10.0);
            ui.label("Click:");
            let current = session.scheduler().target_audio_subdivision();
            if let Some(choice) =
                subdivision_combo(ui, "audio_subdivision_selector", current, &time_signature)
            {
                self.send(session, Command::SetAudioSubdivision(choice));
            }

            ui.add_space(10.0);
            ui.label("Grid:");
            let current = session.visual_subdivision();
            if let Some(choice) =
                subdivision_combo(ui, "visual_subdivision_selector", current, &time_signature)
            {
                self.send(session, Command::SetVisualSubdivision(choice));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Rudiment:");
            let current = session.rudiment();
            let mut selected = current.id;
            egui::ComboBox::from_id_salt("rudiment_selector")
                .selected_text(current.name)
                .width(200.0)
                .show_ui(ui, |ui| {
                    for rudiment in PatternLibrary::all() {
                        ui.selectable_value(&mut selected, rudiment.id, rudiment.name);
                    }
                });
            if selected != current.id {
                self.send(session, Command::SelectRudiment(selected.to_string()));
            }

            ui.add_space(10.0);
            ui.label("Tempo change:");
            let mut policy = session.tempo_change_policy();
            ui.radio_value(&mut policy, TempoChangePolicy::NextBeat, "Next beat");
            ui.radio_value(&mut policy, TempoChangePolicy::NextMeasure, "Next measure");
            if policy != session.tempo_change_policy() {
                self.send(session, Command::SetTempoChangePolicy(policy));
            }
        });
    }

    fn draw_status_bar(&mut self, ui: &mut egui::Ui, session: &Session, frame: &FrameState) {
        ui.separator();
        ui.horizontal(|ui| {
            let scheduler = session.scheduler();
            ui.label(format!("{}", scheduler.config().tempo));
            if let Some(bpm) = scheduler.pending().bpm.filter(|_| scheduler.is_playing()) {
                ui.colored_label(egui::Color32::from_rgb(255, 165, 0), format!("→ {}", bpm));
            }
            if let Some(beat) = frame.beat_index {
                ui.label(format!("Beat {}", beat + 1));
            }
            let dropped = self.dropped.total();
            if dropped > 0 {
                ui.colored_label(
                    egui::Color32::from_rgb(255, 165, 0),
                    format!("{} dropped", dropped),
                );
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Save settings").clicked() {
                    self.save_settings(session);
                }
                match &self.status {
                    Some(message) => ui.colored_label(egui::Color32::RED, message),
                    None => ui.label("Ready"),
                };
            });
        });
    }

    fn save_settings(&mut self, session: &Session) {
        self.config = session.settings(&self.config);
        match self.config.save() {
            Ok(()) => self.status = None,
            Err(e) => {
                log::error!("Could not save settings: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }
}

/// Subdivision picker limited to grids valid for the meter; returns a changed choice
fn subdivision_combo(
    ui: &mut egui::Ui,
    id: &str,
    current: SubdivisionKind,
    time_signature: &TimeSignature,
) -> Option<SubdivisionKind> {
    let mut selected = current;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.label())
        .show_ui(ui, |ui| {
            for kind in SubdivisionKind::ALL {
                if kind.is_valid_for(time_signature) {
                    ui.selectable_value(&mut selected, kind, kind.label());
                }
            }
        });
    (selected != current).then_some(selected)
}

impl eframe::App for MetronomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Render tick only; the lookahead timer polls on its own thread
        ctx.request_repaint();
        self.dropped.report();

        let shared = Arc::clone(&self.session);
        let Ok(mut session) = shared.lock() else {
            self.status = Some("Practice session unavailable".to_string());
            return;
        };
        let frame = session.frame();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Rudiment Metronome");
            ui.separator();

            self.draw_transport(ui, &mut session);
            ui.add_space(6.0);
            self.draw_settings(ui, &mut session);

            ui.add_space(10.0);
            ui.label(session.rudiment().name);
            self.note_grid
                .show(ui, session.displayed_measure(), &frame);

            ui.add_space(10.0);
            self.draw_status_bar(ui, &session, &frame);
        });
    }
}

impl Drop for MetronomeApp {
    fn drop(&mut self) {
        self.timer.stop();
        let summary = self.session.lock().ok().and_then(|mut session| session.stop());
        if let Some(summary) = summary {
            log::info!(
                "Session ended: {:.1}s at {:.0} BPM",
                summary.duration_seconds,
                summary.bpm
            );
        }
    }
}
