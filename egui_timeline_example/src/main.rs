use eframe::egui::{self, DragValue, TopBottomPanel};
use egui_timeline::utils::format_time;
use egui_timeline::{
    Clip, TimelineEditor, TimelineError, TimelineEvent, TimelineOptions, Track, TrackKind, Transport,
};
use rfd::FileDialog;
use std::fs;
use std::path::Path;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "egui_timeline Example",
        native_options,
        Box::new(|_cc| Ok(Box::new(TimelineApp::new()))),
    )
}

/// Toy playback engine: advances the beat from wall-clock time.
struct DemoTransport {
    beat: f64,
    playing: bool,
    bpm: f64,
    beats_per_bar: u32,
    last_time: Option<f64>,
}

impl DemoTransport {
    fn advance(&mut self, now: f64) {
        if self.playing {
            if let Some(last) = self.last_time {
                let dt = now - last;
                // Skip large jumps, e.g. after the window regained focus.
                if dt > 0.0 && dt < 1.0 {
                    self.beat += dt * self.bpm / 60.0;
                }
            }
        }
        self.last_time = Some(now);
    }
}

impl Transport for DemoTransport {
    fn current_beat(&self) -> f64 {
        self.beat
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn time_signature_beats(&self) -> u32 {
        self.beats_per_bar
    }
}

struct TimelineApp {
    editor: TimelineEditor,
    tracks: Vec<Track>,
    transport: DemoTransport,
    status: String,
}

fn demo_tracks() -> Vec<Track> {
    let mut drums = Track::new("Drums", TrackKind::Audio);
    drums.clips.push(Clip::new(0.0, 16.0, "Groove A"));
    drums.clips.push(Clip::new(16.0, 16.0, "Groove B"));

    let mut bass = Track::new("Bass", TrackKind::Instrument);
    bass.clips.push(Clip::new(8.0, 24.0, "Bassline"));

    let mut keys = Track::new("Keys", TrackKind::Midi);
    keys.height = 100.0;
    keys.clips.push(Clip::new(4.0, 6.0, "Stab"));
    keys.clips.push(Clip::new(20.0, 12.0, "Pad"));

    let mut vocals = Track::new("Vocals", TrackKind::Audio);
    vocals.clips.push(Clip::new(32.0, 32.0, "Verse"));

    vec![drums, bass, keys, vocals, Track::new("Master", TrackKind::Master)]
}

fn load_options(path: &Path) -> Result<TimelineOptions, TimelineError> {
    TimelineOptions::load_from_path(path)
}

fn save_options(path: &Path, options: &TimelineOptions) -> Result<(), TimelineError> {
    fs::write(path, options.to_json_string()?)?;
    Ok(())
}

impl TimelineApp {
    fn new() -> Self {
        Self {
            editor: TimelineEditor::new(TimelineOptions::default()),
            tracks: demo_tracks(),
            transport: DemoTransport {
                beat: 0.0,
                playing: false,
                bpm: 120.0,
                beats_per_bar: 4,
                last_time: None,
            },
            status: "Ready".to_string(),
        }
    }

    fn open_options(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("Timeline options", &["json"])
            .pick_file()
        {
            match load_options(&path) {
                Ok(options) => {
                    self.editor = TimelineEditor::new(options);
                    self.status = format!("Loaded {}", path.display());
                }
                Err(err) => {
                    log::error!("Failed to load {}: {}", path.display(), err);
                    self.status = format!("Error: {}", err);
                }
            }
        }
    }

    fn save_options(&mut self) {
        if let Some(path) = FileDialog::new()
            .add_filter("Timeline options", &["json"])
            .set_file_name("timeline_options.json")
            .save_file()
        {
            match save_options(&path, self.editor.engine().options()) {
                Ok(()) => self.status = format!("Saved {}", path.display()),
                Err(err) => {
                    log::error!("Failed to save {}: {}", path.display(), err);
                    self.status = format!("Error: {}", err);
                }
            }
        }
    }

    fn move_clip(&mut self, clip_id: egui_timeline::ClipId, new_start: f64) {
        if let Some(clip) = self
            .tracks
            .iter_mut()
            .flat_map(|track| track.clips.iter_mut())
            .find(|clip| clip.id == clip_id)
        {
            clip.start_beat = new_start;
        }
    }

    fn handle_event(&mut self, event: TimelineEvent) {
        log::info!("[TimelineEvent] {:?}", event);
        match event {
            TimelineEvent::PlayheadMoved { beat } => {
                self.transport.beat = beat;
            }
            TimelineEvent::ClipDragged { clip_id, new_start, .. }
            | TimelineEvent::ClipDragEnded { clip_id, new_start, .. } => {
                self.move_clip(clip_id, new_start);
            }
            TimelineEvent::SelectionChanged { selection } => {
                if let Some((start, end)) = selection.range {
                    self.status = format!("Selected {:.2} - {:.2}", start, end);
                }
            }
            _ => {}
        }
    }

    fn transport_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let label = if self.transport.playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(label).clicked() {
                self.transport.playing = !self.transport.playing;
            }
            if ui.button("⏹ Stop").clicked() {
                self.transport.playing = false;
                self.transport.beat = 0.0;
            }
            ui.separator();
            ui.label(format_time(self.transport.beat, self.transport.bpm));
            ui.separator();
            ui.label("BPM:");
            ui.add(DragValue::new(&mut self.transport.bpm).speed(1.0).range(20.0..=400.0));
            ui.label("Beats/bar:");
            ui.add(DragValue::new(&mut self.transport.beats_per_bar).range(1..=12));
        });
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.transport.advance(now);

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open options…").clicked() {
                        ui.close_menu();
                        self.open_options();
                    }
                    if ui.button("Save options…").clicked() {
                        ui.close_menu();
                        self.save_options();
                    }
                });
            });
            self.transport_ui(ui);
        });

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor.ui(ui, &self.tracks, &self.transport);
        });

        for event in self.editor.take_events() {
            self.handle_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_advances_only_while_playing() {
        let mut transport = DemoTransport {
            beat: 0.0,
            playing: false,
            bpm: 120.0,
            beats_per_bar: 4,
            last_time: None,
        };
        transport.advance(0.0);
        transport.advance(0.5);
        assert_eq!(transport.current_beat(), 0.0);
        transport.playing = true;
        transport.advance(1.0);
        assert_eq!(transport.current_beat(), 1.0);
        // Window was hidden for a while.
        transport.advance(10.0);
        assert_eq!(transport.current_beat(), 1.0);
    }

    #[test]
    fn drag_events_move_clips() {
        let mut app = TimelineApp::new();
        let clip_id = app.tracks[1].clips[0].id;
        let track_id = app.tracks[1].id;
        app.handle_event(TimelineEvent::ClipDragged { clip_id, track_id, new_start: 12.0 });
        assert_eq!(app.tracks[1].clips[0].start_beat, 12.0);
        app.handle_event(TimelineEvent::PlayheadMoved { beat: 6.0 });
        assert_eq!(app.transport.current_beat(), 6.0);
    }
}
