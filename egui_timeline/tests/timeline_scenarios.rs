use egui::{pos2, vec2, PointerButton, Rect, Vec2};
use egui_timeline::grid::{self, LineKind};
use egui_timeline::snap::snap;
use egui_timeline::{
    Clip, DrawCommand, GridDivision, TimelineCommand, TimelineEngine, TimelineError, TimelineEvent,
    TimelineOptions, Track, TrackKind, TransportSnapshot,
};

const VIEWPORT: Vec2 = Vec2::new(800.0, 300.0);

fn arrangement() -> Vec<Track> {
    let mut drums = Track::new("Drums", TrackKind::Audio);
    drums.clips.push(Clip::new(0.0, 8.0, "Intro"));
    drums.clips.push(Clip::new(16.0, 8.0, "Fill"));
    let keys = Track::new("Keys", TrackKind::Midi);
    vec![drums, keys]
}

fn frame(engine: &mut TimelineEngine, now: f64, tracks: &[Track]) {
    engine.begin_frame(now, VIEWPORT, &TransportSnapshot::default(), tracks);
}

fn visible(engine: &TimelineEngine) -> Rect {
    engine.scroll().visible_rect(engine.state())
}

fn has_fine_lines(commands: &[DrawCommand]) -> bool {
    commands.iter().any(|command| {
        matches!(
            command,
            DrawCommand::Line {
                kind: LineKind::Eighth | LineKind::Sixteenth,
                ..
            }
        )
    })
}

#[test]
fn test_quarter_snapping() {
    assert_eq!(snap(10.3, GridDivision::Quarter, 4), 10.0);
    assert_eq!(snap(10.6, GridDivision::Quarter, 4), 11.0);
}

#[test]
fn test_half_snapping() {
    assert_eq!(snap(1.5, GridDivision::Half, 4), 2.0);
}

#[test]
fn test_tiny_drag_is_not_a_selection() {
    let options = TimelineOptions {
        initial_zoom_level: 0,
        ..Default::default()
    };
    let mut engine = TimelineEngine::new(options);
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);

    engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 4.0, &tracks, 0.0);
    engine.pointer_dragged(4.0004);
    engine.pointer_released(Some(4.0004));

    assert!(!engine.state().selection_snapshot().active);
    assert!(engine
        .take_events()
        .contains(&TimelineEvent::PlayheadMoved { beat: 4.0 }));
}

#[test]
fn test_ruler_follows_horizontal_scroll_only() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    engine.execute_command(TimelineCommand::SetScrollOffset { x: 120.0, y: 0.0 });
    frame(&mut engine, 0.1, &tracks);

    let state = engine.state();
    assert_eq!(engine.scroll().ruler_translation(state), -120.0);
    assert_eq!(engine.scroll().sidebar_translation(state), 0.0);
}

#[test]
fn test_out_of_range_zoom_is_clamped() {
    let mut engine = TimelineEngine::default();
    engine.execute_command(TimelineCommand::SetZoom { level: 999 });
    assert_eq!(engine.state().zoom_level(), 6);
    assert_eq!(engine.state().resolution(), grid::resolve(6));
    assert_eq!(engine.state().grid_division(), GridDivision::FourBar);
}

#[test]
fn test_scrolling_within_a_tile_builds_nothing() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    engine.draw(visible(&engine), &tracks);
    assert!(engine.renderer().tiles().stats().built > 0);

    engine.report_pane_offset(50.0, 0.0);
    frame(&mut engine, 0.5, &tracks);
    engine.draw(visible(&engine), &tracks);
    assert_eq!(engine.renderer().tiles().stats().built, 0);
}

#[test]
fn test_scrolling_one_tile_builds_one_tile() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    // Start with the view inside tile 1 so the margin does not reach tile 0.
    frame(&mut engine, 0.0, &tracks);
    engine.execute_command(TimelineCommand::SetScrollOffset { x: 1124.0, y: 0.0 });
    frame(&mut engine, 0.5, &tracks);
    engine.draw(visible(&engine), &tracks);

    engine.report_pane_offset(1124.0 + 1024.0, 0.0);
    frame(&mut engine, 1.0, &tracks);
    engine.draw(visible(&engine), &tracks);
    assert_eq!(engine.renderer().tiles().stats().built, 1);
}

#[test]
fn test_zoom_change_rebuilds_tiles() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    engine.draw(visible(&engine), &tracks);
    engine.draw(visible(&engine), &tracks);
    assert_eq!(engine.renderer().tiles().stats().built, 0);

    engine.execute_command(TimelineCommand::ZoomIn { anchor_x: Some(0.0) });
    frame(&mut engine, 0.1, &tracks);
    engine.draw(visible(&engine), &tracks);
    assert!(engine.renderer().tiles().stats().built > 0);
}

#[test]
fn test_fast_scroll_suppresses_fine_lines_until_settled() {
    let options = TimelineOptions {
        initial_zoom_level: 0,
        ..Default::default()
    };
    let mut engine = TimelineEngine::new(options);
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    assert!(has_fine_lines(&engine.draw(visible(&engine), &tracks)));

    // 200 px in one 16 ms frame.
    engine.report_pane_offset(200.0, 0.0);
    frame(&mut engine, 0.016, &tracks);
    assert!(engine.state().is_scrolling());
    assert!(!has_fine_lines(&engine.draw(visible(&engine), &tracks)));

    frame(&mut engine, 0.05, &tracks);
    assert!(!has_fine_lines(&engine.draw(visible(&engine), &tracks)));

    frame(&mut engine, 0.5, &tracks);
    assert!(!engine.state().is_scrolling());
    assert!(has_fine_lines(&engine.draw(visible(&engine), &tracks)));
}

#[test]
fn test_draw_output_stays_near_the_viewport() {
    let options = TimelineOptions {
        initial_zoom_level: 0,
        initial_bars: 4000,
        ..Default::default()
    };
    let mut engine = TimelineEngine::new(options);
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    engine.execute_command(TimelineCommand::SetScrollOffset { x: 2_000_000.0, y: 0.0 });
    frame(&mut engine, 1.0, &tracks);

    let view = visible(&engine);
    assert_eq!(view.min.x, 2_000_000.0);
    let margin = engine.renderer().margin() as f32;
    for command in engine.draw(view, &tracks) {
        let range = (view.min.x - margin)..(view.max.x + margin);
        assert!(command.intersects_x(&range), "{:?} outside {:?}", command, range);
    }
}

#[test]
fn test_selection_is_drawn_on_its_track() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 2.0, &tracks, 0.0);
    engine.pointer_dragged(6.0);

    // The live drag is drawn before it is committed.
    let commands = engine.draw(visible(&engine), &tracks);
    let expected = Rect::from_min_max(pos2(80.0, 80.0), pos2(240.0, 160.0));
    assert!(commands.contains(&DrawCommand::Selection { rect: expected }));

    engine.pointer_released(Some(6.0));
    assert_eq!(engine.state().normalized_selection_range(), Some((2.0, 6.0)));

    engine.execute_command(TimelineCommand::ClearSelection);
    let commands = engine.draw(visible(&engine), &tracks);
    assert!(!commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Selection { .. })));
}

#[test]
fn test_press_on_clip_starts_clip_drag_not_selection() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    engine.pointer_pressed(PointerButton::Primary, Some(tracks[0].id), 3.0, &tracks, 0.0);
    assert_eq!(engine.dragged_clip(), Some(tracks[0].clips[0].id));
    assert!(!engine.state().selection().is_selecting());
    engine.pointer_released(Some(3.0));
    assert_eq!(engine.dragged_clip(), None);
}

#[test]
fn test_options_round_trip_through_a_file() {
    let path = std::env::temp_dir().join(format!("egui_timeline_options_{}.json", std::process::id()));
    let options = TimelineOptions {
        initial_zoom_level: 1,
        follow_playhead: false,
        ..Default::default()
    };
    std::fs::write(&path, options.to_json_string().unwrap()).unwrap();
    let loaded = TimelineOptions::load_from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, options);

    let engine = TimelineEngine::new(loaded);
    assert_eq!(engine.state().zoom_level(), 1);
    assert!(!engine.follow_playhead());
}

#[test]
fn test_missing_options_file_is_an_io_error() {
    let path = std::env::temp_dir().join("egui_timeline_options_does_not_exist.json");
    assert!(matches!(
        TimelineOptions::load_from_path(&path),
        Err(TimelineError::Io(_))
    ));
}

#[test]
fn test_ruler_lines_match_content_lines() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    frame(&mut engine, 0.0, &tracks);
    let view = visible(&engine);
    let ruler = engine.ruler_lines(Rect::from_min_size(view.min, vec2(view.width(), 32.0)));
    let content: Vec<(f32, LineKind)> = engine
        .draw(view, &tracks)
        .into_iter()
        .filter_map(|command| match command {
            DrawCommand::Line { x, kind } => Some((x, kind)),
            _ => None,
        })
        .collect();
    assert_eq!(ruler, content);
}

#[test]
fn test_selection_commands_snap_and_click_relocates() {
    let mut engine = TimelineEngine::default();
    let tracks = arrangement();
    let track_id = tracks[1].id;
    frame(&mut engine, 0.0, &tracks);

    // Zoom 3 snaps to half bars.
    let sender = engine.command_sender();
    sender.send(TimelineCommand::StartSelection { track_id, beat: 5.1 }).unwrap();
    sender.send(TimelineCommand::UpdateSelection { beat: 7.3 }).unwrap();
    sender.send(TimelineCommand::EndSelection).unwrap();
    frame(&mut engine, 0.1, &tracks);
    let snapshot = engine.state().selection_snapshot();
    assert!(snapshot.active);
    assert_eq!(snapshot.range, Some((6.0, 8.0)));
    assert_eq!(snapshot.track_id, Some(track_id));

    engine.take_events();
    sender.send(TimelineCommand::StartSelection { track_id, beat: 4.0 }).unwrap();
    sender.send(TimelineCommand::EndSelection).unwrap();
    frame(&mut engine, 0.2, &tracks);
    assert!(!engine.state().selection_snapshot().active);
    assert!(engine
        .take_events()
        .contains(&TimelineEvent::PlayheadMoved { beat: 4.0 }));
}
