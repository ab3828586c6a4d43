//! # egui_timeline
//!
//! Timeline rendering and interaction engine for DAW-style arrangement views.
//!
//! ## Features
//!
//! - **Zoom-dependent grid**: seven zoom levels, each with its own grid
//!   division, alternating bar bands and visible subdivisions.
//! - **Snapping**: pointer positions snap to the current division.
//! - **Tiled rendering**: only the visible part of an arbitrarily long
//!   timeline is turned into draw commands; scrolling reuses cached tiles.
//! - **Shared scrolling**: the ruler and the track-header sidebar follow the
//!   content pane's single scroll offset.
//! - **Range selection** on one track at a time, arbitrated against clip
//!   dragging and the context menu.
//!
//! ## Basic usage
//!
//! ```no_run
//! use egui_timeline::{TimelineEditor, TimelineOptions, Track, TrackKind, TransportSnapshot};
//!
//! let mut editor = TimelineEditor::new(TimelineOptions::default());
//! let tracks = vec![Track::new("Drums", TrackKind::Audio)];
//! let transport = TransportSnapshot::default();
//!
//! # let ctx = egui::Context::default();
//! # let _ = ctx.run(Default::default(), |ctx| {
//! egui::CentralPanel::default().show(ctx, |ui| {
//!     editor.ui(ui, &tracks, &transport);
//! });
//! # });
//! ```
//!
//! ## Host integration
//!
//! The editor never mutates tracks or the transport. It reports what the user
//! did through [`TimelineEvent`]s:
//!
//! ```no_run
//! use egui_timeline::{TimelineCommand, TimelineEditor, TimelineEvent, TimelineOptions};
//!
//! let mut editor = TimelineEditor::new(TimelineOptions::default());
//! editor.set_event_listener(Box::new(|event: &TimelineEvent| {
//!     if let TimelineEvent::PlayheadMoved { beat } = event {
//!         println!("seek to {beat}");
//!     }
//! }));
//!
//! // Applied at the start of the next frame.
//! let sender = editor.command_sender();
//! sender.send(TimelineCommand::SetZoom { level: 1 }).ok();
//! ```

pub mod editor;
pub mod engine;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod options;
pub mod playhead;
pub mod render;
pub mod scroll;
pub mod selection;
pub mod snap;
pub mod structure;
pub mod ui;
pub mod utils;

pub use editor::{CommandQueue, TimelineCommand, TimelineEvent, Transport, TransportSnapshot};
pub use engine::TimelineEngine;
pub use error::TimelineError;
pub use grid::{GridDivision, GridResolution, LineKind};
pub use interaction::{Gesture, InteractionArbiter, InteractionKind};
pub use options::TimelineOptions;
pub use render::{DrawCommand, GridRenderer, TileCache, TileStats};
pub use scroll::ScrollCoordinator;
pub use selection::SelectionController;
pub use structure::{
    Clip, ClipId, ClipOccupancy, ScrollOffset, SelectionSnapshot, TimelineState, Track, TrackId, TrackKind,
};
pub use ui::TimelineEditor;
