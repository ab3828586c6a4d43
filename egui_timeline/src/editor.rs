//! Commands, events and the transport seam
//!
//! Hosts and the widget's own controls drive the engine with
//! [`TimelineCommand`]s and observe it through [`TimelineEvent`]s. Commands
//! sent through a [`CommandQueue`] are applied at the start of the next frame.

use crate::grid::GridDivision;
use crate::structure::{ClipId, SelectionSnapshot, TrackId};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineCommand {
    SetZoom {
        level: i32,
    },
    /// Finer grid. `anchor_x` is viewport-relative; the centre when `None`.
    ZoomIn {
        anchor_x: Option<f64>,
    },
    ZoomOut {
        anchor_x: Option<f64>,
    },
    ExtendTimeline {
        bars: u32,
    },
    StartSelection {
        track_id: TrackId,
        beat: f64,
    },
    UpdateSelection {
        beat: f64,
    },
    EndSelection,
    ClearSelection,
    SetScrollOffset {
        x: f64,
        y: f64,
    },
    SetSnap {
        enabled: bool,
    },
    SetFollowPlayhead {
        enabled: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
    ZoomChanged {
        level: u8,
        division: GridDivision,
        pixels_per_beat: f64,
    },
    TimelineExtended {
        total_bars: u32,
    },
    SelectionChanged {
        selection: SelectionSnapshot,
    },
    /// The user clicked the timeline; the host's transport should seek.
    PlayheadMoved {
        beat: f64,
    },
    ClipDragStarted {
        clip_id: ClipId,
        track_id: TrackId,
    },
    /// The dragged clip should now start at `new_start` (already snapped).
    ClipDragged {
        clip_id: ClipId,
        track_id: TrackId,
        new_start: f64,
    },
    ClipDragEnded {
        clip_id: ClipId,
        track_id: TrackId,
        new_start: f64,
    },
    ContextMenuOpened {
        track_id: Option<TrackId>,
        beat: f64,
    },
}

/// Read-only view of the host's playback engine.
pub trait Transport {
    fn current_beat(&self) -> f64;
    fn is_playing(&self) -> bool;
    /// Beats per bar of the current time signature.
    fn time_signature_beats(&self) -> u32;
}

/// Plain transport values, for hosts that do not want to implement the trait.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportSnapshot {
    pub current_beat: f64,
    pub is_playing: bool,
    pub beats_per_bar: u32,
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            current_beat: 0.0,
            is_playing: false,
            beats_per_bar: 4,
        }
    }
}

impl Transport for TransportSnapshot {
    fn current_beat(&self) -> f64 {
        self.current_beat
    }

    fn is_playing(&self) -> bool {
        self.is_playing
    }

    fn time_signature_beats(&self) -> u32 {
        self.beats_per_bar
    }
}

/// Deferred commands. Cloned senders can be handed to toolbars, menus or
/// other threads.
#[derive(Clone, Debug)]
pub struct CommandQueue {
    sender: Sender<TimelineCommand>,
    receiver: Receiver<TimelineCommand>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> Sender<TimelineCommand> {
        self.sender.clone()
    }

    pub fn push(&self, command: TimelineCommand) {
        // The queue owns a receiver, so the channel cannot be disconnected.
        if let Err(err) = self.sender.send(command) {
            log::error!("Failed to queue timeline command: {}", err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Take every queued command, oldest first.
    pub fn drain(&self) -> Vec<TimelineCommand> {
        let mut commands = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(command) => commands.push(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        commands
    }
}
