//! Interaction arbitration
//!
//! Pointer gestures on the timeline are mutually exclusive: a range selection
//! cannot start while a clip is being dragged, and a context menu blocks both.
//! Gestures are classified once, when the pointer is pressed, and must claim a
//! session here before any handler runs.

use crate::structure::TrackId;
use egui::PointerButton;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    SelectionDrag,
    ClipDrag,
    RightClickMenu,
}

/// Pointer input recorded while the panes are laid out. Gestures are applied
/// in order at the start of the next frame, before anything is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Pressed {
        button: PointerButton,
        track_id: Option<TrackId>,
        beat: f64,
        time: f64,
    },
    Dragged {
        beat: f64,
    },
    /// `beat` is `None` when the pointer left the window.
    Released {
        beat: Option<f64>,
    },
    Cancelled,
    MenuClosed,
}

/// Decide which gesture a pointer press starts.
pub fn classify_press(button: PointerButton, over_clip: bool) -> Option<InteractionKind> {
    match button {
        PointerButton::Primary if over_clip => Some(InteractionKind::ClipDrag),
        PointerButton::Primary => Some(InteractionKind::SelectionDrag),
        PointerButton::Secondary => Some(InteractionKind::RightClickMenu),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug)]
struct Session {
    kind: InteractionKind,
    started_at: f64,
}

/// Holds at most one active interaction session.
///
/// Times are in seconds on the host's clock (`egui::InputState::time`).
#[derive(Clone, Debug)]
pub struct InteractionArbiter {
    session: Option<Session>,
    right_click_release_secs: f64,
}

impl Default for InteractionArbiter {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl InteractionArbiter {
    pub fn new(right_click_release_secs: f64) -> Self {
        Self {
            session: None,
            right_click_release_secs: right_click_release_secs.max(0.0),
        }
    }

    fn expire(&mut self, now: f64) {
        if let Some(session) = self.session {
            if session.kind == InteractionKind::RightClickMenu
                && now - session.started_at >= self.right_click_release_secs
            {
                log::debug!("Right-click session released after timeout");
                self.session = None;
            }
        }
    }

    pub fn active(&mut self, now: f64) -> Option<InteractionKind> {
        self.expire(now);
        self.session.map(|session| session.kind)
    }

    pub fn is_active(&mut self, kind: InteractionKind, now: f64) -> bool {
        self.active(now) == Some(kind)
    }

    /// True when no session of another kind is active.
    pub fn can_start(&mut self, kind: InteractionKind, now: f64) -> bool {
        match self.active(now) {
            None => true,
            Some(active) => active == kind,
        }
    }

    /// Claim a session. A denied request is not an error; the caller should
    /// simply drop the gesture.
    pub fn start(&mut self, kind: InteractionKind, now: f64) -> bool {
        if !self.can_start(kind, now) {
            log::debug!(
                "{:?} denied, {:?} in progress",
                kind,
                self.session.map(|session| session.kind)
            );
            return false;
        }
        self.session = Some(Session {
            kind,
            started_at: now,
        });
        true
    }

    /// Release the session if it is of `kind`. Returns whether it was released.
    pub fn end(&mut self, kind: InteractionKind) -> bool {
        match self.session {
            Some(session) if session.kind == kind => {
                self.session = None;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.session = None;
    }
}
