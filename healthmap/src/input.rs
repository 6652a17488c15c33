//! Input model: pointer kinds, keys, and the interaction mode state machine.
//!
//! `Mode` is the single source of truth for which popup editor is open. It is
//! an enum, so placing a new marker and editing an existing one can never be
//! active at the same time: entering one replaces (and discards) the other.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::mapper::FracPoint;
use crate::marker::MarkerId;

/// Where a pointer event came from. Mouse, pen and touch drive the same state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

impl PointerKind {
    /// Touch input on the canvas must not trigger browser zoom or scroll gestures.
    #[must_use]
    pub fn suppresses_default_gestures(self) -> bool {
        matches!(self, Self::Touch)
    }
}

/// A keyboard key as reported by the host (e.g. `"Escape"`, `"Enter"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape" || self.0 == "Esc"
    }
}

/// A not-yet-saved marker: its position and the note being typed.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub at: FracPoint,
    pub note: String,
}

/// Which editor, if any, is open.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    /// Nothing open.
    #[default]
    Idle,
    /// A new pin is shown with its note editor open.
    Placing(Draft),
    /// An existing marker's note editor is open. `note` is the edit buffer.
    Selected { id: MarkerId, note: String },
}

impl Mode {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<MarkerId> {
        match self {
            Self::Selected { id, .. } => Some(*id),
            Self::Idle | Self::Placing(_) => None,
        }
    }

    #[must_use]
    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Self::Placing(draft) => Some(draft),
            Self::Idle | Self::Selected { .. } => None,
        }
    }

    /// The editor's text buffer, if an editor is open.
    pub fn note_buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Placing(draft) => Some(&mut draft.note),
            Self::Selected { note, .. } => Some(note),
            Self::Idle => None,
        }
    }
}
