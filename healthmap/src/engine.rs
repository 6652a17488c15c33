//! Interaction controller for one pet's health map.
//!
//! `Engine` owns the marker store, the background selection, the coordinate
//! mapper and the interaction mode. Host events (pointer, keyboard, editor
//! buttons) go in; [`Action`]s come out. Persistence is never awaited here:
//! mutations are applied optimistically and surface as [`Action::Persist`] for
//! the host to send, and outcomes come back through [`Engine::resolve`].

use crate::background::{Background, BackgroundCommand, BackgroundProvider};
use crate::hit::hit_test;
use crate::input::{Draft, Key, Mode, PointerKind};
use crate::mapper::{CoordinateMapper, FracPoint, Point, ViewportMetrics};
use crate::marker::{Marker, MarkerId, PetId};
use crate::store::{MarkerStore, OpId, OpState, Outcome, PendingOp, PersistRequest};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from event handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this request through the persistence gateway and report back via [`Engine::resolve`].
    Persist(PersistRequest),
    /// Open (or move) the note editor popup at `anchor`, in client pixels.
    OpenEditor { anchor: Point, note: String },
    /// Close the note editor popup.
    CloseEditor,
    /// The event was consumed by the canvas; suppress the browser's default gesture.
    SuppressDefaultGesture,
    /// The map needs to be redrawn.
    RenderNeeded,
}

/// Transient save indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Saving,
    Failed,
}

/// Health map state for one pet, independent of any rendering surface.
pub struct Engine<V> {
    pet_id: PetId,
    store: MarkerStore,
    background: BackgroundProvider,
    mapper: CoordinateMapper<V>,
    mode: Mode,
    hovered: Option<MarkerId>,
    last_failed: bool,
}

impl<V: ViewportMetrics> Engine<V> {
    #[must_use]
    pub fn new(pet_id: PetId, metrics: V) -> Self {
        Self {
            pet_id,
            store: MarkerStore::new(),
            background: BackgroundProvider::new(),
            mapper: CoordinateMapper::new(metrics),
            mode: Mode::Idle,
            hovered: None,
            last_failed: false,
        }
    }

    // --- Data inputs ---

    /// Hydrate the marker list from the persisted snapshot.
    pub fn load_markers(&mut self, markers: Vec<Marker>) {
        self.store.load(markers);
        if let Some(id) = self.mode.selected_id() {
            if self.store.get(&id).is_none() {
                self.mode = Mode::Idle;
            }
        }
    }

    /// Apply a background change requested elsewhere in the application.
    pub fn apply_background(&mut self, command: BackgroundCommand) -> Vec<Action> {
        if self.background.apply(command) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Pointer / keyboard ---

    /// Pointer-down on the canvas surface.
    ///
    /// Hitting a marker selects it; anything else starts placing a new marker
    /// there. Either way the previous editor's unsaved draft is discarded. A
    /// canvas that cannot be measured ignores the event.
    pub fn on_pointer_down(&mut self, client: Point, kind: PointerKind) -> Vec<Action> {
        let Some(rect) = self.mapper.rect() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if kind.suppresses_default_gestures() {
            actions.push(Action::SuppressDefaultGesture);
        }

        if let Some(id) = hit_test(client, self.store.list(), rect) {
            let note = self.store.get(&id).map(|m| m.note.clone()).unwrap_or_default();
            self.mode = Mode::Selected { id, note };
        } else {
            let Some(at) = self.mapper.client_to_fraction(client) else {
                return actions;
            };
            self.mode = Mode::Placing(Draft { at, note: String::new() });
        }

        if let Some(open) = self.open_editor_action() {
            actions.push(open);
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Pointer movement over the canvas. Updates hover feedback; a touch drag
    /// is also claimed so the page does not scroll underneath it.
    pub fn on_pointer_move(&mut self, client: Point, kind: PointerKind) -> Vec<Action> {
        let Some(rect) = self.mapper.rect() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if kind.suppresses_default_gestures() {
            actions.push(Action::SuppressDefaultGesture);
        }
        let hovered = hit_test(client, self.store.list(), rect);
        if hovered != self.hovered {
            self.hovered = hovered;
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Pointer left the canvas.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if self.hovered.take().is_some() {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if key.is_escape() { self.cancel() } else { Vec::new() }
    }

    /// A click landed outside both the canvas and the editor popup.
    pub fn on_outside_click(&mut self) -> Vec<Action> {
        self.cancel()
    }

    // --- Editor ---

    /// Replace the open editor's text buffer. Ignored when no editor is open.
    pub fn set_draft_note(&mut self, note: impl Into<String>) {
        if let Some(buffer) = self.mode.note_buffer_mut() {
            *buffer = note.into();
        }
    }

    /// Commit the open editor: place the draft or update the selected marker's note.
    pub fn save(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.mode) {
            Mode::Idle => Vec::new(),
            Mode::Placing(draft) => {
                let mut actions = self.place_marker(draft.at, draft.note);
                actions.insert(0, Action::CloseEditor);
                actions
            }
            Mode::Selected { id, note } => {
                let mut actions = vec![Action::CloseEditor];
                if let Some(request) = self.store.update(&id, note) {
                    self.last_failed = false;
                    actions.push(Action::Persist(request));
                }
                actions.push(Action::RenderNeeded);
                actions
            }
        }
    }

    /// Delete the selected marker. While placing, this just discards the draft.
    pub fn delete(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.mode) {
            Mode::Idle => Vec::new(),
            Mode::Placing(_) => vec![Action::CloseEditor, Action::RenderNeeded],
            Mode::Selected { id, .. } => {
                let mut actions = vec![Action::CloseEditor];
                if let Some(request) = self.store.remove(&id) {
                    self.last_failed = false;
                    actions.push(Action::Persist(request));
                }
                if self.hovered == Some(id) {
                    self.hovered = None;
                }
                actions.push(Action::RenderNeeded);
                actions
            }
        }
    }

    /// Close the editor without saving. Nothing already sent is affected.
    pub fn cancel(&mut self) -> Vec<Action> {
        if std::mem::take(&mut self.mode).is_idle() {
            Vec::new()
        } else {
            vec![Action::CloseEditor, Action::RenderNeeded]
        }
    }

    /// Place a marker directly at a fractional position, bypassing the editor.
    pub fn place_marker(&mut self, at: FracPoint, note: impl Into<String>) -> Vec<Action> {
        let (_, request) = self.store.place(at, note);
        self.last_failed = false;
        vec![Action::Persist(request), Action::RenderNeeded]
    }

    /// Replace a marker's note directly. An unknown id changes nothing and sends nothing.
    pub fn update_marker(&mut self, id: &MarkerId, note: impl Into<String>) -> Vec<Action> {
        let Some(request) = self.store.update(id, note) else {
            return Vec::new();
        };
        self.last_failed = false;
        vec![Action::Persist(request), Action::RenderNeeded]
    }

    /// Delete a marker directly, closing its editor if it is open.
    pub fn remove_marker(&mut self, id: &MarkerId) -> Vec<Action> {
        let Some(request) = self.store.remove(id) else {
            return Vec::new();
        };
        self.last_failed = false;
        let mut actions = Vec::new();
        if self.mode.selected_id() == Some(*id) {
            self.mode = Mode::Idle;
            actions.push(Action::CloseEditor);
        }
        if self.hovered == Some(*id) {
            self.hovered = None;
        }
        actions.push(Action::Persist(request));
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Persistence outcomes ---

    /// Feed a persistence outcome back into the store.
    ///
    /// A failure rolls the operation back; if that removes the marker whose
    /// editor is open, the editor closes.
    pub fn resolve(&mut self, op: OpId, outcome: Outcome) -> (Option<PendingOp>, Vec<Action>) {
        let Some(settled) = self.store.resolve(op, outcome) else {
            return (None, Vec::new());
        };
        if settled.state != OpState::RolledBack {
            return (Some(settled), Vec::new());
        }

        self.last_failed = true;
        if let Some(id) = self.hovered {
            if self.store.get(&id).is_none() {
                self.hovered = None;
            }
        }
        let mut actions = Vec::new();
        if let Some(id) = self.mode.selected_id() {
            if self.store.get(&id).is_none() {
                self.mode = Mode::Idle;
                actions.push(Action::CloseEditor);
            }
        }
        actions.push(Action::RenderNeeded);
        (Some(settled), actions)
    }

    // --- Queries ---

    #[must_use]
    pub fn pet_id(&self) -> PetId {
        self.pet_id
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        self.store.list()
    }

    #[must_use]
    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub fn hovered(&self) -> Option<MarkerId> {
        self.hovered
    }

    #[must_use]
    pub fn background(&self) -> &Background {
        self.background.current()
    }

    pub fn background_mut(&mut self) -> &mut BackgroundProvider {
        &mut self.background
    }

    pub fn metrics_mut(&mut self) -> &mut V {
        self.mapper.metrics_mut()
    }

    #[must_use]
    pub fn mapper(&self) -> &CoordinateMapper<V> {
        &self.mapper
    }

    /// Flattening is only offered when there is at least one marker.
    #[must_use]
    pub fn can_export(&self) -> bool {
        !self.store.is_empty()
    }

    #[must_use]
    pub fn sync_status(&self) -> SyncStatus {
        if self.store.in_flight() > 0 {
            SyncStatus::Saving
        } else if self.last_failed {
            SyncStatus::Failed
        } else {
            SyncStatus::Idle
        }
    }

    /// Client-pixel anchor for the open editor, recomputed from the stored fraction.
    #[must_use]
    pub fn editor_anchor(&self) -> Option<Point> {
        let at = match &self.mode {
            Mode::Idle => return None,
            Mode::Placing(draft) => draft.at,
            Mode::Selected { id, .. } => self.store.get(id)?.position(),
        };
        self.mapper.fraction_to_client(at)
    }

    fn open_editor_action(&self) -> Option<Action> {
        let note = match &self.mode {
            Mode::Idle => return None,
            Mode::Placing(draft) => draft.note.clone(),
            Mode::Selected { note, .. } => note.clone(),
        };
        Some(Action::OpenEditor { anchor: self.editor_anchor()?, note })
    }
}
