//! In-memory marker list with optimistic mutations and explicit rollback.
//!
//! Every mutation is applied to the list immediately and recorded in a ledger
//! as a [`PendingOp`] that carries the prior value as data. The caller hands
//! the returned [`PersistRequest`] to the persistence gateway and later feeds
//! the [`Outcome`] back through [`MarkerStore::resolve`], which either drops
//! the ledger entry or reverts exactly that operation's change.
//!
//! Operations on different markers resolve independently and in any order.
//! Operations on the same marker are not sequenced: each rollback restores
//! only the value its own operation recorded.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;

use crate::mapper::FracPoint;
use crate::marker::{Marker, MarkerId};

/// Ledger key for one in-flight mutation.
pub type OpId = u64;

/// The change an operation applied, with everything needed to undo it.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// A marker was appended.
    Place { marker: Marker },
    /// A marker's note was replaced. `prior` is the full marker before the edit.
    Update { prior: Marker, next: Marker },
    /// A marker was removed from `index`.
    Remove { prior: Marker, index: usize },
}

impl Mutation {
    /// Id of the marker this mutation touched.
    #[must_use]
    pub fn marker_id(&self) -> MarkerId {
        match self {
            Self::Place { marker } => marker.id,
            Self::Update { prior, .. } | Self::Remove { prior, .. } => prior.id,
        }
    }
}

/// Lifecycle of one optimistic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    /// Applied locally, awaiting the persistence outcome.
    Applied,
    /// The persistence service accepted the change.
    Confirmed,
    /// The persistence service rejected the change and it was reverted.
    RolledBack,
}

/// A ledger entry for one optimistic mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOp {
    pub id: OpId,
    pub mutation: Mutation,
    pub state: OpState,
}

/// Result reported by the persistence gateway for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Confirmed,
    Failed,
}

/// The external call a mutation needs.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistCall {
    /// Upsert this marker into the pet's persisted list.
    Save(Marker),
    /// Remove this marker id from the pet's persisted list.
    Delete(MarkerId),
}

/// A persistence request tied to its ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistRequest {
    pub op: OpId,
    pub call: PersistCall,
}

/// Ordered in-memory marker list for one pet. The single source of truth for rendering.
#[derive(Debug, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    pending: BTreeMap<OpId, PendingOp>,
    next_op: OpId,
}

impl MarkerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a persisted snapshot. In-flight ledger entries are kept.
    pub fn load(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
    }

    /// Append a new marker at `at` and request its persistence.
    pub fn place(&mut self, at: FracPoint, note: impl Into<String>) -> (Marker, PersistRequest) {
        let marker = Marker::new(FracPoint::clamped(at.fx, at.fy), note);
        self.markers.push(marker.clone());
        let op = self.record(Mutation::Place { marker: marker.clone() });
        (marker.clone(), PersistRequest { op, call: PersistCall::Save(marker) })
    }

    /// Replace a marker's note. Returns `None` (and records nothing) if `id` is unknown.
    pub fn update(&mut self, id: &MarkerId, note: impl Into<String>) -> Option<PersistRequest> {
        let slot = self.markers.iter_mut().find(|m| m.id == *id)?;
        let prior = slot.clone();
        slot.note = note.into();
        let next = slot.clone();
        let op = self.record(Mutation::Update { prior, next: next.clone() });
        Some(PersistRequest { op, call: PersistCall::Save(next) })
    }

    /// Remove a marker. Returns `None` (and records nothing) if `id` is unknown.
    pub fn remove(&mut self, id: &MarkerId) -> Option<PersistRequest> {
        let index = self.markers.iter().position(|m| m.id == *id)?;
        let prior = self.markers.remove(index);
        let marker_id = prior.id;
        let op = self.record(Mutation::Remove { prior, index });
        Some(PersistRequest { op, call: PersistCall::Delete(marker_id) })
    }

    /// Settle an in-flight operation.
    ///
    /// On [`Outcome::Failed`] the operation's change is reverted. Returns the
    /// settled ledger entry, or `None` if `op` is not in flight.
    pub fn resolve(&mut self, op: OpId, outcome: Outcome) -> Option<PendingOp> {
        let mut entry = self.pending.remove(&op)?;
        match outcome {
            Outcome::Confirmed => entry.state = OpState::Confirmed,
            Outcome::Failed => {
                self.revert(&entry.mutation);
                entry.state = OpState::RolledBack;
            }
        }
        Some(entry)
    }

    fn revert(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::Place { marker } => {
                self.markers.retain(|m| m.id != marker.id);
            }
            Mutation::Update { prior, .. } => {
                if let Some(slot) = self.markers.iter_mut().find(|m| m.id == prior.id) {
                    *slot = prior.clone();
                }
            }
            Mutation::Remove { prior, index } => {
                if self.get(&prior.id).is_none() {
                    let at = (*index).min(self.markers.len());
                    self.markers.insert(at, prior.clone());
                }
            }
        }
    }

    fn record(&mut self, mutation: Mutation) -> OpId {
        self.next_op += 1;
        let id = self.next_op;
        self.pending.insert(id, PendingOp { id, mutation, state: OpState::Applied });
        id
    }

    // --- Queries ---

    /// Read-only view of the markers in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Marker] {
        &self.markers
    }

    /// Owned copy of the current list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Marker> {
        self.markers.clone()
    }

    #[must_use]
    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == *id)
    }

    /// Ledger entry for an operation that has not been resolved yet.
    #[must_use]
    pub fn pending(&self, op: OpId) -> Option<&PendingOp> {
        self.pending.get(&op)
    }

    /// Number of operations awaiting an outcome.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
