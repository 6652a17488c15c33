//! Async driver that connects one engine to the external services.
//!
//! The engine never awaits anything. A `Session` collects the
//! [`Action::Persist`] requests the engine emits into an outbox and sends
//! them on [`Session::flush`], all concurrently on the calling task. Outcomes
//! are fed back in completion order, so an early failure can roll back while a
//! later save is still in flight.
//!
//! Dropping a flush or export future abandons it. Requests already sent are
//! not recalled; their operations simply stay in flight in the ledger.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::debug;

use crate::engine::{Action, Engine};
use crate::export::{self, ExportError};
use crate::gateway::{self, GatewayError, MarkerService, Photo, PhotoLoader, PhotoService};
use crate::mapper::ViewportMetrics;
use crate::marker::PetId;
use crate::store::{PendingOp, PersistRequest};

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct Services {
    pub markers: Arc<dyn MarkerService>,
    pub photos: Arc<dyn PhotoService>,
    pub loader: Arc<dyn PhotoLoader>,
}

/// Result of one flush.
#[derive(Debug, Default)]
pub struct Flushed {
    /// Ledger entries settled by this flush, in completion order.
    pub settled: Vec<PendingOp>,
    /// Follow-up host actions produced by rollbacks.
    pub actions: Vec<Action>,
}

pub struct Session<V> {
    engine: Engine<V>,
    services: Services,
    outbox: Vec<PersistRequest>,
}

impl<V: ViewportMetrics> Session<V> {
    /// Wrap an engine that is already hydrated.
    #[must_use]
    pub fn new(engine: Engine<V>, services: Services) -> Self {
        Self { engine, services, outbox: Vec::new() }
    }

    /// Load the pet's persisted markers and start a session over them.
    ///
    /// # Errors
    ///
    /// Returns the marker service's error if the list cannot be loaded.
    pub async fn open(pet_id: PetId, metrics: V, services: Services) -> Result<Self, GatewayError> {
        let markers = services.markers.load_markers(pet_id).await?;
        debug!(%pet_id, count = markers.len(), "loaded health map");
        let mut engine = Engine::new(pet_id, metrics);
        engine.load_markers(markers);
        Ok(Self::new(engine, services))
    }

    #[must_use]
    pub fn engine(&self) -> &Engine<V> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<V> {
        &mut self.engine
    }

    /// Requests queued and not yet sent.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Queue persistence requests and hand every other action back to the host.
    pub fn dispatch(&mut self, actions: Vec<Action>) -> Vec<Action> {
        let mut host = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                Action::Persist(request) => self.outbox.push(request),
                other => host.push(other),
            }
        }
        host
    }

    /// Send every queued request and reconcile each outcome as it arrives.
    pub async fn flush(&mut self) -> Flushed {
        let requests = std::mem::take(&mut self.outbox);
        let mut flushed = Flushed::default();
        if requests.is_empty() {
            return flushed;
        }

        let pet_id = self.engine.pet_id();
        let service = self.services.markers.as_ref();
        debug!(%pet_id, count = requests.len(), "flushing marker requests");

        let mut in_flight: FuturesUnordered<_> = requests
            .into_iter()
            .map(|request| async move {
                let outcome = gateway::persist(service, pet_id, &request).await;
                (request.op, outcome)
            })
            .collect();

        while let Some((op, outcome)) = in_flight.next().await {
            let (entry, actions) = self.engine.resolve(op, outcome);
            flushed.settled.extend(entry);
            for action in actions {
                if !flushed.actions.contains(&action) {
                    flushed.actions.push(action);
                }
            }
        }
        flushed
    }

    /// Dispatch then flush; returns the host actions from both steps.
    pub async fn settle(&mut self, actions: Vec<Action>) -> (Vec<Action>, Flushed) {
        let host = self.dispatch(actions);
        let flushed = self.flush().await;
        (host, flushed)
    }

    /// Flatten the current map and upload it to photo storage.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NothingToExport`] without calling any service
    /// when there are no markers, or the terminal error of the failed stage.
    pub async fn export(&self) -> Result<Photo, ExportError> {
        if !self.engine.can_export() {
            return Err(ExportError::NothingToExport);
        }
        export::export(
            self.engine.pet_id(),
            self.engine.markers(),
            self.engine.background(),
            self.services.loader.as_ref(),
            self.services.photos.as_ref(),
        )
        .await
    }
}
