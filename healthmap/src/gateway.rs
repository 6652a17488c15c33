//! Persistence gateway: the narrow contract to the two external services.
//!
//! DESIGN
//! ======
//! The marker service and the photo service belong to other subsystems; this
//! crate only sees them through the object-safe traits below. The gateway
//! translates one store operation into exactly one service call and the
//! service's reply into an [`Outcome`]. It never retries, batches or caches:
//! a failure goes straight back to the store as a rollback.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::marker::{Marker, MarkerId, PetId};
use crate::store::{Outcome, PersistCall, PersistRequest};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while talking to an external service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The request could not be sent or the response could not be read.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-success HTTP status.
    #[error("service returned status {status}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The service answered but reported `success: false`.
    #[error("service rejected the request")]
    Rejected,
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Reply to a marker save or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
}

/// A stored photo as returned by the photo service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub url: String,
    /// Storage time in Unix epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
}

/// Reply to a photo upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
}

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Marker list persistence, owned by the pet-record subsystem.
#[async_trait::async_trait]
pub trait MarkerService: Send + Sync {
    /// Read the pet's persisted marker list in order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the service cannot be reached or replies malformed.
    async fn load_markers(&self, pet_id: PetId) -> Result<Vec<Marker>, GatewayError>;

    /// Upsert one marker into the pet's list, keyed by marker id.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the service cannot be reached or replies malformed.
    async fn save_marker(&self, pet_id: PetId, marker: &Marker) -> Result<SaveResponse, GatewayError>;

    /// Remove one marker by id from the pet's list.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the service cannot be reached or replies malformed.
    async fn delete_marker(&self, pet_id: PetId, marker_id: MarkerId) -> Result<SaveResponse, GatewayError>;
}

/// Photo storage, owned by the photo-gallery subsystem.
#[async_trait::async_trait]
pub trait PhotoService: Send + Sync {
    /// Store raw image bytes for a pet.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the service cannot be reached or replies malformed.
    async fn upload_photo(&self, pet_id: PetId, image: Vec<u8>) -> Result<UploadResponse, GatewayError>;
}

/// Fetches a background photo's bytes by URL.
#[async_trait::async_trait]
pub trait PhotoLoader: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the photo cannot be fetched.
    async fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, GatewayError>;
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Send one store request and translate the reply into an [`Outcome`].
pub async fn persist(service: &dyn MarkerService, pet_id: PetId, request: &PersistRequest) -> Outcome {
    let (marker_id, reply) = match &request.call {
        PersistCall::Save(marker) => {
            debug!(%pet_id, marker_id = %marker.id, op = request.op, "saving marker");
            (marker.id, service.save_marker(pet_id, marker).await)
        }
        PersistCall::Delete(marker_id) => {
            debug!(%pet_id, %marker_id, op = request.op, "deleting marker");
            (*marker_id, service.delete_marker(pet_id, *marker_id).await)
        }
    };
    match reply {
        Ok(SaveResponse { success: true }) => Outcome::Confirmed,
        Ok(SaveResponse { success: false }) => {
            warn!(%pet_id, %marker_id, op = request.op, "marker persistence rejected; rolling back");
            Outcome::Failed
        }
        Err(e) => {
            warn!(%pet_id, %marker_id, op = request.op, error = %e, "marker persistence failed; rolling back");
            Outcome::Failed
        }
    }
}

/// Upload image bytes and return the stored photo.
///
/// # Errors
///
/// Returns [`GatewayError::Rejected`] if the service reports failure or omits
/// the photo, or the underlying error if the call itself fails.
pub async fn upload(service: &dyn PhotoService, pet_id: PetId, image: Vec<u8>) -> Result<Photo, GatewayError> {
    debug!(%pet_id, bytes = image.len(), "uploading photo");
    match service.upload_photo(pet_id, image).await? {
        UploadResponse { success: true, photo: Some(photo) } => Ok(photo),
        UploadResponse { .. } => Err(GatewayError::Rejected),
    }
}
