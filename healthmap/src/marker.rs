//! Marker data model: point annotations on a pet's body map.
//!
//! A marker's position is always a fraction of the logical canvas, never a
//! pixel, so the same marker lands on the same spot of the body on any device.
//! Markers are persisted as one denormalized list on the pet record; an empty
//! list is stored as "no markers" (`None` / JSON `null`).

#[cfg(test)]
#[path = "marker_test.rs"]
mod marker_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mapper::FracPoint;

/// Unique identifier for a marker, chosen client-side at creation.
pub type MarkerId = Uuid;

/// Identifier of the pet record that owns a marker list.
pub type PetId = Uuid;

/// A point annotation on the body map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    /// Fraction of the logical canvas width, in `[0, 1]`.
    pub x: f64,
    /// Fraction of the logical canvas height, in `[0, 1]`.
    pub y: f64,
    /// Free text, possibly empty.
    #[serde(default)]
    pub note: String,
    /// Creation time in Unix epoch milliseconds. Legend ordering only.
    pub created_at: i64,
}

impl Marker {
    /// Create a marker with a fresh id at `at`, stamped with the current time.
    #[must_use]
    pub fn new(at: FracPoint, note: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), x: at.fx, y: at.fy, note: note.into(), created_at: now_ms() }
    }

    #[must_use]
    pub fn position(&self) -> FracPoint {
        FracPoint { fx: self.x, fy: self.y }
    }
}

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Encode a marker list for storage on the pet record.
///
/// # Errors
///
/// Returns an error if a marker cannot be serialized.
pub fn encode_marker_list(markers: &[Marker]) -> Result<Option<serde_json::Value>, serde_json::Error> {
    if markers.is_empty() {
        return Ok(None);
    }
    serde_json::to_value(markers).map(Some)
}

/// Decode a stored marker list. `None` and JSON `null` both mean no markers.
///
/// # Errors
///
/// Returns an error if the value is neither `null` nor an array of markers.
pub fn decode_marker_list(value: Option<&serde_json::Value>) -> Result<Vec<Marker>, serde_json::Error> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(v) => Vec::<Marker>::deserialize(v),
    }
}
