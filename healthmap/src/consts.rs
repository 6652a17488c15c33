//! Shared numeric and color constants for the health map crate.

// ── Logical canvas ──────────────────────────────────────────────

/// Width of the fixed virtual drawing surface every marker is defined against.
pub const LOGICAL_WIDTH: f64 = 400.0;

/// Height of the fixed virtual drawing surface.
pub const LOGICAL_HEIGHT: f64 = 300.0;

// ── Export ──────────────────────────────────────────────────────

/// Raster multiple applied to the logical canvas when flattening.
pub const EXPORT_SCALE: u32 = 2;

/// Flat fill used behind the silhouette when no photo is active (RGBA).
pub const EXPORT_BACKGROUND_RGBA: [u8; 4] = [247, 243, 238, 255];

/// Static stroke color for the recolored silhouette in exports.
pub const EXPORT_SILHOUETTE_STROKE: &str = "#6B5B4E";

// ── Markers ─────────────────────────────────────────────────────

/// Pin radius in logical canvas units.
pub const MARKER_RADIUS: f64 = 9.0;

/// Pin fill color.
pub const MARKER_FILL: &str = "#E4572E";

/// Pin outline color.
pub const MARKER_STROKE: &str = "#FFFFFF";

/// Legend number color drawn on top of a pin.
pub const MARKER_LABEL_FILL: &str = "#FFFFFF";

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels around a marker center.
pub const MARKER_HIT_RADIUS_PX: f64 = 14.0;

// ── Interactive affordances ─────────────────────────────────────

/// Radius of the dashed selection ring, in logical units.
pub const SELECTION_RING_RADIUS: f64 = 14.0;

/// Dash pattern of the selection ring.
pub const SELECTION_DASH: &str = "4 3";
