//! Rendering: builds the marker overlay as an SVG document.
//!
//! The overlay is drawn in logical canvas units and stretched to the canvas
//! box (`preserveAspectRatio="none"`), which is exactly the linear mapping the
//! coordinate mapper uses, so pins line up with pointer hits at any size.
//!
//! Two modes share one scene:
//!
//! - [`RenderMode::Interactive`] emits CSS class hooks, hover and selection
//!   affordances, the draft pin, and note tooltips for the live view.
//! - [`RenderMode::Export`] emits only static, inline-styled shapes so the
//!   document renders identically outside the page that produced it. This is
//!   the overlay the flatten pipeline rasterizes.
//!
//! This module only reads state; it never mutates anything.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::background::Background;
use crate::consts::{
    EXPORT_SILHOUETTE_STROKE, LOGICAL_HEIGHT, LOGICAL_WIDTH, MARKER_FILL, MARKER_LABEL_FILL, MARKER_RADIUS,
    MARKER_STROKE, SELECTION_DASH, SELECTION_RING_RADIUS,
};
use crate::engine::Engine;
use crate::input::Mode;
use crate::mapper::{FracPoint, ViewportMetrics};
use crate::marker::{Marker, MarkerId};
use crate::silhouette::{SILHOUETTE_PATH, SILHOUETTE_STROKE_WIDTH};

/// Which flavor of overlay to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Interactive,
    Export,
}

/// Read-only view of everything the overlay draws.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub markers: &'a [Marker],
    pub background: &'a Background,
    pub selected: Option<MarkerId>,
    pub hovered: Option<MarkerId>,
    pub draft: Option<FracPoint>,
}

impl<'a> Scene<'a> {
    /// A scene with only markers and a background; no interaction state.
    #[must_use]
    pub fn still(markers: &'a [Marker], background: &'a Background) -> Self {
        Self { markers, background, selected: None, hovered: None, draft: None }
    }

    /// Capture the engine's current state.
    #[must_use]
    pub fn from_engine<V: ViewportMetrics>(engine: &'a Engine<V>) -> Self {
        let draft = match engine.mode() {
            Mode::Placing(d) => Some(d.at),
            Mode::Idle | Mode::Selected { .. } => None,
        };
        Self {
            markers: engine.markers(),
            background: engine.background(),
            selected: engine.mode().selected_id(),
            hovered: engine.hovered(),
            draft,
        }
    }
}

/// One numbered legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub number: usize,
    pub id: MarkerId,
    pub note: String,
}

/// Number markers 1..n by creation time. Ties keep list order.
#[must_use]
pub fn legend(markers: &[Marker]) -> Vec<LegendEntry> {
    let mut ordered: Vec<&Marker> = markers.iter().collect();
    ordered.sort_by_key(|m| m.created_at);
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, m)| LegendEntry { number: i + 1, id: m.id, note: m.note.clone() })
        .collect()
}

/// Build the overlay SVG document.
#[must_use]
pub fn overlay_svg(scene: &Scene<'_>, mode: RenderMode) -> String {
    let mut svg = open_svg(mode);

    // Layer 1: silhouette outline, only when no photo is behind the markers.
    if !scene.background.is_photo() {
        svg.push_str(&silhouette_element(mode));
    }

    // Layer 2: markers in list order (later pins on top).
    let numbers = legend(scene.markers);
    for marker in scene.markers {
        let number = numbers.iter().find(|e| e.id == marker.id).map_or(0, |e| e.number);
        svg.push_str(&marker_element(marker, number, scene, mode));
    }

    // Layer 3: interactive-only affordances.
    if mode == RenderMode::Interactive {
        if let Some(id) = scene.selected {
            if let Some(marker) = scene.markers.iter().find(|m| m.id == id) {
                svg.push_str(&selection_ring(marker.position()));
            }
        }
        if let Some(at) = scene.draft {
            svg.push_str(&draft_pin(at));
        }
    }

    svg.push_str("</svg>");
    svg
}

// =============================================================
// Elements
// =============================================================

fn open_svg(mode: RenderMode) -> String {
    let (w, h) = (LOGICAL_WIDTH, LOGICAL_HEIGHT);
    match mode {
        RenderMode::Interactive => format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="hm-overlay" style="touch-action: none" width="100%" height="100%" viewBox="0 0 {w} {h}" preserveAspectRatio="none">"#
        ),
        RenderMode::Export => format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        ),
    }
}

fn silhouette_element(mode: RenderMode) -> String {
    match mode {
        RenderMode::Interactive => format!(r#"<path class="hm-silhouette" d="{SILHOUETTE_PATH}"/>"#),
        RenderMode::Export => format!(
            r#"<path d="{SILHOUETTE_PATH}" fill="none" stroke="{EXPORT_SILHOUETTE_STROKE}" stroke-width="{SILHOUETTE_STROKE_WIDTH}" stroke-linejoin="round"/>"#
        ),
    }
}

fn marker_element(marker: &Marker, number: usize, scene: &Scene<'_>, mode: RenderMode) -> String {
    let c = marker.position().to_logical();
    let (cx, cy) = (fmt_coord(c.x), fmt_coord(c.y));
    let label_y = fmt_coord(c.y + MARKER_RADIUS * 0.4);
    match mode {
        RenderMode::Interactive => {
            let mut class = String::from("hm-marker");
            if scene.selected == Some(marker.id) {
                class.push_str(" hm-marker--selected");
            }
            if scene.hovered == Some(marker.id) {
                class.push_str(" hm-marker--hover");
            }
            format!(
                r#"<g class="{class}" data-marker-id="{id}"><title>{title}</title><circle class="hm-pin" cx="{cx}" cy="{cy}" r="{MARKER_RADIUS}"/><text class="hm-pin-label" x="{cx}" y="{label_y}" text-anchor="middle">{number}</text></g>"#,
                id = marker.id,
                title = escape_xml(&marker.note),
            )
        }
        RenderMode::Export => format!(
            r#"<g><circle cx="{cx}" cy="{cy}" r="{MARKER_RADIUS}" fill="{MARKER_FILL}" stroke="{MARKER_STROKE}" stroke-width="2"/><text x="{cx}" y="{label_y}" text-anchor="middle" font-family="sans-serif" font-size="10" font-weight="bold" fill="{MARKER_LABEL_FILL}">{number}</text></g>"#
        ),
    }
}

fn selection_ring(at: FracPoint) -> String {
    let c = at.to_logical();
    format!(
        r#"<circle class="hm-selection-ring" cx="{}" cy="{}" r="{SELECTION_RING_RADIUS}" fill="none" stroke-dasharray="{SELECTION_DASH}"/>"#,
        fmt_coord(c.x),
        fmt_coord(c.y),
    )
}

fn draft_pin(at: FracPoint) -> String {
    let c = at.to_logical();
    format!(
        r#"<circle class="hm-marker hm-marker--draft" cx="{}" cy="{}" r="{MARKER_RADIUS}"/>"#,
        fmt_coord(c.x),
        fmt_coord(c.y),
    )
}

// =============================================================
// Helpers
// =============================================================

fn fmt_coord(v: f64) -> String {
    format!("{v:.2}")
}

/// Escape text for use inside SVG element content or attribute values.
#[must_use]
pub fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
