#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::MARKER_HIT_RADIUS_PX;
use crate::mapper::{Point, ScreenRect, fraction_to_pixel};
use crate::marker::{Marker, MarkerId};

/// Find the marker under `client`, if any.
///
/// Distances are measured in client pixels so the hit area stays the same
/// size on screen however large the canvas is drawn. When pins overlap, the
/// most recently placed one (drawn on top) wins.
#[must_use]
pub fn hit_test(client: Point, markers: &[Marker], rect: ScreenRect) -> Option<MarkerId> {
    let radius_sq = MARKER_HIT_RADIUS_PX * MARKER_HIT_RADIUS_PX;
    markers.iter().rev().find_map(|m| {
        let center = fraction_to_pixel(m.position(), rect)?;
        let dx = client.x - center.x;
        let dy = client.y - center.y;
        (dx * dx + dy * dy <= radius_sq).then_some(m.id)
    })
}
