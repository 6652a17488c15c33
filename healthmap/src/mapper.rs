//! Coordinate spaces: client pixels, the logical canvas, and stored fractions.
//!
//! Pointer events arrive in client (viewport) pixels. The canvas element is
//! measured through an injected [`ViewportMetrics`] capability, projected onto
//! the fixed [`LOGICAL_WIDTH`] x [`LOGICAL_HEIGHT`] surface, and stored as
//! fractions of that surface. Every transform is linear, so a marker keeps its
//! place on the body no matter what size the canvas is drawn at.

#[cfg(test)]
#[path = "mapper_test.rs"]
mod mapper_test;

use serde::{Deserialize, Serialize};

use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// A point in client pixels or logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position expressed as a fraction (0.0 to 1.0) of the logical canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FracPoint {
    pub fx: f64,
    pub fy: f64,
}

impl FracPoint {
    /// Build a fractional point, clamping each axis into `[0, 1]`.
    #[must_use]
    pub fn clamped(fx: f64, fy: f64) -> Self {
        Self { fx: clamp_unit(fx), fy: clamp_unit(fy) }
    }

    /// Project onto the logical canvas.
    #[must_use]
    pub fn to_logical(self) -> Point {
        Point::new(self.fx * LOGICAL_WIDTH, self.fy * LOGICAL_HEIGHT)
    }

    /// Inverse of [`FracPoint::to_logical`]. Does not clamp.
    #[must_use]
    pub fn from_logical(logical: Point) -> Self {
        Self { fx: logical.x / LOGICAL_WIDTH, fy: logical.y / LOGICAL_HEIGHT }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// The canvas element's on-screen bounding box in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// A box at the client origin with the given size.
    #[must_use]
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Whether the box can be used for mapping (positive, finite extent).
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Capability that measures the canvas element.
///
/// Returns `None` while the element is not mounted. Tests supply a
/// [`FixedViewport`]; a browser host measures the DOM element.
pub trait ViewportMetrics {
    fn bounding_box(&self) -> Option<ScreenRect>;
}

/// A viewport whose bounding box is set explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedViewport {
    rect: Option<ScreenRect>,
}

impl FixedViewport {
    #[must_use]
    pub fn mounted(rect: ScreenRect) -> Self {
        Self { rect: Some(rect) }
    }

    #[must_use]
    pub fn unmounted() -> Self {
        Self { rect: None }
    }

    /// Replace the measured box, e.g. after a resize.
    pub fn set_rect(&mut self, rect: ScreenRect) {
        self.rect = Some(rect);
    }

    pub fn unmount(&mut self) {
        self.rect = None;
    }
}

impl ViewportMetrics for FixedViewport {
    fn bounding_box(&self) -> Option<ScreenRect> {
        self.rect
    }
}

/// Convert a client-pixel point to logical canvas units.
#[must_use]
pub fn pixel_to_logical(client: Point, rect: ScreenRect) -> Option<Point> {
    if !rect.is_measurable() {
        return None;
    }
    Some(Point {
        x: (client.x - rect.left) * (LOGICAL_WIDTH / rect.width),
        y: (client.y - rect.top) * (LOGICAL_HEIGHT / rect.height),
    })
}

/// Convert a client-pixel point to a stored fraction, clamped into `[0, 1]`.
#[must_use]
pub fn pixel_to_fraction(client: Point, rect: ScreenRect) -> Option<FracPoint> {
    let logical = pixel_to_logical(client, rect)?;
    let raw = FracPoint::from_logical(logical);
    Some(FracPoint::clamped(raw.fx, raw.fy))
}

/// Convert a stored fraction to client pixels within `rect`.
#[must_use]
pub fn fraction_to_pixel(frac: FracPoint, rect: ScreenRect) -> Option<Point> {
    if !rect.is_measurable() {
        return None;
    }
    let logical = frac.to_logical();
    Some(Point {
        x: rect.left + logical.x * (rect.width / LOGICAL_WIDTH),
        y: rect.top + logical.y * (rect.height / LOGICAL_HEIGHT),
    })
}

/// Maps between coordinate spaces using a live [`ViewportMetrics`] source.
///
/// Every operation returns `None` when the canvas cannot be measured.
#[derive(Debug, Clone)]
pub struct CoordinateMapper<V> {
    metrics: V,
}

impl<V: ViewportMetrics> CoordinateMapper<V> {
    #[must_use]
    pub fn new(metrics: V) -> Self {
        Self { metrics }
    }

    #[must_use]
    pub fn metrics(&self) -> &V {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut V {
        &mut self.metrics
    }

    /// Current bounding box, if measurable.
    #[must_use]
    pub fn rect(&self) -> Option<ScreenRect> {
        self.metrics.bounding_box().filter(ScreenRect::is_measurable)
    }

    #[must_use]
    pub fn client_to_logical(&self, client: Point) -> Option<Point> {
        pixel_to_logical(client, self.rect()?)
    }

    #[must_use]
    pub fn client_to_fraction(&self, client: Point) -> Option<FracPoint> {
        pixel_to_fraction(client, self.rect()?)
    }

    #[must_use]
    pub fn fraction_to_client(&self, frac: FracPoint) -> Option<Point> {
        fraction_to_pixel(frac, self.rect()?)
    }
}
