//! Flatten/export pipeline: background + marker overlay -> one PNG -> photo storage.
//!
//! DESIGN
//! ======
//! The composite is built on a raster surface at [`EXPORT_SCALE`] times the
//! logical canvas so output sharpness does not depend on the display that
//! triggered the export.
//!
//! 1. Background: a photo drawn with a centered cover fit, or a flat fill.
//! 2. Overlay: the export-mode SVG from [`crate::render`], rasterized with
//!    resvg at the same scale. It carries only inline styling, so it renders
//!    the same here as it would anywhere else.
//! 3. Composite the overlay over the background, encode PNG, upload once.
//!
//! Any failure along the way is terminal for that export. Nothing is uploaded
//! unless every earlier stage succeeded, so there is never a partial artifact.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use tracing::{debug, info, warn};

use crate::background::Background;
use crate::consts::{EXPORT_BACKGROUND_RGBA, EXPORT_SCALE, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::gateway::{self, GatewayError, Photo, PhotoLoader, PhotoService};
use crate::marker::{Marker, PetId};
use crate::render::{RenderMode, Scene, overlay_svg};

/// Raster surface width in pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const SURFACE_WIDTH: u32 = LOGICAL_WIDTH as u32 * EXPORT_SCALE;

/// Raster surface height in pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const SURFACE_HEIGHT: u32 = LOGICAL_HEIGHT as u32 * EXPORT_SCALE;

/// Errors that end an export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The pet has no markers; exporting is not offered.
    #[error("nothing to export: the health map has no markers")]
    NothingToExport,

    /// The background photo could not be fetched.
    #[error("background photo could not be loaded: {0}")]
    PhotoLoad(String),

    /// The background photo bytes are not a decodable image.
    #[error("background photo could not be decoded: {0}")]
    PhotoDecode(String),

    /// The overlay could not be parsed or the raster surface could not be allocated.
    #[error("drawing surface unavailable: {0}")]
    Surface(String),

    /// The composite could not be encoded as PNG.
    #[error("png encoding failed: {0}")]
    Encode(String),

    /// The photo storage service failed or rejected the upload.
    #[error("upload failed: {0}")]
    Upload(GatewayError),
}

// =============================================================================
// COVER FIT
// =============================================================================

/// Centered window into a source image whose aspect ratio matches the
/// destination. Scaling just this window to the destination size covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverFit {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crop window, in source pixels, that fills `dst` after a uniform scale.
/// The overflow is cropped equally on both sides. Returns `None` if any
/// dimension is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cover_fit(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Option<CoverFit> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return None;
    }
    let (sw, sh, dw, dh) = (u64::from(src_w), u64::from(src_h), u64::from(dst_w), u64::from(dst_h));
    let (width, height) = if sw * dh > sh * dw {
        // Wider than the destination: keep full height, trim the sides.
        (((sh * dw + dh / 2) / dh).clamp(1, sw), sh)
    } else {
        (sw, ((sw * dh + dw / 2) / dw).clamp(1, sh))
    };
    // Both values are clamped to a u32 source dimension.
    let (width, height) = (width as u32, height as u32);
    Some(CoverFit { x: (src_w - width) / 2, y: (src_h - height) / 2, width, height })
}

fn cover(photo: &DynamicImage, width: u32, height: u32) -> Result<RgbaImage, ExportError> {
    let fit = cover_fit(photo.width(), photo.height(), width, height)
        .ok_or_else(|| ExportError::PhotoDecode("photo has zero size".into()))?;
    Ok(photo
        .crop_imm(fit.x, fit.y, fit.width, fit.height)
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgba8())
}

// =============================================================================
// COMPOSITE
// =============================================================================

/// Build the flattened raster for `markers` over `background`.
///
/// `photo` must hold the decoded image when `background` is a photo; it is
/// ignored for the silhouette.
///
/// # Errors
///
/// Returns [`ExportError::PhotoLoad`] if a photo background has no image, and
/// [`ExportError::Surface`] if the overlay cannot be rasterized.
pub fn compose(
    markers: &[Marker],
    background: &Background,
    photo: Option<&DynamicImage>,
) -> Result<RgbaImage, ExportError> {
    let mut canvas = match (background, photo) {
        (Background::Photo { .. }, Some(image)) => cover(image, SURFACE_WIDTH, SURFACE_HEIGHT)?,
        (Background::Photo { url }, None) => {
            return Err(ExportError::PhotoLoad(format!("no image data for {url}")));
        }
        (Background::Silhouette, _) => RgbaImage::from_pixel(SURFACE_WIDTH, SURFACE_HEIGHT, Rgba(EXPORT_BACKGROUND_RGBA)),
    };
    let svg = overlay_svg(&Scene::still(markers, background), RenderMode::Export);
    let overlay = rasterize(&svg, SURFACE_WIDTH, SURFACE_HEIGHT)?;
    imageops::overlay(&mut canvas, &overlay, 0, 0);
    Ok(canvas)
}

/// Rasterize an SVG document drawn in logical units onto a transparent surface.
fn rasterize(svg: &str, width: u32, height: u32) -> Result<RgbaImage, ExportError> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fonts();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| ExportError::Surface(e.to_string()))?;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| ExportError::Surface(format!("cannot allocate {width}x{height} surface")))?;
    #[allow(clippy::cast_precision_loss)]
    let scale = EXPORT_SCALE as f32;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; image expects straight alpha.
    let mut out = RgbaImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}

/// System font database, loaded once per process for pin labels.
fn fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "loaded export fonts");
            Arc::new(db)
        })
        .clone()
}

/// Encode a composite as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode_png(image: RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(bytes)
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Produce the flattened PNG for the current markers and background.
///
/// # Errors
///
/// Returns [`ExportError::NothingToExport`] for an empty marker list before
/// touching the loader, or the first stage error otherwise.
pub async fn flatten(
    markers: &[Marker],
    background: &Background,
    loader: &dyn PhotoLoader,
) -> Result<Vec<u8>, ExportError> {
    if markers.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let photo = match background.photo_url() {
        Some(url) => Some(load_photo(loader, url).await?),
        None => None,
    };
    let composite = compose(markers, background, photo.as_ref())?;
    encode_png(composite)
}

async fn load_photo(loader: &dyn PhotoLoader, url: &str) -> Result<DynamicImage, ExportError> {
    debug!(url, "loading background photo");
    let bytes = loader.fetch_photo(url).await.map_err(|e| ExportError::PhotoLoad(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| ExportError::PhotoDecode(e.to_string()))
}

/// Flatten and hand the PNG to photo storage. Exactly one upload per success.
///
/// # Errors
///
/// Returns the terminal [`ExportError`] of whichever stage failed.
pub async fn export(
    pet_id: PetId,
    markers: &[Marker],
    background: &Background,
    loader: &dyn PhotoLoader,
    photos: &dyn PhotoService,
) -> Result<Photo, ExportError> {
    let result = run(pet_id, markers, background, loader, photos).await;
    match &result {
        Ok(photo) => info!(%pet_id, photo_id = %photo.id, markers = markers.len(), "health map exported"),
        Err(ExportError::NothingToExport) => debug!(%pet_id, "export skipped: no markers"),
        Err(e) => warn!(%pet_id, error = %e, "health map export failed"),
    }
    result
}

async fn run(
    pet_id: PetId,
    markers: &[Marker],
    background: &Background,
    loader: &dyn PhotoLoader,
    photos: &dyn PhotoService,
) -> Result<Photo, ExportError> {
    let png = flatten(markers, background, loader).await?;
    debug!(%pet_id, bytes = png.len(), "flattened health map");
    gateway::upload(photos, pet_id, png).await.map_err(ExportError::Upload)
}
