//! In-memory service doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::gateway::{GatewayError, MarkerService, Photo, PhotoLoader, PhotoService, SaveResponse, UploadResponse};
use crate::marker::{Marker, MarkerId, PetId};

/// One call observed by a mock service.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(PetId),
    Save(PetId, Marker),
    Delete(PetId, MarkerId),
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marker service that replays scripted replies and records every call.
///
/// With no script left, saves and deletes succeed.
#[derive(Default)]
pub struct MockMarkers {
    pub stored: Mutex<Vec<Marker>>,
    pub replies: Mutex<VecDeque<Result<SaveResponse, GatewayError>>>,
    pub calls: Mutex<Vec<Call>>,
}

impl MockMarkers {
    pub fn with_stored(markers: Vec<Marker>) -> Self {
        Self { stored: Mutex::new(markers), ..Self::default() }
    }

    pub fn script(&self, reply: Result<SaveResponse, GatewayError>) {
        lock(&self.replies).push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    fn next_reply(&self) -> Result<SaveResponse, GatewayError> {
        lock(&self.replies).pop_front().unwrap_or(Ok(SaveResponse { success: true }))
    }
}

#[async_trait::async_trait]
impl MarkerService for MockMarkers {
    async fn load_markers(&self, pet_id: PetId) -> Result<Vec<Marker>, GatewayError> {
        lock(&self.calls).push(Call::Load(pet_id));
        Ok(lock(&self.stored).clone())
    }

    async fn save_marker(&self, pet_id: PetId, marker: &Marker) -> Result<SaveResponse, GatewayError> {
        lock(&self.calls).push(Call::Save(pet_id, marker.clone()));
        self.next_reply()
    }

    async fn delete_marker(&self, pet_id: PetId, marker_id: MarkerId) -> Result<SaveResponse, GatewayError> {
        lock(&self.calls).push(Call::Delete(pet_id, marker_id));
        self.next_reply()
    }
}

/// Photo service that records uploads and answers with a fixed reply.
pub struct MockPhotos {
    pub reply: Mutex<Result<UploadResponse, GatewayError>>,
    pub uploads: Mutex<Vec<(PetId, Vec<u8>)>>,
}

impl Default for MockPhotos {
    fn default() -> Self {
        Self::replying(Ok(UploadResponse { success: true, photo: Some(stored_photo()) }))
    }
}

impl MockPhotos {
    pub fn replying(reply: Result<UploadResponse, GatewayError>) -> Self {
        Self { reply: Mutex::new(reply), uploads: Mutex::new(Vec::new()) }
    }

    pub fn upload_count(&self) -> usize {
        lock(&self.uploads).len()
    }

    pub fn last_upload(&self) -> Option<Vec<u8>> {
        lock(&self.uploads).last().map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait::async_trait]
impl PhotoService for MockPhotos {
    async fn upload_photo(&self, pet_id: PetId, image: Vec<u8>) -> Result<UploadResponse, GatewayError> {
        lock(&self.uploads).push((pet_id, image));
        lock(&self.reply).clone()
    }
}

/// Photo loader that serves fixed bytes and records requested URLs.
#[derive(Default)]
pub struct MockLoader {
    pub bytes: Option<Vec<u8>>,
    pub fetched: Mutex<Vec<String>>,
}

impl MockLoader {
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes), fetched: Mutex::new(Vec::new()) }
    }

    pub fn fetch_count(&self) -> usize {
        lock(&self.fetched).len()
    }
}

#[async_trait::async_trait]
impl PhotoLoader for MockLoader {
    async fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        lock(&self.fetched).push(url.to_owned());
        self.bytes.clone().ok_or_else(|| GatewayError::Status { status: 404, body: String::new() })
    }
}

pub fn stored_photo() -> Photo {
    Photo { id: "photo-1".into(), url: "https://photos.test/p/photo-1.png".into(), created_at: 1_700_000_000_000 }
}

/// Encode a solid-color PNG of the given size.
pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Vec::new();
    let encoded = image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png);
    assert!(encoded.is_ok(), "png encode failed");
    bytes
}
