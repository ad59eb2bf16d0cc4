use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::NearbyRecording;
use crate::entity::recording;

/// Response DTO for a single recording.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordingResponse {
    /// Recording ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// Path the stored audio is served from.
    #[schema(example = "/uploads/01936f0e-1234-7abc-8000-000000000001.webm")]
    pub url: String,
    /// Latitude in decimal degrees.
    #[schema(example = 52.52)]
    pub lat: f64,
    /// Longitude in decimal degrees.
    #[schema(example = 13.405)]
    pub lng: f64,
    /// MIME type of the audio.
    #[schema(example = "audio/webm")]
    pub mimetype: String,
    /// Audio size in bytes.
    #[schema(example = 142857)]
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<recording::Model> for RecordingResponse {
    fn from(model: recording::Model) -> Self {
        Self {
            id: model.id.to_string(),
            url: format!("/uploads/{}", model.blob_ref),
            lat: model.lat,
            lng: model.lng,
            mimetype: model.content_type,
            size: model.size,
            created_at: model.created_at,
        }
    }
}

/// A proximity-search hit: the recording plus its distance from the
/// query center, nearest first.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRecordingResponse {
    #[serde(flatten)]
    pub recording: RecordingResponse,
    /// Great-circle distance from the query center, in kilometers.
    #[schema(example = 0.111)]
    pub distance: f64,
}

impl From<NearbyRecording> for NearbyRecordingResponse {
    fn from(hit: NearbyRecording) -> Self {
        Self {
            recording: RecordingResponse::from(hit.recording),
            distance: hit.distance_km,
        }
    }
}
