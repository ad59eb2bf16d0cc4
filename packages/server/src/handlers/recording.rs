use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use common::geo::Coordinate;
use common::storage::{AudioFormat, BlobRef, BlobStore, BoxReader, StoredBlob};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use crate::catalog::DEFAULT_RADIUS_KM;
use crate::error::{AppError, ErrorBody};
use crate::models::recording::{NearbyRecordingResponse, RecordingResponse};
use crate::state::AppState;

pub fn upload_body_limit() -> DefaultBodyLimit {
    // Blob cap plus headroom for multipart framing and the coordinate
    // fields; the 10 MiB payload cap itself is enforced by the store.
    DefaultBodyLimit::max(11 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Recordings",
    operation_id = "uploadRecording",
    summary = "Upload a geo-tagged audio recording",
    description = "Multipart form with an `audio` file (audio/mpeg, audio/wav or audio/webm, \
        max 10 MiB) and `lat`/`lng` fields in decimal degrees. The audio blob and its metadata \
        are committed together: if anything fails after the blob is written, the blob is \
        deleted again before the error is returned.",
    request_body(content_type = "multipart/form-data", description = "Audio file plus coordinates"),
    responses(
        (status = 201, description = "Recording created", body = RecordingResponse),
        (status = 400, description = "Missing audio, missing/invalid coordinates, or unsupported audio type", body = ErrorBody),
        (status = 413, description = "Payload exceeds the size cap", body = ErrorBody),
        (status = 500, description = "Failed to save recording", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_recording(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // Internal failures anywhere in the upload pipeline report the
    // endpoint's wording; validation errors keep their own messages.
    let mut form = read_upload_form(&mut multipart, &*state.blobs)
        .await
        .map_err(|e| e.public_message("Failed to save recording"))?;

    let Some(audio) = form.audio.take() else {
        return Err(AppError::Validation("No audio file uploaded".into()));
    };

    // From here on a blob is committed; every failure path must delete
    // it again, or the store and the catalog drift apart.
    let coordinate = match form.coordinate() {
        Ok(coordinate) => coordinate,
        Err(e) => {
            discard_blob(&*state.blobs, &audio.blob.blob_ref).await;
            return Err(e);
        }
    };

    let created = state
        .catalog
        .create(
            &audio.blob.blob_ref,
            coordinate,
            audio.format.mime(),
            audio.blob.size,
        )
        .await;

    match created {
        Ok(recording) => Ok((StatusCode::CREATED, Json(RecordingResponse::from(recording)))),
        Err(e) => {
            discard_blob(&*state.blobs, &audio.blob.blob_ref).await;
            Err(e.public_message("Failed to save recording"))
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Latitude of the search center, decimal degrees. Required.
    lat: Option<String>,
    /// Longitude of the search center, decimal degrees. Required.
    lng: Option<String>,
    /// Search radius in kilometers. Defaults to 0.5.
    radius: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Recordings",
    operation_id = "searchRecordings",
    summary = "Find recordings near a point",
    description = "Returns recordings within `radius` kilometers of (`lat`, `lng`), nearest \
        first, capped at 100 results. Each item carries its distance from the center in \
        kilometers.",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching recordings, nearest first", body = [NearbyRecordingResponse]),
        (status = 400, description = "Missing/invalid coordinates or invalid radius", body = ErrorBody),
        (status = 500, description = "Failed to fetch recordings", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn search_recordings(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<NearbyRecordingResponse>>, AppError> {
    let (Some(lat), Some(lng)) = (parse_degrees(&query.lat), parse_degrees(&query.lng)) else {
        return Err(AppError::Validation("Missing coordinates".into()));
    };
    let center = Coordinate::new(lat, lng)?;

    let radius_km = match &query.radius {
        None => DEFAULT_RADIUS_KM,
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::Validation("Invalid radius".into()))?,
    };

    let matches = state
        .catalog
        .search(center, radius_km)
        .await
        .map_err(|e| e.public_message("Failed to fetch recordings"))?;

    Ok(Json(
        matches.into_iter().map(NearbyRecordingResponse::from).collect(),
    ))
}

fn parse_degrees(raw: &Option<String>) -> Option<f64> {
    raw.as_deref().and_then(|s| s.trim().parse::<f64>().ok())
}

/// The stored audio part of an upload form.
struct UploadedAudio {
    blob: StoredBlob,
    format: AudioFormat,
}

#[derive(Default)]
struct UploadForm {
    audio: Option<UploadedAudio>,
    lat: Option<String>,
    lng: Option<String>,
}

impl UploadForm {
    /// Missing or unparseable fields and out-of-range values are all
    /// validation failures; the caller handles blob cleanup.
    fn coordinate(&self) -> Result<Coordinate, AppError> {
        let (Some(lat), Some(lng)) = (parse_degrees(&self.lat), parse_degrees(&self.lng)) else {
            return Err(AppError::Validation("Missing coordinates".into()));
        };
        Ok(Coordinate::new(lat, lng)?)
    }
}

/// Read the multipart upload form, storing the audio field as it streams
/// past. If a later field fails after the blob was committed, the blob
/// is deleted before the error is returned.
async fn read_upload_form(
    multipart: &mut Multipart,
    blobs: &dyn BlobStore,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    if let Err(e) = read_fields(multipart, blobs, &mut form).await {
        if let Some(audio) = form.audio.take() {
            discard_blob(blobs, &audio.blob.blob_ref).await;
        }
        return Err(e);
    }

    Ok(form)
}

async fn read_fields(
    multipart: &mut Multipart,
    blobs: &dyn BlobStore,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("audio") if form.audio.is_none() => {
                let declared = field
                    .content_type()
                    .map(|m| m.to_string())
                    .or_else(|| {
                        field
                            .file_name()
                            .and_then(|name| mime_guess::from_path(name).first())
                            .map(|m| m.to_string())
                    })
                    .ok_or_else(|| {
                        AppError::Validation("No audio file uploaded".into())
                    })?;

                // Reject disallowed types before a single byte is spooled.
                let format = AudioFormat::from_mime(&declared).ok_or_else(|| {
                    AppError::Validation(format!("Unsupported audio content type: {declared}"))
                })?;

                let blob = store_field(field, blobs, &declared).await?;
                form.audio = Some(UploadedAudio { blob, format });
            }
            Some("lat") => {
                form.lat = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read lat: {e}"))
                })?);
            }
            Some("lng") => {
                form.lng = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read lng: {e}"))
                })?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(())
}

/// Stream a multipart field to blob storage via a temp file.
///
/// A disconnect mid-upload surfaces as a read error here, so a truncated
/// payload is never committed to the store.
async fn store_field(
    mut field: axum::extract::multipart::Field<'_>,
    blobs: &dyn BlobStore,
    declared_content_type: &str,
) -> Result<StoredBlob, AppError> {
    let temp_path = std::env::temp_dir().join(format!("soundmap-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::internal("Internal server error", format!("temp file create failed: {e}")))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::internal("Internal server error", format!("temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::internal("Internal server error", format!("temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::internal("Internal server error", format!("temp file reopen failed: {e}")))?;
        let reader: BoxReader = Box::new(file);

        Ok(blobs.store(reader, declared_content_type).await?)
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}

/// Compensating delete for a blob whose metadata write failed.
///
/// A failed delete is logged and swallowed: the response is determined
/// by the original error, not by the cleanup.
pub(crate) async fn discard_blob(blobs: &dyn BlobStore, blob_ref: &BlobRef) {
    match blobs.delete(blob_ref).await {
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to delete orphaned blob {blob_ref}: {e}"),
    }
}
