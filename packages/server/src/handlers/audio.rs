use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::{AudioFormat, BlobRef};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{blob_ref}",
    tag = "Audio",
    operation_id = "serveAudio",
    summary = "Stream a stored audio blob",
    description = "Streams previously uploaded audio. The content type is derived from the \
        file extension; `audio/webm` is set explicitly rather than left to generic extension \
        lookup.",
    params(("blob_ref" = String, Path, description = "Blob reference from a recording's `url`")),
    responses(
        (status = 200, description = "Audio content"),
        (status = 404, description = "Unknown blob reference", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_audio(
    State(state): State<AppState>,
    Path(blob_ref): Path<String>,
) -> Result<Response, AppError> {
    // Anything that is not a name the store could have issued is a 404,
    // not a validation error; this also swallows traversal attempts.
    let blob_ref =
        BlobRef::parse(&blob_ref).map_err(|_| AppError::NotFound("Audio file not found".into()))?;

    let size = state.blobs.size(&blob_ref).await?;
    let reader = state.blobs.resolve(&blob_ref).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = blob_ref
        .extension()
        .and_then(AudioFormat::from_extension)
        .map(AudioFormat::mime)
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        // Blobs are immutable once written.
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(body)
        .map_err(|e| AppError::internal("Internal server error", format!("response build failed: {e}")))?;

    Ok(response)
}
