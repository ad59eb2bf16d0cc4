use std::sync::{LazyLock, Mutex};

use chrono::Utc;
use common::geo::{Coordinate, haversine_km};
use common::storage::BlobRef;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::{ContextV7, Timestamp, Uuid};

use crate::entity::recording;
use crate::error::AppError;

/// Search radius applied when the caller does not supply one: half a
/// kilometer, never the literal zero.
pub const DEFAULT_RADIUS_KM: f64 = 0.5;

/// Hard cap on the number of proximity-search results.
pub const MAX_SEARCH_RESULTS: usize = 100;

// Shared v7 context: ids stay strictly increasing even for rows created
// within the same timestamp tick, so `id` is a usable tie-break under
// `created_at` when ranking equidistant results.
static ID_CONTEXT: LazyLock<Mutex<ContextV7>> =
    LazyLock::new(|| Mutex::new(ContextV7::new()));

fn next_recording_id() -> Uuid {
    Uuid::new_v7(Timestamp::now(&*ID_CONTEXT))
}

/// A search hit: the recording plus its distance from the query center.
#[derive(Clone, Debug)]
pub struct NearbyRecording {
    pub recording: recording::Model,
    pub distance_km: f64,
}

/// System of record for recording metadata.
///
/// Owns rows only; audio bytes live in the blob store and are referenced
/// by `blob_ref`. Rows are written once and never updated, so create and
/// search calls need no coordination among themselves.
#[derive(Clone)]
pub struct RecordingCatalog {
    db: DatabaseConnection,
}

impl RecordingCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persist metadata for an already-stored blob.
    ///
    /// The caller must have committed the blob first, and must delete it
    /// again if this fails; the catalog performs no blob I/O.
    pub async fn create(
        &self,
        blob_ref: &BlobRef,
        coordinate: Coordinate,
        content_type: &str,
        size: u64,
    ) -> Result<recording::Model, AppError> {
        let id = next_recording_id();
        let model = recording::ActiveModel {
            id: Set(id),
            blob_ref: Set(blob_ref.as_str().to_string()),
            lat: Set(coordinate.lat()),
            lng: Set(coordinate.lng()),
            content_type: Set(content_type.to_string()),
            size: Set(i64::try_from(size).unwrap_or(i64::MAX)),
            created_at: Set(Utc::now()),
        };

        recording::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        recording::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::internal("Internal server error", "recording missing after insert"))
    }

    /// Rank stored recordings by great-circle distance from `center`.
    ///
    /// Full scan: every row's haversine distance is computed, rows with
    /// `distance < radius_km` (strictly) are kept, sorted nearest first
    /// with ties in insertion order, and capped at
    /// [`MAX_SEARCH_RESULTS`]. Fine for tens of thousands of rows; a
    /// spatial index is deliberately out of scope.
    pub async fn search(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<NearbyRecording>, AppError> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::Validation("Invalid radius".into()));
        }

        // `id` disambiguates rows sharing a `created_at` tick: v7 ids
        // from this process are strictly increasing.
        let rows = recording::Entity::find()
            .order_by_asc(recording::Column::CreatedAt)
            .order_by_asc(recording::Column::Id)
            .all(&self.db)
            .await?;

        let mut matches: Vec<NearbyRecording> = rows
            .into_iter()
            .filter_map(|row| {
                // Rows are range-checked on insert.
                let coordinate = Coordinate::new(row.lat, row.lng).ok()?;
                let distance_km = haversine_km(center, coordinate);
                (distance_km < radius_km).then_some(NearbyRecording {
                    recording: row,
                    distance_km,
                })
            })
            .collect();

        // Stable sort: equidistant recordings keep insertion order.
        matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        matches.truncate(MAX_SEARCH_RESULTS);

        Ok(matches)
    }
}
