use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One stored recording. Immutable after insert; there is no update or
/// delete path.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recording")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Storage-relative name of the audio blob. One blob per row.
    #[sea_orm(unique)]
    pub blob_ref: String,

    /// Latitude in decimal degrees, range-checked before insert.
    pub lat: f64,

    /// Longitude in decimal degrees, range-checked before insert.
    pub lng: f64,

    /// MIME type of the audio, from the upload allow-list.
    pub content_type: String,

    /// Blob size in bytes. Denormalized from the store so list and
    /// search responses need no blob access.
    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
