use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Marker written into `description` when a document is soft-deleted.
pub const DELETED_MARKER: &str = "Deleted";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_size: i64,     // length of the encoded payload
    pub file_type: String,
    pub file_url: String,   // inline data URL, empty once deleted
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    /// Owner's full name, joined in on listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub file_url: String,
    pub description: String,
}

/// Which documents a listing covers, already narrowed by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Owner(i64),
}
