use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::documents::repo_types::Document;

/// POST body for an upload; `file_data` is already encoded by the client.
#[derive(Debug, Default, Deserialize)]
pub struct UploadRequest {
    pub file_name: Option<String>,
    pub file_data: Option<String>,
    pub file_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentList {
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
pub struct UploadedDocument {
    pub id: i64,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

impl From<&Document> for UploadedDocument {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            file_name: d.file_name.clone(),
            file_size: d.file_size,
            file_type: d.file_type.clone(),
            uploaded_at: d.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document: UploadedDocument,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
