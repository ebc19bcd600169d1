use crate::auth::gate::authorize_resource_access;
use crate::auth::jwt::Claims;
use crate::documents::dto::UploadRequest;
use crate::documents::repo_types::{Document, ListScope, NewDocument};
use crate::error::ApiError;

const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

/// Narrows a listing request to what the caller may see. Non-admins always
/// get their own documents; the requested owner is only honoured when the
/// gate lets the caller act on that owner.
pub fn list_scope(claims: &Claims, requested_owner: Option<i64>) -> ListScope {
    match requested_owner {
        Some(owner) if authorize_resource_access(claims, owner) => ListScope::Owner(owner),
        None if claims.role.is_admin() => ListScope::All,
        _ => ListScope::Owner(claims.user_id),
    }
}

/// Drops any row the caller may not act on. For an admin listing everything
/// this keeps every row; for an owner scope it keeps their own.
pub fn visible_documents(claims: &Claims, documents: Vec<Document>) -> Vec<Document> {
    documents
        .into_iter()
        .filter(|d| authorize_resource_access(claims, d.user_id))
        .collect()
}

/// Validates an upload and turns it into an insert for the caller.
pub fn new_document(claims: &Claims, req: UploadRequest) -> Result<NewDocument, ApiError> {
    let (Some(file_name), Some(file_data)) = (
        req.file_name.filter(|v| !v.is_empty()),
        req.file_data.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::validation("file_name and file_data required"));
    };

    let file_type = req
        .file_type
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string());

    Ok(NewDocument {
        user_id: claims.user_id,
        file_name,
        file_size: file_data.len() as i64,
        file_url: format!("data:{file_type};base64,{file_data}"),
        file_type,
        description: req.description.unwrap_or_default(),
    })
}
