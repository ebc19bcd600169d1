use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AuthToken, gate::authorize_resource_access, jwt::Claims},
    documents::{
        dto::{DeleteResponse, DocumentList, UploadRequest, UploadResponse, UploadedDocument},
        services::{list_scope, new_document, visible_documents},
    },
    error::ApiError,
    http::{parse_id, parse_json_body, preflight, MAX_BODY_BYTES},
    state::{AppState, Services},
};

const ALLOWED_METHODS: &str = "GET, POST, DELETE, OPTIONS";

pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/documents", any(documents_endpoint))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[instrument(skip(state, token, params, body))]
pub async fn documents_endpoint(
    State(state): State<AppState>,
    method: Method,
    token: AuthToken,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight(ALLOWED_METHODS);
    }
    dispatch(&state, &method, &token, &params, &body)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

async fn dispatch(
    state: &AppState,
    method: &Method,
    token: &AuthToken,
    params: &HashMap<String, String>,
    body: &[u8],
) -> Result<Response, ApiError> {
    let services = state.services()?;
    let claims = token.verify(&services.keys, OffsetDateTime::now_utc())?;

    match method {
        &Method::GET => list_documents(services, &claims, params).await,
        &Method::POST => upload_document(services, &claims, body).await,
        &Method::DELETE => delete_document(services, &claims, params).await,
        _ => Err(ApiError::MethodNotAllowed),
    }
}

async fn list_documents(
    services: &Services,
    claims: &Claims,
    params: &HashMap<String, String>,
) -> Result<Response, ApiError> {
    // Only admins may pick an owner; everyone else's query is ignored.
    let requested = if claims.role.is_admin() {
        parse_id(params.get("user_id"), "user_id")?
    } else {
        None
    };
    let scope = list_scope(claims, requested);

    let mut session = services.store.session().await?;
    let documents = visible_documents(claims, session.list_documents(scope).await?);
    info!(user_id = claims.user_id, ?scope, count = documents.len(), "documents listed");
    Ok(Json(DocumentList { documents }).into_response())
}

async fn upload_document(
    services: &Services,
    claims: &Claims,
    body: &[u8],
) -> Result<Response, ApiError> {
    let req: UploadRequest = parse_json_body(body)?;
    let new_doc = new_document(claims, req)?;

    let mut session = services.store.session().await?;
    let doc = session.insert_document(new_doc).await?;
    info!(user_id = claims.user_id, document_id = doc.id, file_size = doc.file_size, "document uploaded");
    Ok(Json(UploadResponse {
        document: UploadedDocument::from(&doc),
    })
    .into_response())
}

async fn delete_document(
    services: &Services,
    claims: &Claims,
    params: &HashMap<String, String>,
) -> Result<Response, ApiError> {
    let Some(id) = parse_id(params.get("id"), "id")? else {
        return Err(ApiError::validation("Document id required"));
    };

    let mut session = services.store.session().await?;
    // Someone else's document looks exactly like a missing one.
    let Some(doc) = session
        .find_document(id)
        .await?
        .filter(|d| authorize_resource_access(claims, d.user_id))
    else {
        warn!(user_id = claims.user_id, document_id = id, "delete of missing or foreign document");
        return Err(ApiError::NotFound("Document not found".into()));
    };

    session.soft_delete_document(doc.id).await?;
    info!(user_id = claims.user_id, document_id = doc.id, owner_id = doc.user_id, "document deleted");
    Ok(Json(DeleteResponse { success: true }).into_response())
}
