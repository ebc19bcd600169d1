use axum::{
    extract::{DefaultBodyLimit, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthAction, AuthResponse, LoginRequest, RawAuthRequest, RegisterRequest,
            RegisteredUser, UserProfile, VerifyRequest, VerifyResponse,
        },
        gate::{authorize_login, authorize_registration},
        jwt::Identity,
        password::hash_password,
        repo_types::NewUser,
    },
    error::ApiError,
    http::{parse_json_body, preflight, MAX_BODY_BYTES},
    state::{AppState, Services},
};

const ALLOWED_METHODS: &str = "POST, OPTIONS";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", any(auth_endpoint))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[instrument(skip(state, body))]
pub async fn auth_endpoint(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight(ALLOWED_METHODS);
    }
    dispatch(&state, &method, &body)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

async fn dispatch(state: &AppState, method: &Method, body: &[u8]) -> Result<Response, ApiError> {
    if *method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }
    let services = state.services()?;
    let raw: RawAuthRequest = parse_json_body(body)?;
    let now = OffsetDateTime::now_utc();

    match AuthAction::try_from(raw)? {
        AuthAction::Register(req) => register(services, req, now).await,
        AuthAction::Login(req) => login(services, req, now).await,
        AuthAction::Verify(req) => verify(services, req, now).await,
    }
}

async fn register(
    services: &Services,
    req: RegisterRequest,
    now: OffsetDateTime,
) -> Result<Response, ApiError> {
    let mut session = services.store.session().await?;
    authorize_registration(&mut *session, &req.email).await?;

    let password_hash = hash_password(&req.password)?;
    let user = session
        .create_user(NewUser {
            email: req.email,
            password_hash,
            full_name: req.full_name,
        })
        .await?;
    drop(session);

    let token = services.keys.issue_token(&Identity::from(&user), now)?;
    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        token,
        user: RegisteredUser::from(&user),
    })
    .into_response())
}

async fn login(
    services: &Services,
    req: LoginRequest,
    now: OffsetDateTime,
) -> Result<Response, ApiError> {
    let user = {
        let mut session = services.store.session().await?;
        session.find_user_by_email(&req.email).await?
    };

    let identity = authorize_login(user.as_ref(), &req.password)?;
    let token = services.keys.issue_token(&identity, now)?;
    // authorize_login only passes for a present record
    let profile = user
        .as_ref()
        .map(UserProfile::from)
        .ok_or(ApiError::InvalidCredentials)?;

    info!(user_id = identity.user_id, email = %identity.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: profile,
    })
    .into_response())
}

async fn verify(
    services: &Services,
    req: VerifyRequest,
    now: OffsetDateTime,
) -> Result<Response, ApiError> {
    let claims = services.keys.verify_token(&req.token, now).map_err(|e| {
        warn!(error = %e, "verify rejected token");
        ApiError::from(e)
    })?;

    let mut session = services.store.session().await?;
    let Some(user) = session.find_active_user(claims.user_id).await? else {
        warn!(user_id = claims.user_id, "token for missing or inactive user");
        return Err(ApiError::TokenInvalid);
    };

    Ok(Json(VerifyResponse {
        valid: true,
        user: UserProfile::from(&user),
    })
    .into_response())
}
