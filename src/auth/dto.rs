use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{Role, User};
use crate::error::ApiError;

/// Body of a POST to the auth endpoint before it is checked.
#[derive(Debug, Default, Deserialize)]
pub struct RawAuthRequest {
    pub action: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug)]
pub enum AuthAction {
    Register(RegisterRequest),
    Login(LoginRequest),
    Verify(VerifyRequest),
}

// Empty strings are as good as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<RawAuthRequest> for AuthAction {
    type Error = ApiError;

    fn try_from(raw: RawAuthRequest) -> Result<Self, Self::Error> {
        match raw.action.as_deref() {
            Some("register") => {
                match (present(raw.email), present(raw.password), present(raw.full_name)) {
                    (Some(email), Some(password), Some(full_name)) => {
                        Ok(AuthAction::Register(RegisterRequest {
                            email,
                            password,
                            full_name,
                        }))
                    }
                    _ => Err(ApiError::validation("Email, password and full_name required")),
                }
            }
            Some("login") => match (present(raw.email), present(raw.password)) {
                (Some(email), Some(password)) => {
                    Ok(AuthAction::Login(LoginRequest { email, password }))
                }
                _ => Err(ApiError::validation("Email and password required")),
            },
            Some("verify") => present(raw.token)
                .map(|token| AuthAction::Verify(VerifyRequest { token }))
                .ok_or_else(|| ApiError::validation("Token required")),
            _ => Err(ApiError::validation("Invalid action")),
        }
    }
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse<U> {
    pub token: String,
    pub user: U,
}

/// What registration hands back about the new account.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for RegisteredUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            full_name: u.full_name.clone(),
            role: u.role,
        }
    }
}

/// Full public profile, used by login and verify.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            full_name: u.full_name.clone(),
            phone: u.phone.clone(),
            position: u.position.clone(),
            department: u.department.clone(),
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserProfile,
}
