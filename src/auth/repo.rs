use async_trait::async_trait;
use thiserror::Error;

use crate::auth::repo_types::{NewUser, User};
use crate::error::ApiError;
use crate::store::PgSession;

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("email already registered")]
    Duplicate,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<CreateUserError> for ApiError {
    fn from(e: CreateUserError) -> Self {
        match e {
            CreateUserError::Duplicate => ApiError::Duplicate,
            CreateUserError::Store(e) => ApiError::from(e),
        }
    }
}

/// Credential store adapter.
#[async_trait]
pub trait UserRepo: Send {
    async fn find_user_by_email(&mut self, email: &str) -> anyhow::Result<Option<User>>;

    /// Only returns the user while `is_active` is true.
    async fn find_active_user(&mut self, id: i64) -> anyhow::Result<Option<User>>;

    /// A unique-constraint violation on email surfaces as [`CreateUserError::Duplicate`].
    async fn create_user(&mut self, new_user: NewUser) -> Result<User, CreateUserError>;
}

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, phone, position, department, role, is_active";

#[async_trait]
impl UserRepo for PgSession {
    async fn find_user_by_email(&mut self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.conn())
        .await?;
        Ok(user)
    }

    async fn find_active_user(&mut self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(self.conn())
        .await?;
        Ok(user)
    }

    async fn create_user(&mut self, new_user: NewUser) -> Result<User, CreateUserError> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, role)
            VALUES ($1, $2, $3, 'user')
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .fetch_one(self.conn())
        .await;

        match inserted {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CreateUserError::Duplicate)
            }
            Err(e) => Err(CreateUserError::Store(e.into())),
        }
    }
}
