//! Authorization decisions shared by both endpoints.
//!
//! Nothing here touches the network except [`authorize_registration`], which
//! asks the credential store whether the email is taken.

use tracing::warn;

use crate::auth::jwt::{Claims, Identity};
use crate::auth::password::{verify_password, DUMMY_HASH};
use crate::auth::repo::UserRepo;
use crate::auth::repo_types::User;
use crate::error::ApiError;

pub async fn authorize_registration<R>(repo: &mut R, email: &str) -> Result<(), ApiError>
where
    R: UserRepo + ?Sized,
{
    if repo.find_user_by_email(email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Duplicate);
    }
    Ok(())
}

/// Unknown user, inactive user and wrong password all fail with the same
/// [`ApiError::InvalidCredentials`]. A password hash is verified on every
/// path so the three cost the same.
pub fn authorize_login(user: Option<&User>, plaintext: &str) -> Result<Identity, ApiError> {
    let stored_hash = user.map_or(DUMMY_HASH, |u| u.password_hash.as_str());
    let password_ok = verify_password(plaintext, stored_hash);

    let Some(user) = user else {
        warn!("login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !user.is_active {
        warn!(user_id = user.id, "login for inactive account");
        return Err(ApiError::InvalidCredentials);
    }

    if !password_ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Identity::from(user))
}

/// The whole access-control model for documents: admins reach everything,
/// everyone else only what they own.
pub fn authorize_resource_access(claims: &Claims, resource_owner_id: i64) -> bool {
    claims.role.is_admin() || claims.user_id == resource_owner_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::repo_types::{NewUser, Role};
    use crate::store::memory::MemoryStore;

    fn claims(user_id: i64, role: Role) -> Claims {
        Claims {
            user_id,
            email: format!("u{user_id}@example.com"),
            role,
            expires_at: i64::MAX,
        }
    }

    fn user(active: bool) -> User {
        User {
            id: 7,
            email: "bob@example.com".into(),
            password_hash: hash_password("hunter22").unwrap(),
            full_name: "Bob".into(),
            phone: None,
            position: None,
            department: None,
            role: Role::User,
            is_active: active,
        }
    }

    #[test]
    fn resource_access_truth_table() {
        assert!(authorize_resource_access(&claims(1, Role::Admin), 1));
        assert!(authorize_resource_access(&claims(1, Role::Admin), 99));
        assert!(authorize_resource_access(&claims(5, Role::User), 5));
        assert!(!authorize_resource_access(&claims(5, Role::User), 6));
    }

    #[test]
    fn login_succeeds_with_live_record() {
        let identity = authorize_login(Some(&user(true)), "hunter22").expect("login");
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.email, "bob@example.com");
        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn login_failures_are_indistinguishable() {
        let inactive = user(false);
        let active = user(true);
        let failures = [
            authorize_login(None, "hunter22").unwrap_err(),
            authorize_login(Some(&active), "wrong").unwrap_err(),
            authorize_login(Some(&inactive), "hunter22").unwrap_err(),
        ];
        for err in failures {
            assert!(matches!(err, ApiError::InvalidCredentials));
            assert_eq!(err.to_string(), "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn registration_rejects_taken_email() {
        let store = MemoryStore::default();
        let mut session = store.clone();
        authorize_registration(&mut session, "carol@example.com")
            .await
            .expect("free email");

        session
            .create_user(NewUser {
                email: "carol@example.com".into(),
                password_hash: hash_password("pw").unwrap(),
                full_name: "Carol".into(),
            })
            .await
            .unwrap();

        let err = authorize_registration(&mut session, "carol@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Duplicate));

        // Stored emails are case-sensitive.
        authorize_registration(&mut session, "Carol@example.com")
            .await
            .expect("different case is a different email");
    }
}
