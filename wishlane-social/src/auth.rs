use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::{
    util::random_string, Database, DatabaseError, NewSession, NewUser, SessionData, SocialContext,
    UserData,
};

/// Resolves bearer credentials to users and manages account creation.
pub struct Auth<Db> {
    context: SocialContext<Db>,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewRegistration {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;

    pub fn new(context: &SocialContext<Db>) -> Self {
        Self {
            context: context.clone(),
            argon: Argon2::default(),
        }
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        self.clear_expired().await?;

        let user = self
            .context
            .database
            .user_by_email(&credentials.email)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => AuthError::InvalidCredentials,
                err => AuthError::Db(err),
            })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        self.create_session(user.id).await
    }

    /// Deletes the associated session, if it exists
    pub async fn logout(&self, token: &str) -> Result<(), DatabaseError> {
        self.context.database.delete_session_by_token(token).await
    }

    /// Creates a regular account
    pub async fn register(&self, new_user: NewRegistration) -> Result<UserData, AuthError> {
        self.create_user(new_user, false).await
    }

    /// Creates a throwaway guest account with a synthetic email, already
    /// logged in. Guests may browse but not mutate social state.
    pub async fn register_guest(&self) -> Result<SessionData, AuthError> {
        let guest = self
            .create_user(
                NewRegistration {
                    email: format!("guest-{}@wishlane.local", random_string(12)),
                    password: random_string(32),
                    name: Some("Guest".to_string()),
                },
                true,
            )
            .await?;

        self.create_session(guest.id).await
    }

    /// Returns a session if it exists
    pub async fn session(&self, token: &str) -> Result<SessionData, DatabaseError> {
        self.context.database.session_by_token(token).await
    }

    async fn create_session(&self, user_id: crate::PrimaryKey) -> Result<SessionData, AuthError> {
        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64);

        let new_session = NewSession {
            token: random_string(32),
            user_id,
            expires_at,
        };

        self.context
            .database
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)
    }

    async fn create_user(
        &self,
        new_user: NewRegistration,
        is_guest: bool,
    ) -> Result<UserData, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.context
            .database
            .create_user(NewUser {
                email: new_user.email,
                password: hashed_password,
                name: new_user.name,
                is_guest,
                is_influencer: false,
            })
            .await
            .map_err(AuthError::Db)
    }

    async fn clear_expired(&self) -> Result<(), AuthError> {
        self.context
            .database
            .clear_expired_sessions()
            .await
            .map_err(AuthError::Db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDatabase, Social};

    fn registration(email: &str) -> NewRegistration {
        NewRegistration {
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
            name: Some("Test".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let social = Social::new(MemoryDatabase::new());

        let user = social
            .auth
            .register(registration("a@example.com"))
            .await
            .expect("registers");

        assert!(!user.is_guest);
        assert_ne!(user.password, "hunter2hunter2", "password is hashed");

        let session = social
            .auth
            .login(Credentials {
                email: "a@example.com".to_string(),
                password: "hunter2hunter2".to_string(),
            })
            .await
            .expect("logs in");

        assert_eq!(session.user.id, user.id);

        let resolved = social.auth.session(&session.token).await.expect("resolves");
        assert_eq!(resolved.user.id, user.id);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_fails() {
        let social = Social::new(MemoryDatabase::new());

        social
            .auth
            .register(registration("a@example.com"))
            .await
            .expect("registers");

        let result = social
            .auth
            .login(Credentials {
                email: "a@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let social = Social::new(MemoryDatabase::new());

        social
            .auth
            .register(registration("a@example.com"))
            .await
            .expect("registers");

        let result = social.auth.register(registration("a@example.com")).await;

        assert!(matches!(
            result,
            Err(AuthError::Db(DatabaseError::Conflict { .. }))
        ));
    }

    #[tokio::test]
    async fn test_guest_registration_is_logged_in_guest() {
        let social = Social::new(MemoryDatabase::new());

        let session = social.auth.register_guest().await.expect("creates guest");

        assert!(session.user.is_guest);
        assert!(session.user.email.starts_with("guest-"));
    }
}
