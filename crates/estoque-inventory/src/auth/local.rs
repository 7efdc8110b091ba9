//! # Local Session Provider
//!
//! Email/password accounts stored in the local SQLite database, with
//! sessions carried as signed access tokens.
//!
//! ## Sign-in Flow
//! ```text
//! sign_in(email, password)
//!   │
//!   ├── users.get_by_email ── None ──────────────► InvalidCredentials
//!   ├── argon2 verify ─────── mismatch ──────────► InvalidCredentials
//!   ├── confirmed? ────────── no ────────────────► EmailNotConfirmed
//!   │
//!   ├── JwtManager::generate_access_token
//!   ├── current = Some(session)
//!   └── broadcast SessionEvent::SignedIn(session)
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use chrono::Utc;
use estoque_core::StoreError;
use estoque_db::{Database, DbError, UserRecord};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::token::JwtManager;
use super::{Session, SessionEvent, SessionProvider, SignUpOutcome};
use crate::error::{AuthError, AuthResult};

const EVENT_CAPACITY: usize = 16;

pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// False for a mismatch and for a hash that does not parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn store_err(err: DbError) -> AuthError {
    AuthError::Store(StoreError::from(err))
}

pub struct LocalSessionProvider {
    db: Database,
    jwt: JwtManager,
    require_confirmation: bool,
    current: watch::Sender<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for LocalSessionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSessionProvider")
            .field("require_confirmation", &self.require_confirmation)
            .field("signed_in", &self.current.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl LocalSessionProvider {
    pub fn new(db: Database, jwt: JwtManager, require_confirmation: bool) -> Self {
        let (current, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        LocalSessionProvider {
            db,
            jwt,
            require_confirmation,
            current,
            events,
        }
    }

    /// Confirms a pending account so it can sign in.
    pub async fn confirm_user(&self, user_id: &str) -> AuthResult<()> {
        self.db.users().confirm(user_id).await.map_err(store_err)?;
        info!(user_id = %user_id, "Account confirmed");
        Ok(())
    }

    /// Issues a fresh token for the current session.
    ///
    /// Returns `Ok(None)` when nobody is signed in.
    pub async fn refresh_session(&self) -> AuthResult<Option<Session>> {
        let Some(current) = self.current.borrow().clone() else {
            return Ok(None);
        };

        let session = self.issue(&current.user_id, &current.email)?;
        self.current.send_replace(Some(session.clone()));
        let _ = self.events.send(SessionEvent::TokenRefreshed(session.clone()));
        debug!(user_id = %session.user_id, "Session token refreshed");
        Ok(Some(session))
    }

    /// Restores a session from a previously issued token.
    pub async fn resume(&self, token: &str) -> AuthResult<Session> {
        let claims = self.jwt.validate_access_token(token)?;

        let user = self
            .db
            .users()
            .get_by_id(&claims.sub)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AuthError::InvalidToken("unknown user".to_string()))?;

        let session = Session {
            user_id: user.id,
            email: user.email,
            access_token: token.to_string(),
            expires_at: claims.expires_at(),
        };
        self.start(session.clone());
        Ok(session)
    }

    fn issue(&self, user_id: &str, email: &str) -> AuthResult<Session> {
        let (access_token, expires_at) = self.jwt.generate_access_token(user_id, email)?;
        Ok(Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            access_token,
            expires_at,
        })
    }

    fn start(&self, session: Session) {
        self.current.send_replace(Some(session.clone()));
        let _ = self.events.send(SessionEvent::SignedIn(session));
    }

    fn end(&self) {
        if self.current.send_replace(None).is_some() {
            let _ = self.events.send(SessionEvent::SignedOut);
        }
    }

    async fn find_user(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        self.db.users().get_by_email(email).await.map_err(store_err)
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn current_session(&self) -> AuthResult<Option<Session>> {
        let current = self.current.borrow().clone();
        match current {
            Some(session) if session.expires_at <= Utc::now() => {
                debug!(user_id = %session.user_id, "Session expired");
                self.end();
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let Some(user) = self.find_user(email).await? else {
            debug!("Sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.confirmed {
            return Err(AuthError::EmailNotConfirmed);
        }

        let session = self.issue(&user.id, &user.email)?;
        self.start(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AuthResult<SignUpOutcome> {
        if self.find_user(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hash = hash_password(password)?;
        let confirmed = !self.require_confirmation;

        let (user, _profile) = self
            .db
            .users()
            .create(email, &hash, Some(full_name), confirmed)
            .await
            .map_err(|err| match err {
                DbError::UniqueViolation { .. } => AuthError::EmailTaken,
                other => store_err(other),
            })?;

        info!(user_id = %user.id, confirmed, "Account created");

        if !confirmed {
            return Ok(SignUpOutcome::ConfirmationRequired {
                user_id: user.id,
                email: user.email,
            });
        }

        let session = self.issue(&user.id, &user.email)?;
        self.start(session.clone());
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.end();
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estoque_db::DbConfig;

    async fn provider(require_confirmation: bool) -> LocalSessionProvider {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LocalSessionProvider::new(db, JwtManager::new("test-secret", 3600), require_confirmation)
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("segredo1").unwrap();
        assert!(verify_password("segredo1", &hash));
        assert!(!verify_password("segredo2", &hash));
        assert!(!verify_password("segredo1", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = provider(false).await;
        let mut events = provider.subscribe();

        let outcome = provider
            .sign_up("ana@empresa.com", "segredo1", "Ana Lima")
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(_)));
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn(_)));

        provider.sign_out().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
        assert!(provider.current_session().await.unwrap().is_none());

        let session = provider.sign_in("ANA@empresa.com", "segredo1").await.unwrap();
        assert_eq!(session.email, "ana@empresa.com");
        assert_eq!(provider.current_session().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_say_which() {
        let provider = provider(false).await;
        provider
            .sign_up("ana@empresa.com", "segredo1", "Ana Lima")
            .await
            .unwrap();

        assert_eq!(
            provider.sign_in("ana@empresa.com", "errada99").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            provider.sign_in("bia@empresa.com", "segredo1").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_duplicate_sign_up_is_email_taken() {
        let provider = provider(false).await;
        provider
            .sign_up("ana@empresa.com", "segredo1", "Ana Lima")
            .await
            .unwrap();
        assert_eq!(
            provider.sign_up("Ana@Empresa.com", "segredo1", "Outra Ana").await,
            Err(AuthError::EmailTaken)
        );
    }

    #[tokio::test]
    async fn test_confirmation_required() {
        let provider = provider(true).await;
        let SignUpOutcome::ConfirmationRequired { user_id, .. } = provider
            .sign_up("ana@empresa.com", "segredo1", "Ana Lima")
            .await
            .unwrap()
        else {
            panic!("expected confirmation to be required");
        };

        assert_eq!(
            provider.sign_in("ana@empresa.com", "segredo1").await,
            Err(AuthError::EmailNotConfirmed)
        );

        provider.confirm_user(&user_id).await.unwrap();
        assert!(provider.sign_in("ana@empresa.com", "segredo1").await.is_ok());
    }

    #[tokio::test]
    async fn test_resume_and_refresh() {
        let provider = provider(false).await;
        let SignUpOutcome::SignedIn(session) = provider
            .sign_up("ana@empresa.com", "segredo1", "Ana Lima")
            .await
            .unwrap()
        else {
            panic!("expected a session");
        };
        provider.sign_out().await.unwrap();

        let resumed = provider.resume(&session.access_token).await.unwrap();
        assert_eq!(resumed.user_id, session.user_id);

        let refreshed = provider.refresh_session().await.unwrap().unwrap();
        assert_eq!(refreshed.user_id, session.user_id);
        assert_ne!(refreshed.access_token, session.access_token);

        assert!(matches!(
            provider.resume("garbage").await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let provider = LocalSessionProvider::new(db, JwtManager::new("s", -10), false);
        provider
            .sign_up("ana@empresa.com", "segredo1", "Ana Lima")
            .await
            .unwrap();

        assert!(provider.current_session().await.unwrap().is_none());
    }
}
