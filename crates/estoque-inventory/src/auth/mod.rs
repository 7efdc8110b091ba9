//! # Auth Context
//!
//! Tracks who is signed in and which profile (role) they have.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionProvider                                                        │
//! │     │ broadcast::Sender<SessionEvent>                                  │
//! │     │   SignedIn(session) | TokenRefreshed(session) | SignedOut        │
//! │     ▼                                                                   │
//! │  AuthContext::pump ──► apply(event)   (one receiver, in order)         │
//! │                                     │                                   │
//! │                                     ├── SignedIn/TokenRefreshed:        │
//! │                                     │     session = Some(s)             │
//! │                                     │     profile = fetch(s.user_id)    │
//! │                                     │               (error → None)      │
//! │                                     └── SignedOut: session = profile = None
//! │                                     ▼                                   │
//! │                         watch::Sender<AuthSnapshot>                    │
//! │                                     │                                   │
//! │                     session binding, presentation                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `sign_in`, `sign_up` and `sign_out` drain the provider's events before
//! returning, and the listener task drains the same receiver when the
//! provider changes state on its own. Every event is applied exactly once
//! and in order.
//!
//! `is_admin` and [`AccessGate`] drive what the interface shows. They do not
//! protect anything.

pub mod local;
pub mod token;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use estoque_core::validation::{validate_email, validate_full_name, validate_password};
use estoque_core::{AccessGate, Profile, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::AuthResult;
use crate::store::ProfileStore;

pub use local::LocalSessionProvider;
pub use token::{Claims, JwtManager};

// =============================================================================
// Sessions
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is usable right away.
    SignedIn(Session),
    /// The account exists but must be confirmed before signing in.
    ConfirmationRequired { user_id: String, email: String },
}

/// Authentication backend.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> AuthResult<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AuthResult<SignUpOutcome>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// Every session transition from now on, including the ones caused by
    /// the calls above. The event must be sent before the call returns.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

// =============================================================================
// Auth Context
// =============================================================================

/// What the interface knows about the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    /// True until `initialize` has run.
    pub loading: bool,
}

impl AuthSnapshot {
    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.profile
            .as_ref()
            .is_some_and(|p| p.role == Role::Administrator)
    }

    pub fn gate(&self) -> AccessGate {
        AccessGate::for_profile(self.profile.as_ref())
    }
}

pub struct AuthContext {
    provider: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileStore>,
    state: watch::Sender<AuthSnapshot>,
    events: Mutex<broadcast::Receiver<SessionEvent>>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    pub fn new(provider: Arc<dyn SessionProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (state, _) = watch::channel(AuthSnapshot {
            loading: true,
            ..Default::default()
        });
        let events = Mutex::new(provider.subscribe());
        AuthContext {
            provider,
            profiles,
            state,
            events,
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    pub fn gate(&self) -> AccessGate {
        self.state.borrow().gate()
    }

    /// Loads the provider's existing session, if any, and its profile.
    pub async fn initialize(&self) -> AuthResult<AuthSnapshot> {
        let session = match self.provider.current_session().await {
            Ok(session) => session,
            Err(err) => {
                self.state.send_modify(|s| s.loading = false);
                return Err(err);
            }
        };

        let profile = match &session {
            Some(session) => self.load_profile(&session.user_id).await,
            None => None,
        };

        self.state.send_replace(AuthSnapshot {
            session,
            profile,
            loading: false,
        });
        Ok(self.snapshot())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        validate_email(email)?;
        validate_password(password)?;

        let session = self.provider.sign_in(email, password).await?;
        self.pump().await;

        info!(user_id = %session.user_id, "Signed in");
        Ok(session)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AuthResult<SignUpOutcome> {
        validate_email(email)?;
        validate_password(password)?;
        validate_full_name(full_name)?;

        let outcome = self.provider.sign_up(email, password, full_name).await?;
        self.pump().await;
        Ok(outcome)
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.provider.sign_out().await?;
        self.pump().await;
        Ok(())
    }

    /// Applies one session transition.
    pub async fn apply(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                let profile = self.load_profile(&session.user_id).await;
                self.state.send_replace(AuthSnapshot {
                    session: Some(session),
                    profile,
                    loading: false,
                });
            }
            SessionEvent::SignedOut => {
                self.state.send_replace(AuthSnapshot {
                    session: None,
                    profile: None,
                    loading: false,
                });
                debug!("Session cleared");
            }
        }
    }

    /// Re-reads the profile of the signed-in user (e.g. after a role change).
    pub async fn refresh_profile(&self) -> Option<Profile> {
        let user_id = self.state.borrow().user_id().map(str::to_string)?;
        let profile = self.load_profile(&user_id).await;
        self.state.send_modify(|s| s.profile = profile.clone());
        profile
    }

    /// Applies every provider event received so far, oldest first.
    pub async fn pump(&self) {
        let mut events = self.events.lock().await;
        loop {
            match events.try_recv() {
                Ok(event) => self.apply(event).await,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth context lagged behind session events");
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
    }

    /// Pumps whenever the provider emits an event, until it goes away.
    ///
    /// Needed only for transitions the context did not start itself (token
    /// refresh, expiry, a sign-in elsewhere).
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let context = Arc::clone(self);
        let mut wakeups = self.provider.subscribe();

        tokio::spawn(async move {
            loop {
                match wakeups.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => context.pump().await,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Auth listener stopped");
        })
    }

    async fn load_profile(&self, user_id: &str) -> Option<Profile> {
        match self.profiles.fetch_profile(user_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(user_id = %user_id, "No profile for signed-in user");
                None
            }
            Err(err) => {
                error!(user_id = %user_id, error = %err, "Failed to fetch profile");
                None
            }
        }
    }
}
