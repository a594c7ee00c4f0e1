//! Authentication context
//!
//! The signed-in identity is explicit state handed to every collection that
//! needs it:
//! - `AuthState::Absent` when nobody is signed in
//! - `AuthState::Present(identity)` otherwise
//!
//! Collections subscribe to transitions and re-synchronise on each one. The
//! act of signing in is delegated to an [`AuthProvider`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

/// An authenticated user as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Owner identity stamped on every row
    #[serde(rename = "id")]
    pub user_id: Uuid,

    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Current authentication state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Nobody is signed in
    #[default]
    Absent,

    /// An identity is signed in
    Present(Identity),
}

impl AuthState {
    /// Get the identity if one is signed in
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Present(identity) => Some(identity),
            AuthState::Absent => None,
        }
    }

    /// Get the owner id if one is signed in
    pub fn user_id(&self) -> Option<Uuid> {
        self.identity().map(|identity| identity.user_id)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, AuthState::Present(_))
    }
}

/// Shared handle on the authentication state
///
/// Clones observe and drive the same state. Setting a state equal to the
/// current one does not notify subscribers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    sender: watch::Sender<AuthState>,
}

impl AuthContext {
    /// Create a context with nobody signed in
    pub fn new() -> Self {
        Self::with_state(AuthState::Absent)
    }

    /// Create a context already holding a state
    pub fn with_state(state: AuthState) -> Self {
        let (sender, _) = watch::channel(state);
        Self { sender }
    }

    /// Snapshot of the current state
    pub fn current(&self) -> AuthState {
        self.sender.borrow().clone()
    }

    /// Owner id of the signed-in identity
    pub fn user_id(&self) -> Option<Uuid> {
        self.sender.borrow().user_id()
    }

    /// Replace the signed-in identity
    pub fn sign_in(&self, identity: Identity) {
        self.set(AuthState::Present(identity));
    }

    /// Clear the signed-in identity
    pub fn sign_out(&self) {
        self.set(AuthState::Absent);
    }

    /// Receive every subsequent state transition
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.sender.subscribe()
    }

    fn set(&self, state: AuthState) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            tracing::info!(user_id = ?self.user_id(), "authentication state changed");
        }
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A signed-in session as returned by an auth provider
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub access_token: String,
}

/// External collaborator performing sign-up, sign-in and sign-out
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Exchange credentials for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Revoke a session
    async fn sign_out(&self, session: &Session) -> Result<()>;
}
