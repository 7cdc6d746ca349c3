use crate::domain::ports::{IdentityProvider, UserDirectory};
use crate::domain::user::{Role, User, UserId};
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone)]
struct Session {
    user: UserId,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    sessions: HashMap<String, Session>,
}

/// In-process stand-in for the identity provider: users plus bearer sessions.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user. Ids, e-mails and student numbers must be unique.
    pub async fn add_user(&self, user: User) -> Result<()> {
        user.validate()?;
        let mut state = self.state.write().await;
        let clash = state.users.values().find(|existing| {
            existing.id == user.id
                || existing.email.eq_ignore_ascii_case(&user.email)
                || (user.student_id.is_some() && existing.student_id == user.student_id)
        });
        if let Some(existing) = clash {
            return Err(PortalError::conflict(format!(
                "user {} clashes with existing user {}",
                user.email, existing.id
            )));
        }
        state.users.insert(user.id, user);
        Ok(())
    }

    /// Mints a random bearer token for `user`, valid for `ttl` if given.
    pub async fn issue_token(&self, user: UserId, ttl: Option<Duration>) -> Result<String> {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.register_token(token.clone(), user, ttl.map(|ttl| Utc::now() + ttl))
            .await?;
        Ok(token)
    }

    /// Binds a known token to a user, e.g. from a seed file.
    pub async fn register_token(
        &self,
        token: String,
        user: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user) {
            return Err(PortalError::not_found(format!("User {user} not found")));
        }
        state.sessions.insert(token, Session { user, expires_at });
        Ok(())
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.state.write().await.sessions.remove(token).is_some()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_student(&self, student_id: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| {
                user.has_role(Role::Student) && user.student_id.as_deref() == Some(student_id)
            })
            .cloned())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryDirectory {
    async fn resolve_caller(&self, token: &str) -> Result<User> {
        let state = self.state.read().await;
        let session = state
            .sessions
            .get(token)
            .ok_or_else(|| PortalError::Unauthorized("Token is not valid".to_string()))?;
        if session.expires_at.is_some_and(|at| at <= Utc::now()) {
            return Err(PortalError::Unauthorized("Token has expired".to_string()));
        }
        match state.users.get(&session.user) {
            Some(user) if user.active => Ok(user.clone()),
            _ => Err(PortalError::Unauthorized("User not found".to_string())),
        }
    }
}
