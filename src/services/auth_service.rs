// Identity - sign-up, sign-in, sign-out and session resolution

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::infrastructure::database::DataStore;
use crate::models::{current_time_millis, NewUser, Timestamp, User, UserId};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").expect("valid username regex"));

const MIN_PASSWORD_LEN: usize = 6;

/// Auth state changes, observed by anything that needs to react to sign-in/out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    SignedUp { user_id: UserId },
    SignedIn { user_id: UserId },
    SignedOut { user_id: UserId },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: Uuid,
    pub expires_at: Timestamp,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DataStore>,
    events: broadcast::Sender<AuthEvent>,
    session_ttl_millis: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn DataStore>, session_ttl_hours: i64) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            store,
            events,
            session_ttl_millis: session_ttl_hours.saturating_mul(60 * 60 * 1000),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthSession> {
        let email = request.email.trim().to_lowercase();
        let username = request.username.trim().to_string();

        if !email.contains('@') {
            return Err(AppError::Validation("A valid email address is required".into()));
        }
        if !USERNAME_RE.is_match(&username) {
            return Err(AppError::Validation(
                "Username must be 3-30 letters, digits or underscores".into(),
            ));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .store
            .create_user(NewUser {
                display_name: username.clone(),
                username,
                email,
                password_hash,
            })
            .await?;

        info!("User signed up: {} ({})", user.username, user.id);
        self.notify(AuthEvent::SignedUp { user_id: user.id });
        self.open_session(user).await
    }

    pub async fn sign_in(&self, request: SignInRequest) -> AppResult<AuthSession> {
        let email = request.email.trim().to_lowercase();
        let (user, stored_hash) = self
            .store
            .get_credentials(&email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

        if !verify_password(&request.password, &stored_hash)? {
            warn!("Failed sign-in attempt for {}", email);
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }

        self.open_session(user).await
    }

    pub async fn sign_out(&self, token: Uuid) -> AppResult<()> {
        if let Some(session) = self.store.get_session(token).await? {
            self.store.delete_session(token).await?;
            self.notify(AuthEvent::SignedOut {
                user_id: session.user_id,
            });
        }
        Ok(())
    }

    /// Resolve a bearer token to its user. Expired sessions are removed.
    pub async fn resolve(&self, token: Uuid) -> AppResult<Option<UserId>> {
        let Some(session) = self.store.get_session(token).await? else {
            return Ok(None);
        };
        if session.expires_at <= current_time_millis() {
            self.store.delete_session(token).await?;
            return Ok(None);
        }
        Ok(Some(session.user_id))
    }

    async fn open_session(&self, user: User) -> AppResult<AuthSession> {
        let session = self.store.create_session(user.id, self.session_ttl_millis).await?;
        self.notify(AuthEvent::SignedIn { user_id: user.id });
        Ok(AuthSession {
            user,
            token: session.token,
            expires_at: session.expires_at,
        })
    }

    fn notify(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(password_hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
