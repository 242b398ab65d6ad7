use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{AppError, AppResult},
    state::AppState,
    users::{repo::UserStore, repo_types::NewUser},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn ensure_valid_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::Validation("email is not a valid address".into()));
    }
    Ok(())
}

/// Registration and login. Both hand back a signed access token.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.jwt.clone())
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, full_name: &str, password: &str) -> AppResult<String> {
        ensure_valid_email(email)?;
        if full_name.chars().count() <= 3 {
            return Err(AppError::Validation(
                "full_name must be longer than 3 characters".into(),
            ));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password must not be empty".into()));
        }

        // The unique constraint still guards the race between this check and the insert.
        if self.users.get_by_email(email).await?.is_some() {
            warn!("email already registered");
            return Err(AppError::DuplicateEmail);
        }

        let hashed_password = hash_password(password)?;
        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                full_name: full_name.to_string(),
                hashed_password,
            })
            .await?;

        let token = self.keys.sign(user.id)?;
        info!(user_id = user.id, "user registered");
        Ok(token)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let Some(found) = self.users.get_by_email(email).await? else {
            warn!("login with unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &found.user.hashed_password) {
            warn!(user_id = found.user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.sign(found.user.id)?;
        info!(user_id = found.user.id, "user logged in");
        Ok(token)
    }
}
