use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// OAuth2-style password form: `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
        }
    }
}
