// src/session.rs
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

use crate::domain::UserId;

/// The signed-in identity, passed explicitly into the controller so
/// nothing reads ambient storage and tests can use fixture sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: UserId, username: impl Into<String>) -> Self {
        Session {
            token: token.into(),
            user_id,
            username: username.into(),
        }
    }

    /// Recovers the user id and display name from the bearer token's JWT
    /// payload segment. No signature verification happens here; the
    /// identity is for display and win/loss comparison only, the server
    /// checks the token on every call. `None` means the token is not
    /// usable and the embedder should send the user to sign-in.
    pub fn from_token(token: &str) -> Option<Session> {
        let payload = token.split('.').nth(1)?;
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: Value = serde_json::from_slice(&decoded).ok()?;

        let user_id = match claims.get("sub")? {
            Value::String(text) => text.parse().ok()?,
            Value::Number(number) => number.as_i64()?,
            _ => return None,
        };

        let username = claims
            .get("name")
            .or_else(|| claims.get("username"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Some(Session {
            token: token.to_string(),
            user_id,
            username,
        })
    }
}
