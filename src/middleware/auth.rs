//! Authentication extractors.
//!
//! A bearer token is handed to the configured `TokenVerifier`, which yields
//! the identity provider subject. `AuthUser` then resolves the subject to a
//! stored profile whose id is trusted for the rest of the request.
//!
//! ```rust,ignore
//! async fn handler(user: AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.user_id)
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use thiserror::Error;

use crate::domain::value_objects::UserId;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("no profile for subject")]
    UnknownSubject,
}

/// Validates a bearer token and returns its subject.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// For deployments behind an authenticating gateway that forwards the
/// already-verified subject as the bearer value.
#[derive(Debug, Default, Clone)]
pub struct TrustedProxyVerifier;

impl TokenVerifier for TrustedProxyVerifier {
    fn verify(&self, token: &str) -> Result<String, AuthError> {
        let subject = token.trim();
        if subject.is_empty() || subject.contains(char::is_whitespace) {
            return Err(AuthError::InvalidToken("malformed subject".to_string()));
        }
        Ok(subject.to_string())
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)
}

/// The verified identity subject, with no profile lookup.
#[derive(Debug, Clone)]
pub struct VerifiedSubject(pub String);

#[async_trait]
impl FromRequestParts<AppState> for VerifiedSubject {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        Ok(Self(state.token_verifier().verify(token)?))
    }
}

/// A caller with a stored profile.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub subject: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let VerifiedSubject(subject) = VerifiedSubject::from_request_parts(parts, state).await?;
        let user = state
            .stores()
            .users
            .find_by_subject(&subject)
            .await?
            .ok_or(AuthError::UnknownSubject)?;
        Ok(Self { user_id: user.id, subject })
    }
}
