use crate::services::Identity;
use crate::startup::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use service_core::error::AppError;

/// Caller admitted by the auth gate.
///
/// Declare it before any other extractor in a handler so a rejected request
/// never reaches path, query or body parsing.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        let identity = state
            .auth
            .verify(token)
            .await
            .map_err(|e| AppError::Unauthorized(anyhow::Error::new(e)))?;

        tracing::Span::current().record("user_id", identity.subject.as_str());

        Ok(AuthUser(identity))
    }
}
