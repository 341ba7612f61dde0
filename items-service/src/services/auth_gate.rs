use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller admitted by an [`AuthGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthDenied {
    #[error("missing credential")]
    MissingCredential,
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

/// Capability consulted before any item operation.
#[async_trait]
pub trait AuthGate: Send + Sync {
    async fn verify(&self, credential: Option<&str>) -> Result<Identity, AuthDenied>;
}

/// Admits every request. Used when no token secret is configured.
#[derive(Debug, Default, Clone)]
pub struct OpenAuthGate;

#[async_trait]
impl AuthGate for OpenAuthGate {
    async fn verify(&self, _credential: Option<&str>) -> Result<Identity, AuthDenied> {
        Ok(Identity::anonymous())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies HS256 bearer tokens issued by the identity provider.
#[derive(Clone)]
pub struct JwtAuthGate {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthGate {
    pub fn new(secret: &Secret<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        tracing::info!("JWT auth gate initialized with HS256");

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl AuthGate for JwtAuthGate {
    async fn verify(&self, credential: Option<&str>) -> Result<Identity, AuthDenied> {
        let token = credential.ok_or(AuthDenied::MissingCredential)?;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthDenied::InvalidCredential(e.to_string()))?;

        Ok(Identity {
            subject: data.claims.sub,
        })
    }
}
