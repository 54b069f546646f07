use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SupabaseConfig;

/// Audience Supabase puts on access tokens of signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Caller resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Pulls the token out of an `Authorization` value; the `Bearer` scheme is optional.
/// A bare scheme with nothing after it counts as a missing token.
pub fn extract_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim).unwrap_or_default();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        Err(AuthError::MissingToken)
    } else {
        Ok(token)
    }
}

/// Asks the hosted auth API who the token belongs to.
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    client: Client,
    url: Option<String>,
    anon_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Option<String>,
    email: Option<String>,
}

impl SupabaseAuth {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.url.as_ref().map(|u| u.trim_end_matches('/').to_string()),
            anon_key: config.anon_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let url = self.url.as_deref().ok_or(AuthError::NotConfigured("SUPABASE_URL"))?;
        let anon_key = self
            .anon_key
            .as_deref()
            .ok_or(AuthError::NotConfigured("SUPABASE_ANON_KEY"))?;

        let response = self
            .client
            .get(format!("{}/auth/v1/user", url))
            .header("apikey", anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken(format!(
                "auth API answered {}",
                response.status()
            )));
        }

        let user: AuthUser = response.json().await?;
        let id = user
            .id
            .ok_or_else(|| AuthError::InvalidToken("no user for token".to_string()))?;
        let user_id = Uuid::parse_str(&id)
            .map_err(|_| AuthError::InvalidToken(format!("malformed user id '{}'", id)))?;

        Ok(Identity {
            user_id,
            email: user.email,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Verifies access tokens locally with the project's JWT secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtVerifier {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken(format!("malformed subject '{}'", claims.sub)))?;

        Ok(Identity {
            user_id,
            email: claims.email,
        })
    }
}
