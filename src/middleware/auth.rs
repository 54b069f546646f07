use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{extract_token, AuthError, Identity};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, available to protected handlers as `Extension<AuthUser>`.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.user_id,
            email: identity.email,
        }
    }
}

/// Resolves the bearer token before any protected handler runs.
/// A missing token is rejected without touching the identity provider or the store.
pub async fn require_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = extract_token(header).map_err(|_| ApiError::unauthorized("Unauthorized"))?;

    let identity = state.identity.resolve(token).await.map_err(|err| {
        match &err {
            AuthError::NotConfigured(_) | AuthError::Http(_) => {
                tracing::error!("Identity resolution failed: {}", err)
            }
            _ => tracing::warn!("Rejected token on {}: {}", request.uri().path(), err),
        }
        ApiError::unauthorized("Unauthorized")
    })?;

    request.extensions_mut().insert(AuthUser::from(identity));
    Ok(next.run(request).await)
}
