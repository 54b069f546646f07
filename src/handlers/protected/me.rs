use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::database::Profile;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub profile: Profile,
    /// Dashboard the frontend should route to after sign-in.
    pub redirect_to: &'static str,
}

/// GET /api/me - the caller's profile and role-based landing page
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<MeResponse>> {
    let profile = state
        .store
        .profile(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    // Unknown roles get the least privileged dashboard
    let redirect_to = profile
        .role()
        .map(|role| role.dashboard_path())
        .unwrap_or("/dashboard/client");

    Ok(Json(MeResponse {
        profile,
        redirect_to,
    }))
}
