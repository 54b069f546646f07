use axum::{
    extract::State,
    http::{header::ORIGIN, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::stripe::portal_return_url;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerPortalRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerPortalResponse {
    pub url: String,
}

/// POST /api/stripe/customer-portal - Stripe billing portal link for a user's active subscription
pub async fn customer_portal(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<CustomerPortalRequest>>,
) -> ApiResult<Json<CustomerPortalResponse>> {
    let raw_id = body
        .and_then(|Json(req)| req.user_id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    let user_id =
        Uuid::parse_str(&raw_id).map_err(|_| ApiError::bad_request("Invalid user ID"))?;

    let package = state.store.active_package(user_id).await?;
    let subscription_id = package
        .as_ref()
        .and_then(|p| p.subscription_id())
        .ok_or_else(|| ApiError::not_found("No active subscription found"))?;

    let customer_id = state.billing.subscription_customer(subscription_id).await?;

    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    let return_url = portal_return_url(origin, state.config.site.app_url.as_deref());

    let url = state
        .billing
        .create_portal_session(&customer_id, &return_url)
        .await?;

    Ok(Json(CustomerPortalResponse { url }))
}
