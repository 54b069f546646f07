use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::{StripeConfig, DEFAULT_APP_URL};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Stripe is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Invalid Stripe API base URL: {0}")]
    InvalidBase(String),

    #[error("Stripe request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe's own message, passed to the caller as is.
    #[error("{message}")]
    Api { status: u16, message: String },
}

/// The two payment-processor calls the billing portal redirect needs.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Customer id owning the subscription.
    async fn subscription_customer(&self, subscription_id: &str) -> Result<String, BillingError>;

    /// Hosted portal URL for the customer; the portal links back to `return_url`.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, BillingError>;
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: Option<String>,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct Subscription {
    customer: CustomerRef,
}

/// `customer` is an id unless the request expanded it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CustomerRef {
    Id(String),
    Object { id: String },
}

#[derive(Debug, Deserialize)]
struct PortalSession {
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn secret_key(&self) -> Result<&str, BillingError> {
        self.secret_key
            .as_deref()
            .ok_or(BillingError::NotConfigured("STRIPE_SECRET_KEY"))
    }

    /// `segments` are percent-encoded one by one, so ids cannot change the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BillingError> {
        let invalid = || BillingError::InvalidBase(self.api_base.clone());
        let mut url = Url::parse(&self.api_base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, BillingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StripeErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| format!("Stripe API error ({})", status));
        Err(BillingError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn subscription_customer(&self, subscription_id: &str) -> Result<String, BillingError> {
        let secret_key = self.secret_key()?;
        let url = self.endpoint(&["v1", "subscriptions", subscription_id])?;
        debug!("Retrieving Stripe subscription {}", subscription_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(secret_key)
            .send()
            .await?;

        let subscription: Subscription = Self::parse(response).await?;
        Ok(match subscription.customer {
            CustomerRef::Id(id) | CustomerRef::Object { id } => id,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, BillingError> {
        let secret_key = self.secret_key()?;
        let url = self.endpoint(&["v1", "billing_portal", "sessions"])?;

        let response = self
            .client
            .post(url)
            .bearer_auth(secret_key)
            .form(&[("customer", customer_id), ("return_url", return_url)])
            .send()
            .await?;

        let session: PortalSession = Self::parse(response).await?;
        info!("Created billing portal session for customer {}", customer_id);
        Ok(session.url)
    }
}

/// Where the portal sends the user back: the caller's origin, else the
/// configured app URL, else the local default.
pub fn portal_return_url(origin: Option<&str>, app_url: Option<&str>) -> String {
    let base = origin
        .map(str::trim)
        .filter(|o| is_web_origin(o))
        .or(app_url)
        .unwrap_or(DEFAULT_APP_URL);
    format!("{}/dashboard", base.trim_end_matches('/'))
}

fn is_web_origin(origin: &str) -> bool {
    url::Url::parse(origin)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}
