use std::sync::Arc;

use crate::auth::{IdentityProvider, JwtVerifier, SupabaseAuth};
use crate::config::AppConfig;
use crate::database::{PgStore, Store, StoreError};
use crate::services::{BillingProvider, Mailer, Messenger, SmtpMailer, StripeClient, TwilioClient};

/// Collaborators built once at startup and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityProvider>,
    pub billing: Arc<dyn BillingProvider>,
    pub messenger: Arc<dyn Messenger>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Production wiring: Postgres, Supabase (or local JWT verification), Stripe, Twilio and SMTP.
    pub fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store = PgStore::connect_lazy(&config.database)?;

        let identity: Arc<dyn IdentityProvider> = match config.supabase.jwt_secret.as_deref() {
            Some(secret) => {
                tracing::info!("Verifying access tokens locally");
                Arc::new(JwtVerifier::new(secret))
            }
            None => {
                tracing::info!("Resolving access tokens through the Supabase auth API");
                Arc::new(SupabaseAuth::new(&config.supabase))
            }
        };

        if config.stripe.secret_key.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not found. The billing portal will be unavailable.");
        }
        if config.whatsapp.account_sid.is_none() {
            tracing::warn!("TWILIO_ACCOUNT_SID not found. WhatsApp reminders will be unavailable.");
        }

        Ok(Self {
            store: Arc::new(store),
            identity,
            billing: Arc::new(StripeClient::new(&config.stripe)),
            messenger: Arc::new(TwilioClient::new(&config.whatsapp)),
            mailer: Arc::new(SmtpMailer::new(&config.email)),
            config: Arc::new(config),
        })
    }
}
