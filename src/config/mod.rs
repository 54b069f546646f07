use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub supabase: SupabaseConfig,
    pub stripe: StripeConfig,
    pub whatsapp: WhatsAppConfig,
    pub email: EmailConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    /// When set, access tokens are verified locally instead of through the auth API.
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Sender number, with or without the `whatsapp:` prefix.
    pub from_number: Option<String>,
    pub template_fr: Option<String>,
    pub template_en: Option<String>,
    pub api_base: String,
    pub test_recipient: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Public base URL of the web app, without a trailing slash.
    pub app_url: Option<String>,
    pub enable_test_routes: bool,
}

impl SiteConfig {
    pub fn base_url(&self) -> &str {
        self.app_url.as_deref().unwrap_or(DEFAULT_APP_URL)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(get)
    }

    fn with_overrides<F>(mut self, get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        self.database.url = get("DATABASE_URL");
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = get("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Hosted backend; the NEXT_PUBLIC_ names are what the web frontend shares with us
        self.supabase = SupabaseConfig {
            url: get("SUPABASE_URL").or_else(|| get("NEXT_PUBLIC_SUPABASE_URL")),
            anon_key: get("SUPABASE_ANON_KEY").or_else(|| get("NEXT_PUBLIC_SUPABASE_ANON_KEY")),
            jwt_secret: get("SUPABASE_JWT_SECRET"),
        };

        // Stripe
        self.stripe.secret_key = get("STRIPE_SECRET_KEY");
        if let Some(v) = get("STRIPE_API_BASE") {
            self.stripe.api_base = v;
        }

        // Twilio WhatsApp
        self.whatsapp.account_sid = get("TWILIO_ACCOUNT_SID");
        self.whatsapp.auth_token = get("TWILIO_AUTH_TOKEN");
        self.whatsapp.from_number = get("TWILIO_WHATSAPP_FROM");
        self.whatsapp.template_fr = get("TWILIO_TEMPLATE_REMINDER_FR");
        self.whatsapp.template_en = get("TWILIO_TEMPLATE_REMINDER_EN");
        self.whatsapp.test_recipient = get("TWILIO_TEST_RECIPIENT");
        if let Some(v) = get("TWILIO_API_BASE") {
            self.whatsapp.api_base = v;
        }

        // Email
        self.email.smtp_host = get("SMTP_HOST");
        if let Some(v) = get("SMTP_PORT") {
            self.email.smtp_port = v.parse().unwrap_or(self.email.smtp_port);
        }
        self.email.smtp_username = get("SMTP_USERNAME");
        self.email.smtp_password = get("SMTP_PASSWORD");
        self.email.from_email = get("NOTIFICATION_FROM_EMAIL");
        self.email.to_email = get("NOTIFICATION_TO_EMAIL");

        // Site
        if let Some(v) = get("NEXT_PUBLIC_APP_URL").or_else(|| get("APP_URL")) {
            self.site.app_url = Some(v.trim_end_matches('/').to_string());
        }
        if let Some(v) = get("ENABLE_TEST_ROUTES") {
            self.site.enable_test_routes = v.parse().unwrap_or(self.site.enable_test_routes);
        }

        self
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn development() -> Self {
        Self::base(Environment::Development, 10, 30, true)
    }

    fn staging() -> Self {
        Self::base(Environment::Staging, 20, 10, true)
    }

    fn production() -> Self {
        Self::base(Environment::Production, 50, 5, false)
    }

    fn base(
        environment: Environment,
        max_connections: u32,
        connection_timeout: u64,
        enable_test_routes: bool,
    ) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections,
                connection_timeout,
            },
            supabase: SupabaseConfig::default(),
            stripe: StripeConfig {
                secret_key: None,
                api_base: "https://api.stripe.com".to_string(),
            },
            whatsapp: WhatsAppConfig {
                account_sid: None,
                auth_token: None,
                from_number: None,
                template_fr: None,
                template_en: None,
                api_base: "https://api.twilio.com".to_string(),
                test_recipient: None,
            },
            email: EmailConfig {
                smtp_host: None,
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                from_email: None,
                to_email: None,
            },
            site: SiteConfig {
                app_url: None,
                enable_test_routes,
            },
        }
    }
}
