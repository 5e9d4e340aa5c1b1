use std::{env, path::PathBuf, time::Duration};

use tracing::error;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@sahli.co";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password123";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_PATH: &str = "storage/sahli-store.json";
const DEFAULT_WHATSAPP_NUMBER: &str = "97430000000";
const DEFAULT_AUTH_LATENCY_MS: u64 = 1200;
const DEFAULT_SESSION_POLL_SECS: u64 = 5;

/// The single admin login pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl AdminCredentials {
    /// Resolve the admin pair, falling back to the built-in defaults per missing field.
    ///
    /// Missing values in production are logged, never fatal.
    pub fn resolve(email: Option<String>, password: Option<String>, production: bool) -> Self {
        let email = email.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let password = password.filter(|v| !v.is_empty());

        if production && (email.is_none() || password.is_none()) {
            error!(
                email_configured = email.is_some(),
                password_configured = password.is_some(),
                "ADMIN_EMAIL / ADMIN_PASSWORD missing in production, falling back to default credentials"
            );
        }

        Self {
            email: email.unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            password: password.unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }

    pub fn from_env(production: bool) -> Self {
        Self::resolve(
            env::var("ADMIN_EMAIL").ok(),
            env::var("ADMIN_PASSWORD").ok(),
            production,
        )
    }

    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_ADMIN_PASSWORD
    }
}

#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub port: u16,
    pub production: bool,
    pub admin: AdminCredentials,
    pub storage_path: PathBuf,
    pub whatsapp_number: String,
    pub auth_latency: Duration,
    pub session_poll: Duration,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let production = is_production(env::var("APP_ENV").ok().as_deref());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let storage_path = env::var("STORAGE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH));

        let whatsapp_number = env::var("WHATSAPP_NUMBER")
            .ok()
            .map(|v| normalize_phone(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string());

        let auth_latency = Duration::from_millis(parse_or(
            env::var("AUTH_LATENCY_MS").ok(),
            DEFAULT_AUTH_LATENCY_MS,
        ));
        let session_poll = Duration::from_secs(
            parse_or(
                env::var("SESSION_POLL_SECS").ok(),
                DEFAULT_SESSION_POLL_SECS,
            )
            .max(1),
        );

        Self {
            port,
            production,
            admin: AdminCredentials::from_env(production),
            storage_path,
            whatsapp_number,
            auth_latency,
            session_poll,
        }
    }
}

#[cfg(test)]
impl SiteConfig {
    /// In-memory friendly settings with no simulated latency.
    pub(crate) fn for_tests(production: bool) -> Self {
        Self {
            port: DEFAULT_PORT,
            production,
            admin: AdminCredentials::resolve(None, None, production),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            auth_latency: Duration::ZERO,
            session_poll: Duration::from_secs(DEFAULT_SESSION_POLL_SECS),
        }
    }
}

fn is_production(app_env: Option<&str>) -> bool {
    app_env
        .map(|v| v.trim().eq_ignore_ascii_case("production"))
        .unwrap_or(false)
}

fn parse_or(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Keep only the digits of a phone number, the form `wa.me` links and log lookups use.
pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}
