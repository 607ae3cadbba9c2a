use anyhow::{Context, Result};
use serde::Serialize;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::GatewayError;
use crate::host::InvoiceId;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stancer.com";
pub const DEFAULT_PAYMENT_PAGE_URL: &str = "https://payment.stancer.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Path (relative to the system URL) the pay link form posts to.
pub const INITIATE_PATH: &str = "modules/gateways/stancer/processPayment";
/// Path (relative to the system URL) the provider returns the payer to.
pub const CALLBACK_PATH: &str = "modules/gateways/stancer/checkPayment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Live,
    Test,
}

#[derive(Clone, Default)]
pub struct KeyPair {
    pub public_key: String,
    pub secret_key: String,
}

impl KeyPair {
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("secret_key", &redact(&self.secret_key))
            .finish()
    }
}

/// The key pair in effect for one request, picked by `test_mode`.
#[derive(Clone)]
pub struct Credentials {
    pub public_key: String,
    pub secret_key: String,
    pub mode: Mode,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.public_key.trim().is_empty() && !self.secret_key.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("secret_key", &redact(&self.secret_key))
            .field("mode", &self.mode)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub live: KeyPair,
    pub test: KeyPair,
    pub test_mode: bool,
    pub enabled: bool,
    /// Always ends with `/`.
    pub system_url: String,
    pub api_base_url: String,
    pub payment_page_url: String,
    pub http_timeout: Duration,
    pub host_api_url: Option<String>,
}

impl GatewayConfig {
    pub fn new(system_url: impl Into<String>) -> Self {
        Self {
            live: KeyPair::default(),
            test: KeyPair::default(),
            test_mode: false,
            enabled: true,
            system_url: normalize_system_url(&system_url.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            payment_page_url: DEFAULT_PAYMENT_PAGE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            host_api_url: None,
        }
    }

    pub fn with_live_keys(mut self, keys: KeyPair) -> Self {
        self.live = keys;
        self
    }

    pub fn with_test_keys(mut self, keys: KeyPair) -> Self {
        self.test = keys;
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_payment_page_url(mut self, url: impl Into<String>) -> Self {
        self.payment_page_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let system_url = lookup("SYSTEM_URL")
            .filter(|value| !value.trim().is_empty())
            .context("SYSTEM_URL must be set")?;
        let key = |name: &str| lookup(name).unwrap_or_default().trim().to_string();
        let live = KeyPair::new(key("STANCER_LIVE_PUBLIC_KEY"), key("STANCER_LIVE_SECRET_KEY"));
        let test = KeyPair::new(key("STANCER_TEST_PUBLIC_KEY"), key("STANCER_TEST_SECRET_KEY"));
        let test_mode = lookup("STANCER_TEST_MODE")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        let enabled = lookup("STANCER_ENABLED")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);
        let api_base_url =
            lookup("STANCER_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let payment_page_url = lookup("STANCER_PAYMENT_PAGE_URL")
            .unwrap_or_else(|| DEFAULT_PAYMENT_PAGE_URL.to_string());
        let timeout_secs = lookup("STANCER_HTTP_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        let host_api_url = lookup("HOST_API_URL").filter(|value| !value.trim().is_empty());

        let mut config = Self::new(system_url)
            .with_live_keys(live)
            .with_test_keys(test)
            .with_test_mode(test_mode)
            .with_enabled(enabled)
            .with_api_base_url(api_base_url)
            .with_payment_page_url(payment_page_url)
            .with_http_timeout(Duration::from_secs(timeout_secs.max(1)));
        config.host_api_url = host_api_url;
        Ok(config)
    }

    pub fn mode(&self) -> Mode {
        if self.test_mode {
            Mode::Test
        } else {
            Mode::Live
        }
    }

    pub fn credentials(&self) -> Credentials {
        let (keys, mode) = match self.mode() {
            Mode::Test => (&self.test, Mode::Test),
            Mode::Live => (&self.live, Mode::Live),
        };
        Credentials {
            public_key: keys.public_key.clone(),
            secret_key: keys.secret_key.clone(),
            mode,
        }
    }

    pub fn require_credentials(&self) -> Result<Credentials, GatewayError> {
        let credentials = self.credentials();
        if credentials.is_complete() {
            Ok(credentials)
        } else {
            Err(GatewayError::MissingCredentials(credentials.mode))
        }
    }

    pub fn ensure_enabled(&self) -> Result<(), GatewayError> {
        if self.enabled {
            Ok(())
        } else {
            Err(GatewayError::NotActivated)
        }
    }

    pub fn initiate_url(&self) -> String {
        format!("{}{}", self.system_url, INITIATE_PATH)
    }

    pub fn callback_url(&self, unique_time: &str, unique_id: &str) -> String {
        format!(
            "{}{}?unique_time={}&unique_id={}",
            self.system_url, CALLBACK_PATH, unique_time, unique_id
        )
    }

    pub fn payment_page(&self, public_key: &str, session_id: &str) -> String {
        format!("{}/{}/{}", self.payment_page_url, public_key, session_id)
    }

    pub fn invoice_url(&self, invoice_id: InvoiceId, flag: &str) -> String {
        format!("{}viewinvoice.php?id={}&{}=true", self.system_url, invoice_id, flag)
    }
}

fn normalize_system_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    format!("{trimmed}/")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
