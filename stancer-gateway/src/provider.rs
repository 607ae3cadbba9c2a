//! Stancer REST client and the wire shapes of the three endpoints used.
//!
//! Every call yields a [`ProviderCall`] holding the outgoing request text and
//! either the raw response or the transport error, so callers can write the
//! gateway log before interpreting the result.

use reqwest::{Client, StatusCode};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::host::{GatewayCallRecord, GATEWAY_NAME};
use common_money::MinorUnits;

pub const CHECKOUT_ENDPOINT: &str = "/v1/checkout/";
pub const REFUNDS_ENDPOINT: &str = "/v1/refunds/";
pub const METHODS_ALLOWED: &str = "card";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: &'static str },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response shape from {endpoint}: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    fn from_reqwest(endpoint: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProviderError::Timeout { endpoint }
        } else {
            ProviderError::Transport { endpoint, source }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: StatusCode,
    pub body: String,
}

impl Exchange {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    pub fn parse<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, ProviderError> {
        serde_json::from_str(&self.body).map_err(|source| ProviderError::Parse { endpoint, source })
    }

    pub fn summary(&self) -> String {
        format!(
            "HTTP Response Code: {}\nHTTP Response Phrase: {}\n{}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or(""),
            self.body
        )
    }
}

#[derive(Debug)]
pub struct ProviderCall {
    pub endpoint: &'static str,
    pub request: String,
    pub outcome: Result<Exchange, ProviderError>,
}

impl ProviderCall {
    pub fn record(&self) -> GatewayCallRecord {
        let (response, parsed) = match &self.outcome {
            Ok(exchange) => (exchange.summary(), exchange.json()),
            Err(err) => (format!("HTTP Request Failed: {err}"), None),
        };
        GatewayCallRecord {
            gateway: GATEWAY_NAME,
            action: self.endpoint.to_string(),
            request: self.request.clone(),
            response,
            parsed,
        }
    }

    /// Outcome label for metrics.
    pub fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            Ok(exchange) if exchange.is_ok() => "ok",
            Ok(_) => "rejected",
            Err(ProviderError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub email: String,
    pub name: String,
}

/// Body of a checkout creation.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: MinorUnits,
    pub currency: String,
    pub description: String,
    pub order_id: String,
    pub unique_id: String,
    pub customer: Customer,
    pub return_url: String,
}

impl ChargeRequest {
    pub fn to_body(&self) -> Value {
        json!({
            "auth": { "status": "request" },
            "amount": self.amount.get(),
            "currency": self.currency,
            "description": self.description,
            "order_id": self.order_id,
            "unique_id": self.unique_id,
            "methods_allowed": METHODS_ALLOWED,
            "customer": {
                "email": self.customer.email,
                "name": self.customer.name,
            },
            "return_url": self.return_url,
        })
    }
}

/// Provider-side checkout session as returned by creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CheckoutSession {
    /// Fields the provider left out are not counted as a mismatch.
    pub fn echoes(&self, charge: &ChargeRequest) -> bool {
        self.amount.map_or(true, |amount| amount == charge.amount.get())
            && self
                .order_id
                .as_deref()
                .map_or(true, |order_id| order_id == charge.order_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutLookup {
    pub payments: Vec<ProviderPayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPayment {
    pub id: String,
    pub status: String,
    #[serde(deserialize_with = "string_or_number")]
    pub order_id: String,
    pub amount: i64,
    #[serde(default)]
    pub fee: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    pub id: String,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

// The provider echoes order_id as it was sent, but older sessions stored it as a number.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer)
        .map(String::from)
        .map_err(|_| de::Error::custom("expected a string or a number"))
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

#[derive(Clone)]
pub struct StancerClient {
    http: Client,
    base_url: String,
}

impl StancerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_checkout(&self, secret_key: &str, charge: &ChargeRequest) -> ProviderCall {
        self.post_json(CHECKOUT_ENDPOINT, secret_key, charge.to_body()).await
    }

    pub async fn find_checkout(&self, secret_key: &str, unique_id: &str) -> ProviderCall {
        let endpoint = CHECKOUT_ENDPOINT;
        let request = format!("GET {}{}?unique_id={}", self.base_url, endpoint, unique_id);
        let sent = self
            .http
            .get(format!("{}{}", self.base_url, endpoint))
            .basic_auth(secret_key, None::<&str>)
            .query(&[("unique_id", unique_id)])
            .send()
            .await;
        let outcome = Self::read(endpoint, sent).await;
        ProviderCall { endpoint, request, outcome }
    }

    pub async fn refund(&self, secret_key: &str, payment_id: &str, amount: MinorUnits) -> ProviderCall {
        let body = json!({ "payment": payment_id, "amount": amount.get() });
        self.post_json(REFUNDS_ENDPOINT, secret_key, body).await
    }

    async fn post_json(&self, endpoint: &'static str, secret_key: &str, body: Value) -> ProviderCall {
        let request = body.to_string();
        let sent = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .basic_auth(secret_key, None::<&str>)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request.clone())
            .send()
            .await;
        let outcome = Self::read(endpoint, sent).await;
        ProviderCall { endpoint, request, outcome }
    }

    async fn read(
        endpoint: &'static str,
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<Exchange, ProviderError> {
        let resp = sent.map_err(|err| {
            warn!(endpoint, error = %err, "provider request failed");
            ProviderError::from_reqwest(endpoint, err)
        })?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|err| ProviderError::from_reqwest(endpoint, err))?;
        debug!(endpoint, status = status.as_u16(), "provider responded");
        Ok(Exchange { status, body })
    }
}
