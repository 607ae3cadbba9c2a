#![allow(dead_code)]

use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use common_money::MinorUnits;
use stancer_gateway::integrity::{derive_unique_id, IntegrityInput};
use stancer_gateway::{router, AppState, GatewayConfig, GatewayMetrics, InMemoryHost, KeyPair, StancerClient};

pub const SYSTEM_URL: &str = "https://billing.example.com/";
pub const PAYMENT_PAGE: &str = "https://payment.example.com";
pub const LIVE_PUBLIC: &str = "pk_live_123";
pub const LIVE_SECRET: &str = "sk_live_456";
pub const TEST_PUBLIC: &str = "pk_test_123";
pub const TEST_SECRET: &str = "sk_test_456";
/// base64("sk_live_456:")
pub const LIVE_BASIC_AUTH: &str = "Basic c2tfbGl2ZV80NTY6";

pub fn live_config(api_base_url: &str) -> GatewayConfig {
    GatewayConfig::new(SYSTEM_URL)
        .with_live_keys(KeyPair::new(LIVE_PUBLIC, LIVE_SECRET))
        .with_test_keys(KeyPair::new(TEST_PUBLIC, TEST_SECRET))
        .with_api_base_url(api_base_url)
        .with_payment_page_url(PAYMENT_PAGE)
}

pub fn state_with_timeout(config: GatewayConfig, host: Arc<InMemoryHost>, timeout: Duration) -> AppState {
    let provider = StancerClient::new(config.api_base_url.clone(), timeout).unwrap();
    let metrics = GatewayMetrics::new().unwrap();
    AppState::new(config, provider, host, metrics)
}

pub fn state(config: GatewayConfig, host: Arc<InMemoryHost>) -> AppState {
    state_with_timeout(config, host, Duration::from_secs(5))
}

pub fn app(config: GatewayConfig, host: Arc<InMemoryHost>) -> Router {
    router(state(config, host))
}

pub fn token(time: &str, order_id: &str, amount: i64, secret: &str) -> String {
    derive_unique_id(&IntegrityInput {
        system_url: SYSTEM_URL,
        unique_time: time,
        order_id,
        amount: MinorUnits::new(amount),
        secret_key: secret,
    })
    .to_string()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn location(resp: &Response) -> &str {
    resp.headers().get("location").unwrap().to_str().unwrap()
}

pub fn error_code(resp: &Response) -> &str {
    resp.headers().get("X-Error-Code").unwrap().to_str().unwrap()
}

pub async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}
