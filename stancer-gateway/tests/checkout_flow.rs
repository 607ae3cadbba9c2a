mod common;

use axum::http::StatusCode;
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use common::*;
use stancer_gateway::checkout::{initiate_checkout, CheckoutForm};
use stancer_gateway::{router, GatewayConfig, InMemoryHost, KeyPair};

const PROCESS: &str = "/modules/gateways/stancer/processPayment";
const FORM: &str = "amount=1999&currency=EUR&description=Invoice+%2342&invoice_id=42&email=jane%40example.com&customer=Jane+Doe";

#[tokio::test]
async fn creates_session_and_redirects_to_payment_page() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkout/")
                .header("authorization", LIVE_BASIC_AUTH)
                .body_contains(r#""amount":1999"#)
                .body_contains(r#""currency":"eur""#)
                .body_contains(r#""order_id":"42""#)
                .body_contains(r#""methods_allowed":"card""#)
                .body_contains(r#""auth":{"status":"request"}"#)
                .body_contains("modules/gateways/stancer/checkPayment?unique_time=");
            then.status(200).json_body(serde_json::json!({ "id": "cko_abc", "amount": 1999 }));
        })
        .await;
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    let app = app(live_config(&server.base_url()), host.clone());

    let resp = app.oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "https://payment.example.com/pk_live_123/cko_abc");
    create.assert_async().await;

    let calls = host.gateway_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].action, "/v1/checkout/");
    assert!(calls[0].request.contains(r#""order_id":"42""#));
    assert!(calls[0].response.starts_with("HTTP Response Code: 200"));
}

#[tokio::test]
async fn provider_refusal_is_logged_and_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkout/");
            then.status(401).json_body(serde_json::json!({ "error": { "message": "bad key" } }));
        })
        .await;
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    let app = app(live_config(&server.base_url()), host.clone());

    let resp = app.oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&resp), "payment_creation_failed");
    let calls = host.gateway_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].response.starts_with("HTTP Response Code: 401"));
}

#[tokio::test]
async fn unknown_invoice_never_reaches_provider() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkout/");
            then.status(200).json_body(serde_json::json!({ "id": "cko_abc" }));
        })
        .await;
    let host = Arc::new(InMemoryHost::new().with_invoice(7));
    let app = app(live_config(&server.base_url()), host.clone());

    let resp = app.oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&resp), "invalid_invoice_id");
    create.assert_hits_async(0).await;
    assert!(host.gateway_calls().is_empty());
}

#[tokio::test]
async fn missing_keys_for_active_mode_are_refused() {
    let server = MockServer::start_async().await;
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    let config = GatewayConfig::new(SYSTEM_URL)
        .with_live_keys(KeyPair::new(LIVE_PUBLIC, LIVE_SECRET))
        .with_api_base_url(server.base_url())
        .with_test_mode(true);
    let app = app(config, host);

    let resp = app.oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&resp), "missing_api_keys");
}

#[tokio::test]
async fn inactive_module_is_refused() {
    let server = MockServer::start_async().await;
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    let app = app(live_config(&server.base_url()).with_enabled(false), host);

    let resp = app.oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_code(&resp), "module_inactive");
}

#[tokio::test]
async fn redirect_carries_token_bound_to_the_charge() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkout/");
            then.status(200).json_body(serde_json::json!({ "id": "cko_abc", "amount": 1999, "order_id": "42" }));
        })
        .await;
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    let state = state(live_config(&server.base_url()), host.clone());
    let form = CheckoutForm {
        amount: "1999".into(),
        currency: "EUR".into(),
        invoice_id: "42".into(),
        ..CheckoutForm::default()
    };

    let redirect = initiate_checkout(&state, form, 1_700_000_000).await.unwrap();
    assert_eq!(redirect.session_id, "cko_abc");
    assert_eq!(redirect.unique_time, 1_700_000_000);
    assert_eq!(redirect.unique_id.as_str(), token("1700000000", "42", 1999, LIVE_SECRET));
    assert!(host.gateway_calls()[0]
        .request
        .contains(&format!("unique_id={}", redirect.unique_id)));
}

#[tokio::test]
async fn slow_provider_is_reported_as_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/checkout/");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(serde_json::json!({ "id": "cko_late" }));
        })
        .await;
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    let state = state_with_timeout(live_config(&server.base_url()), host.clone(), Duration::from_secs(1));

    let resp = router(state).oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&resp), "provider_unavailable");
    let calls = host.gateway_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].response.starts_with("HTTP Request Failed"));
    assert!(calls[0].parsed.is_none());
}

#[tokio::test]
async fn unreachable_provider_is_reported_as_unavailable() {
    let host = Arc::new(InMemoryHost::new().with_invoice(42));
    // Nothing listens on the discard port.
    let app = app(live_config("http://127.0.0.1:9"), host.clone());

    let resp = app.oneshot(post_form(PROCESS, FORM)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&resp), "provider_unavailable");
    assert!(host.gateway_calls()[0].response.starts_with("HTTP Request Failed"));
}
