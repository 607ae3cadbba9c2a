use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{Html, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use common_http_errors::{ApiError, ApiResult};

use crate::app_state::AppState;
use crate::callback::{verify_callback, CallbackQuery};
use crate::checkout::{initiate_checkout, CheckoutForm};
use crate::config::{CALLBACK_PATH, INITIATE_PATH};
use crate::link::{render_payment_link, LinkParams};
use crate::metadata::{module_definition, ModuleDefinition};
use crate::refund::{issue_refund, RefundParams, RefundResult};

pub const LINK_PATH: &str = "modules/gateways/stancer/link";
pub const REFUND_PATH: &str = "modules/gateways/stancer/refund";
pub const CONFIG_PATH: &str = "modules/gateways/stancer/config";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(metrics))
        .route(&format!("/{LINK_PATH}"), post(payment_link))
        .route(&format!("/{INITIATE_PATH}"), post(process_payment))
        .route(&format!("/{CALLBACK_PATH}"), get(check_payment))
        .route(&format!("/{REFUND_PATH}"), post(refund))
        .route(&format!("/{CONFIG_PATH}"), get(module_config))
        .with_state(state)
}

/// Malformed JSON bodies get the same error envelope as every other refusal.
fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request("invalid_request", rejection.body_text())
}

pub async fn payment_link(
    State(state): State<AppState>,
    body: Result<Json<LinkParams>, JsonRejection>,
) -> ApiResult<Html<String>> {
    let Json(params) = body.map_err(invalid_body)?;
    Ok(Html(render_payment_link(&state.config, &params)?))
}

pub async fn process_payment(
    State(state): State<AppState>,
    Form(form): Form<CheckoutForm>,
) -> ApiResult<Redirect> {
    let redirect = initiate_checkout(&state, form, Utc::now().timestamp()).await?;
    Ok(Redirect::to(&redirect.location))
}

pub async fn check_payment(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    let outcome = verify_callback(&state, query).await?;
    Ok(Redirect::to(&outcome.location))
}

pub async fn refund(
    State(state): State<AppState>,
    body: Result<Json<RefundParams>, JsonRejection>,
) -> ApiResult<Json<RefundResult>> {
    let Json(params) = body.map_err(invalid_body)?;
    Ok(Json(issue_refund(&state, params).await))
}

pub async fn module_config() -> Json<ModuleDefinition> {
    Json(module_definition())
}

async fn metrics(State(state): State<AppState>) -> ApiResult<Response> {
    state.metrics.render().map_err(|err| ApiError::internal(err, None))
}
