use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::provider::{RefundResponse, REFUNDS_ENDPOINT};
use crate::status::is_refund_accepted;
use common_money::MinorUnits;

#[derive(Debug, Clone, Deserialize)]
pub struct RefundParams {
    /// Provider id of the captured payment.
    pub transid: String,
    /// Amount to refund in major units.
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Success,
    Error,
}

impl RefundStatus {
    fn label(&self) -> &'static str {
        match self {
            RefundStatus::Success => "success",
            RefundStatus::Error => "error",
        }
    }
}

/// Refunds are driven programmatically by the host, so every failure comes
/// back as a result rather than a terminal error.
#[derive(Debug, Clone, Serialize)]
pub struct RefundResult {
    pub status: RefundStatus,
    pub rawdata: Value,
    pub transid: Option<String>,
}

impl RefundResult {
    fn error(rawdata: Value) -> Self {
        Self { status: RefundStatus::Error, rawdata, transid: None }
    }
}

pub async fn issue_refund(state: &AppState, params: RefundParams) -> RefundResult {
    let result = refund_inner(state, &params).await;
    state.metrics.record_refund(result.status.label());
    match result.status {
        RefundStatus::Success => info!(
            payment_id = %params.transid,
            refund_id = result.transid.as_deref().unwrap_or_default(),
            "refund accepted"
        ),
        RefundStatus::Error => warn!(payment_id = %params.transid, "refund failed"),
    }
    result
}

async fn refund_inner(state: &AppState, params: &RefundParams) -> RefundResult {
    if let Err(err) = state.config.ensure_enabled() {
        return RefundResult::error(json!({ "error": err.to_string() }));
    }
    let amount = match MinorUnits::from_major(&params.amount) {
        Ok(amount) => amount,
        Err(err) => return RefundResult::error(json!({ "error": err.to_string() })),
    };
    let credentials = state.config.credentials();

    let call = state
        .provider
        .refund(&credentials.secret_key, &params.transid, amount)
        .await;
    state.record_call(&call).await;

    let exchange = match call.outcome {
        Ok(exchange) => exchange,
        Err(err) => return RefundResult::error(json!({ "error": err.to_string() })),
    };
    let rawdata = exchange.json().unwrap_or(Value::Null);
    if !exchange.is_ok() {
        return RefundResult::error(rawdata);
    }
    match exchange.parse::<RefundResponse>(REFUNDS_ENDPOINT) {
        Ok(refund) if is_refund_accepted(&refund.status) => RefundResult {
            status: RefundStatus::Success,
            rawdata,
            transid: Some(refund.id),
        },
        Ok(_) => RefundResult::error(rawdata),
        Err(err) => {
            warn!(error = %err, "refund response did not match the expected shape");
            RefundResult::error(rawdata)
        }
    }
}
