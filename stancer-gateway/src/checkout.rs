use serde::Deserialize;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::integrity::{derive_unique_id, IntegrityInput, UniqueId};
use crate::provider::{ChargeRequest, CheckoutSession, Customer, CHECKOUT_ENDPOINT};
use common_money::MinorUnits;

/// Fields posted by the pay-link form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub amount: String,
    pub currency: String,
    pub description: String,
    pub invoice_id: String,
    pub email: String,
    pub customer: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRedirect {
    pub session_id: String,
    pub unique_id: UniqueId,
    pub unique_time: i64,
    pub location: String,
}

fn parse_minor_units(raw: &str) -> Result<MinorUnits, GatewayError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value >= 0)
        .map(MinorUnits::new)
        .ok_or_else(|| GatewayError::InvalidAmount(raw.to_string()))
}

/// Create a hosted checkout session for an invoice and return where to send the payer.
pub async fn initiate_checkout(
    state: &AppState,
    form: CheckoutForm,
    unique_time: i64,
) -> Result<CheckoutRedirect, GatewayError> {
    let config = &state.config;
    config.ensure_enabled()?;
    let credentials = config.require_credentials()?;

    let invoice_id = state.host.validate_invoice_id(&form.invoice_id).await?;
    let amount = parse_minor_units(&form.amount)?;
    let order_id = invoice_id.to_string();
    let time = unique_time.to_string();

    let unique_id = derive_unique_id(&IntegrityInput {
        system_url: &config.system_url,
        unique_time: &time,
        order_id: &order_id,
        amount,
        secret_key: &credentials.secret_key,
    });

    let charge = ChargeRequest {
        amount,
        currency: form.currency.trim().to_lowercase(),
        description: form.description,
        order_id,
        unique_id: unique_id.to_string(),
        customer: Customer {
            email: form.email,
            name: form.customer,
        },
        return_url: config.callback_url(&time, unique_id.as_str()),
    };

    let call = state
        .provider
        .create_checkout(&credentials.secret_key, &charge)
        .await;
    state.record_call(&call).await;

    let exchange = call.outcome?;
    if !exchange.is_ok() {
        warn!(
            %invoice_id,
            status = exchange.status.as_u16(),
            "provider refused checkout creation"
        );
        return Err(GatewayError::CheckoutRejected {
            status: exchange.status.as_u16(),
        });
    }
    let session: CheckoutSession = exchange.parse(CHECKOUT_ENDPOINT)?;
    if !session.echoes(&charge) {
        warn!(
            %invoice_id,
            session_id = %session.id,
            session_amount = ?session.amount,
            session_order_id = ?session.order_id,
            "checkout session does not echo the requested amount and order"
        );
    }
    let location = config.payment_page(&credentials.public_key, &session.id);
    info!(
        %invoice_id,
        session_id = %session.id,
        session_status = session.status.as_deref().unwrap_or_default(),
        mode = ?credentials.mode,
        "checkout session created"
    );
    Ok(CheckoutRedirect {
        session_id: session.id,
        unique_id,
        unique_time,
        location,
    })
}
