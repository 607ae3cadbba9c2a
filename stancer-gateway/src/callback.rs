use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::host::{InvoiceId, InvoicePayment, TransactionLog, GATEWAY_NAME, PAYMENT_PENDING};
use crate::integrity::{verify_unique_id, IntegrityInput};
use crate::provider::{CheckoutLookup, ProviderPayment, CHECKOUT_ENDPOINT};
use crate::status::TransactionStatus;
use common_money::MinorUnits;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub unique_time: Option<String>,
    pub unique_id: Option<String>,
}

impl CallbackQuery {
    fn required(&self) -> Result<(&str, &str), GatewayError> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }
        match (present(&self.unique_time), present(&self.unique_id)) {
            (Some(time), Some(id)) => Ok((time, id)),
            _ => Err(GatewayError::MissingCallbackParams),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub status: TransactionStatus,
    pub invoice_id: InvoiceId,
    pub payment_id: String,
    pub location: String,
}

/// Verify a checkout return, record the outcome and work out where to send the payer.
pub async fn verify_callback(state: &AppState, query: CallbackQuery) -> Result<CallbackOutcome, GatewayError> {
    let config = &state.config;
    config.ensure_enabled()?;
    let (unique_time, unique_id) = query.required()?;
    let credentials = config.credentials();

    let call = state
        .provider
        .find_checkout(&credentials.secret_key, unique_id)
        .await;
    state.record_call(&call).await;
    let exchange = call.outcome?;
    if !exchange.is_ok() {
        warn!(status = exchange.status.as_u16(), "checkout lookup refused");
        return Err(GatewayError::PaymentNotFound);
    }
    let lookup: CheckoutLookup = exchange.parse(CHECKOUT_ENDPOINT)?;
    let payment = single_payment(lookup)?;

    let mut status = TransactionStatus::from_provider(&payment.status);
    let bound = verify_unique_id(
        &IntegrityInput {
            system_url: &config.system_url,
            unique_time,
            order_id: &payment.order_id,
            amount: MinorUnits::new(payment.amount),
            secret_key: &credentials.secret_key,
        },
        unique_id,
    );
    if !bound {
        warn!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            provider_status = %payment.status,
            "unique_id does not match the checkout it claims to answer"
        );
        status = TransactionStatus::HashVerificationFailure;
    }

    let invoice_id = state.host.validate_invoice_id(&payment.order_id).await?;
    state.host.reject_duplicate_transaction(&payment.id).await?;

    state
        .host
        .log_transaction(TransactionLog {
            gateway: GATEWAY_NAME,
            data: json!({ "unique_id": unique_id, "payment_id": payment.id }),
            status: status.as_str().to_string(),
        })
        .await;
    state.metrics.record_callback(status.metric_label());

    if !config.test_mode {
        match status {
            TransactionStatus::Success => {
                state
                    .host
                    .apply_invoice_payment(InvoicePayment {
                        invoice_id,
                        transaction_id: payment.id.clone(),
                        amount: MinorUnits::new(payment.amount).to_major(),
                        fee: MinorUnits::new(payment.fee.unwrap_or(0)).to_major(),
                        gateway: GATEWAY_NAME,
                    })
                    .await?;
            }
            TransactionStatus::Pending => {
                state.host.set_invoice_status(invoice_id, PAYMENT_PENDING).await?;
            }
            TransactionStatus::Failure | TransactionStatus::HashVerificationFailure => {}
        }
    }

    info!(
        %invoice_id,
        payment_id = %payment.id,
        status = status.as_str(),
        test_mode = config.test_mode,
        "checkout return processed"
    );
    Ok(CallbackOutcome {
        status,
        invoice_id,
        location: config.invoice_url(invoice_id, status.redirect_flag()),
        payment_id: payment.id,
    })
}

fn single_payment(lookup: CheckoutLookup) -> Result<ProviderPayment, GatewayError> {
    let mut payments = lookup.payments;
    if payments.len() != 1 {
        warn!(count = payments.len(), "checkout lookup did not resolve to exactly one payment");
        return Err(GatewayError::PaymentNotFound);
    }
    payments.pop().ok_or(GatewayError::PaymentNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_count_as_missing() {
        let q = CallbackQuery { unique_time: Some("".into()), unique_id: Some("abc".into()) };
        assert!(matches!(q.required(), Err(GatewayError::MissingCallbackParams)));
        let q = CallbackQuery { unique_time: Some("1".into()), unique_id: None };
        assert!(matches!(q.required(), Err(GatewayError::MissingCallbackParams)));
        let q = CallbackQuery { unique_time: Some("1".into()), unique_id: Some("abc".into()) };
        assert_eq!(q.required().unwrap(), ("1", "abc"));
    }
}
