use common_http_errors::ApiError;
use common_money::MoneyError;
use thiserror::Error;
use tracing::warn;

use crate::config::Mode;
use crate::host::HostError;
use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Module Not Activated")]
    NotActivated,
    #[error("API keys are not present in the configuration ({0:?} mode)")]
    MissingCredentials(Mode),
    #[error("Missing unique_time OR unique_id")]
    MissingCallbackParams,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Impossible to create a payment object (provider status {status})")]
    CheckoutRejected { status: u16 },
    #[error("Your payment is not found")]
    PaymentNotFound,
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::NotActivated => ApiError::unavailable("module_inactive", message),
            GatewayError::MissingCredentials(_) => ApiError::unavailable("missing_api_keys", message),
            GatewayError::MissingCallbackParams => ApiError::bad_request("missing_callback_params", message),
            GatewayError::InvalidAmount(_) | GatewayError::Money(_) => ApiError::bad_request("invalid_amount", message),
            GatewayError::Host(HostError::InvalidInvoice(_)) => ApiError::bad_request("invalid_invoice_id", message),
            GatewayError::Host(HostError::DuplicateTransaction(_)) => ApiError::conflict("duplicate_transaction", message),
            GatewayError::Host(HostError::Backend(_)) => {
                warn!(error = %message, "host platform call failed");
                ApiError::internal("host_unavailable", None)
            }
            GatewayError::Provider(ProviderError::Parse { .. }) => {
                ApiError::bad_gateway("provider_response_invalid", message)
            }
            GatewayError::Provider(_) => ApiError::bad_gateway("provider_unavailable", message),
            GatewayError::CheckoutRejected { .. } => ApiError::bad_gateway("payment_creation_failed", message),
            GatewayError::PaymentNotFound => ApiError::not_found("payment_not_found", message),
        }
    }
}
